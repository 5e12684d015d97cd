//! Outbound email for clerking reports.
//!
//! Handlers depend on the `Mailer` trait; `HttpMailer` talks to a
//! transactional-mail HTTP API and `TracingMailer` only logs.

pub mod report;

pub use report::*;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail HTTP client error: {0}")]
    HttpClient(String),

    #[error("Mail provider rejected message (status {status}): {message}")]
    Provider { status: u16, message: String },
}

/// One rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Logs the message instead of sending it. Used when no provider is set.
#[derive(Debug, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            text_chars = email.text.len(),
            "Mail provider not configured, report logged only"
        );
        Ok(())
    }
}

/// Posts `{from, to, subject, html, text}` with a bearer key.
pub struct HttpMailer {
    url: String,
    api_key: String,
    from: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MailError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
            client,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let body = SendRequest {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MailError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!(to = %email.to, "Clerking report sent");
        Ok(())
    }
}
