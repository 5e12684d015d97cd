//! Generative-AI provider access.
//!
//! Everything above this module talks to `LlmClient`; only `gemini.rs`
//! knows the provider's wire format.

pub mod gemini;
pub mod mock;

pub use gemini::*;
pub use mock::*;

use async_trait::async_trait;
use thiserror::Error;

/// Provider status string Google uses for quota and rate-limit refusals.
pub const RESOURCE_EXHAUSTED: &str = "RESOURCE_EXHAUSTED";

#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("Cannot reach the AI provider at {0}")]
    Connection(String),

    #[error("AI provider request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("AI provider returned error (status {status}): {message}")]
    Provider {
        status: u16,
        status_text: Option<String>,
        message: String,
    },

    #[error("AI provider returned no text")]
    EmptyResponse,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

impl LlmError {
    /// Structured quota signal, when the provider gave one.
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            LlmError::Provider {
                status,
                status_text,
                ..
            } => *status == 429 || status_text.as_deref() == Some(RESOURCE_EXHAUSTED),
            _ => false,
        }
    }
}

/// Text generation against a hosted model (allows mocking).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(status: u16, status_text: Option<&str>) -> LlmError {
        LlmError::Provider {
            status,
            status_text: status_text.map(str::to_string),
            message: "refused".into(),
        }
    }

    #[test]
    fn http_429_is_quota() {
        assert!(provider(429, None).is_quota_exhausted());
    }

    #[test]
    fn resource_exhausted_status_is_quota() {
        assert!(provider(400, Some(RESOURCE_EXHAUSTED)).is_quota_exhausted());
    }

    #[test]
    fn other_errors_are_not_quota() {
        assert!(!provider(500, Some("INTERNAL")).is_quota_exhausted());
        assert!(!LlmError::Timeout(30).is_quota_exhausted());
        assert!(!LlmError::EmptyResponse.is_quota_exhausted());
    }
}
