//! Clerking report email endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::mail::{render_report, ClerkingReport};

#[derive(Serialize)]
pub struct EmailSentResponse {
    pub message: &'static str,
}

/// `POST /api/send-email`
pub async fn send(
    State(ctx): State<ApiContext>,
    Json(report): Json<ClerkingReport>,
) -> Result<Json<EmailSentResponse>, ApiError> {
    if !report.is_complete() {
        return Err(ApiError::BadRequest(
            "Recipient email and feedback are required".into(),
        ));
    }

    let email = render_report(&report);
    ctx.mailer.send(&email).await.map_err(|e| {
        tracing::error!(error = %e, "Report email failed");
        ApiError::Internal("Failed to send email".into())
    })?;

    Ok(Json(EmailSentResponse {
        message: "Email sent successfully",
    }))
}
