//! `POST /api/ai`: the single orchestration entry point.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::simulation::{SimulationRequest, SimulationResponse};

pub const INVALID_REQUEST_TYPE: &str = "Invalid request type";

/// Decode `{type, payload}`. Unknown kinds are told apart from bad payloads.
fn decode_request(body: &[u8]) -> Result<SimulationRequest, ApiError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !SimulationRequest::is_known_kind(&kind) {
        return Err(ApiError::BadRequest(INVALID_REQUEST_TYPE.into()));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid payload for {kind}: {e}")))
}

pub async fn handle(
    State(ctx): State<ApiContext>,
    body: Bytes,
) -> Result<Json<SimulationResponse>, ApiError> {
    let request = decode_request(&body)?;
    let context = request.context();

    match ctx.engine.dispatch(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            tracing::error!(context, error = %e, "Simulation request failed");
            Err(e.into())
        }
    }
}

/// Any method other than POST.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
