//! Trial allowance endpoints.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::trials::TrialUsage;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementTrialRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Serialize)]
pub struct IncrementTrialResponse {
    pub success: bool,
    #[serde(flatten)]
    pub usage: TrialUsage,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    #[serde(flatten)]
    pub usage: TrialUsage,
}

fn lock_poisoned() -> ApiError {
    ApiError::Internal("trial ledger lock poisoned".into())
}

/// `POST /api/user/increment-trial`
pub async fn increment_trial(
    State(ctx): State<ApiContext>,
    Json(req): Json<IncrementTrialRequest>,
) -> Result<Json<IncrementTrialResponse>, ApiError> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest("User ID is required".into()));
    }

    let usage = ctx
        .trials
        .lock()
        .map_err(|_| lock_poisoned())?
        .increment(user_id);

    if usage.exhausted() {
        tracing::info!(user_id, trials_used = usage.trials_used, "Free trials exhausted");
    }

    Ok(Json(IncrementTrialResponse {
        success: true,
        usage,
    }))
}

/// `GET /api/user/:user_id`
pub async fn get_user(
    State(ctx): State<ApiContext>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let usage = ctx
        .trials
        .lock()
        .map_err(|_| lock_poisoned())?
        .usage(&user_id)
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(UserResponse { id: user_id, usage }))
}
