//! Failure classification for orchestration errors.
//!
//! The provider's structured status is preferred; the substring check on
//! the error text is a fallback for messages that arrive without one.

use super::SimulationError;

pub const QUOTA_EXCEEDED_PREFIX: &str = "QUOTA_EXCEEDED:";

pub const QUOTA_EXCEEDED_MESSAGE: &str = "QUOTA_EXCEEDED: The application's daily usage limit has been reached. Please try again tomorrow.";

/// Lowercase markers that identify a quota or rate-limit refusal.
const QUOTA_MARKERS: &[&str] = &["quota", "429", "resource has been exhausted"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Daily usage or rate limit hit upstream.
    QuotaExceeded,
    /// Required input missing; rejected before any AI call.
    InvalidInput,
    /// Malformed AI output, transport failure, anything else.
    Other,
}

/// Whether an error message reads like a quota refusal.
pub fn mentions_quota(message: &str) -> bool {
    let lower = message.to_lowercase();
    QUOTA_MARKERS.iter().any(|m| lower.contains(m))
}

pub fn classify_failure(err: &SimulationError) -> FailureKind {
    match err {
        SimulationError::MissingField(_) => FailureKind::InvalidInput,
        SimulationError::Llm(e) if e.is_quota_exhausted() => FailureKind::QuotaExceeded,
        other if mentions_quota(&other.to_string()) => FailureKind::QuotaExceeded,
        _ => FailureKind::Other,
    }
}
