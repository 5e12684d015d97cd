use serde::{Deserialize, Serialize};

use super::enums::ResultStatus;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

/// A simulated test result. `status` is taken from the AI as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationResult {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub range: ReferenceRange,
    pub status: ResultStatus,
}
