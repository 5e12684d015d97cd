use serde::{Deserialize, Serialize};

use super::enums::{EconomicLevel, ResourceLevel};

/// Regional context used only to bias case-generation prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub country: String,
    pub region: String,
    pub economic_level: EconomicLevel,
    pub common_diseases: Vec<String>,
    pub available_resources: ResourceLevel,
}
