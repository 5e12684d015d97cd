use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub diagnosis: String,
    pub key_takeaway: String,
    pub what_you_did_well: Vec<String>,
    pub what_could_be_improved: Vec<String>,
    pub clinical_tip: String,
}

/// A transcript excerpt paired with the educator's comment on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteInsight {
    pub quote: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedFeedbackReport {
    #[serde(flatten)]
    pub summary: Feedback,
    pub positive_quotes: Vec<QuoteInsight>,
    pub improvement_quotes: Vec<QuoteInsight>,
}
