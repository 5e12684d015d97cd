use serde::{Deserialize, Serialize};

use crate::models::{
    Case, CaseGenerationOptions, CaseState, DetailedFeedbackReport, Feedback, InvestigationResult,
    Message,
};

/// Wire names of every request kind, as carried in the `type` field.
pub const REQUEST_KINDS: &[&str] = &[
    "generateCase",
    "getPatientResponse",
    "getInvestigationResults",
    "getFeedback",
    "getDetailedFeedback",
];

/// One orchestration request: `{"type": ..., "payload": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum SimulationRequest {
    GenerateCase(GenerateCasePayload),
    GetPatientResponse(PatientResponsePayload),
    GetInvestigationResults(InvestigationPayload),
    GetFeedback(FeedbackPayload),
    GetDetailedFeedback(FeedbackPayload),
}

impl SimulationRequest {
    pub fn is_known_kind(kind: &str) -> bool {
        REQUEST_KINDS.contains(&kind)
    }

    /// Label used in logs and in "invalid format for ..." errors.
    pub fn context(&self) -> &'static str {
        match self {
            Self::GenerateCase(_) => GENERATE_CASE_CONTEXT,
            Self::GetPatientResponse(_) => PATIENT_RESPONSE_CONTEXT,
            Self::GetInvestigationResults(_) => INVESTIGATIONS_CONTEXT,
            Self::GetFeedback(_) => FEEDBACK_CONTEXT,
            Self::GetDetailedFeedback(_) => DETAILED_FEEDBACK_CONTEXT,
        }
    }
}

pub const GENERATE_CASE_CONTEXT: &str = "generateClinicalCase";
pub const PATIENT_RESPONSE_CONTEXT: &str = "getPatientResponse";
pub const INVESTIGATIONS_CONTEXT: &str = "getInvestigationResults";
pub const FEEDBACK_CONTEXT: &str = "getCaseFeedback";
pub const DETAILED_FEEDBACK_CONTEXT: &str = "getDetailedCaseFeedback";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateCasePayload {
    pub department_name: String,
    pub options: Option<CaseGenerationOptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientResponsePayload {
    pub history: Vec<Message>,
    pub case_details: Option<Case>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvestigationPayload {
    pub plan: String,
    pub case_details: Option<Case>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackPayload {
    pub case_state: CaseState,
}

/// What the simulated patient said.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientReply {
    pub response: String,
}

/// Result of a dispatched request, serialized exactly as the handler's
/// value (no wrapper).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SimulationResponse {
    Case(Case),
    PatientReply(PatientReply),
    Investigations(Vec<InvestigationResult>),
    Feedback(Feedback),
    DetailedFeedback(DetailedFeedbackReport),
}
