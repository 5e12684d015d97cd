use std::sync::Arc;

use serde::Deserialize;

use super::parser::parse_json_response;
use super::prompt::{
    build_case_prompt, build_detailed_feedback_prompt, build_feedback_prompt,
    build_investigation_prompt, build_patient_prompt,
};
use super::types::{
    FeedbackPayload, GenerateCasePayload, InvestigationPayload, PatientReply,
    PatientResponsePayload, SimulationRequest, SimulationResponse, DETAILED_FEEDBACK_CONTEXT,
    FEEDBACK_CONTEXT, GENERATE_CASE_CONTEXT, INVESTIGATIONS_CONTEXT,
};
use super::SimulationError;
use crate::models::{
    Case, CaseGenerationOptions, CaseState, DetailedFeedbackReport, Feedback, InvestigationResult,
    Message, Sender,
};
use crate::pipeline::llm::LlmClient;

/// `{"results": [...]}` wrapper the investigation prompt asks for.
#[derive(Deserialize)]
struct InvestigationEnvelope {
    #[serde(default)]
    results: Vec<InvestigationResult>,
}

/// Runs one simulation request end to end:
/// validate → prompt → provider → parse.
///
/// Stateless; every call is independent and never retried.
#[derive(Clone)]
pub struct SimulationEngine {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl SimulationEngine {
    pub fn new(client: Arc<dyn LlmClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Route a request to its handler. Exhaustive over request kinds.
    pub async fn dispatch(
        &self,
        request: SimulationRequest,
    ) -> Result<SimulationResponse, SimulationError> {
        let context = request.context();
        tracing::debug!(context, model = %self.model, "Dispatching simulation request");

        match request {
            SimulationRequest::GenerateCase(GenerateCasePayload {
                department_name,
                options,
            }) => self
                .generate_case(&department_name, &options.unwrap_or_default())
                .await
                .map(SimulationResponse::Case),
            SimulationRequest::GetPatientResponse(PatientResponsePayload {
                history,
                case_details,
            }) => {
                let case = case_details.ok_or(SimulationError::MissingField("caseDetails"))?;
                self.patient_response(&case, &history)
                    .await
                    .map(SimulationResponse::PatientReply)
            }
            SimulationRequest::GetInvestigationResults(InvestigationPayload {
                plan,
                case_details,
            }) => {
                let case = case_details.ok_or(SimulationError::MissingField("caseDetails"))?;
                self.investigation_results(&plan, &case)
                    .await
                    .map(SimulationResponse::Investigations)
            }
            SimulationRequest::GetFeedback(FeedbackPayload { case_state }) => self
                .feedback(&case_state)
                .await
                .map(SimulationResponse::Feedback),
            SimulationRequest::GetDetailedFeedback(FeedbackPayload { case_state }) => self
                .detailed_feedback(&case_state)
                .await
                .map(SimulationResponse::DetailedFeedback),
        }
    }

    pub async fn generate_case(
        &self,
        department_name: &str,
        options: &CaseGenerationOptions,
    ) -> Result<Case, SimulationError> {
        if department_name.trim().is_empty() {
            return Err(SimulationError::MissingField("departmentName"));
        }

        let prompt = build_case_prompt(department_name, options);
        let text = self.client.generate(&self.model, &prompt).await?;
        let case: Case = parse_json_response(&text, GENERATE_CASE_CONTEXT)?;

        if case.diagnosis.trim().is_empty() || case.primary_info.trim().is_empty() {
            tracing::error!(
                department = department_name,
                "Generated case is missing diagnosis or history"
            );
            return Err(SimulationError::InvalidFormat {
                context: GENERATE_CASE_CONTEXT.to_string(),
            });
        }

        tracing::info!(
            department = department_name,
            pediatric = case.has_caregiver(),
            "Generated clinical case"
        );
        Ok(case)
    }

    /// Next in-character reply. Plain text, not JSON.
    pub async fn patient_response(
        &self,
        case: &Case,
        history: &[Message],
    ) -> Result<PatientReply, SimulationError> {
        let has_question = history
            .iter()
            .any(|m| m.sender == Sender::Student && !m.text.trim().is_empty());
        if !has_question {
            return Err(SimulationError::MissingField("history"));
        }

        let prompt = build_patient_prompt(case, history);
        let text = self.client.generate(&self.model, &prompt).await?;
        Ok(PatientReply {
            response: text.trim().to_string(),
        })
    }

    pub async fn investigation_results(
        &self,
        plan: &str,
        case: &Case,
    ) -> Result<Vec<InvestigationResult>, SimulationError> {
        if plan.trim().is_empty() {
            return Err(SimulationError::MissingField("plan"));
        }

        let prompt = build_investigation_prompt(plan, case);
        let text = self.client.generate(&self.model, &prompt).await?;
        let envelope: InvestigationEnvelope = parse_json_response(&text, INVESTIGATIONS_CONTEXT)?;

        tracing::info!(count = envelope.results.len(), "Simulated investigation results");
        Ok(envelope.results)
    }

    pub async fn feedback(&self, state: &CaseState) -> Result<Feedback, SimulationError> {
        let prompt = build_feedback_prompt(state);
        let text = self.client.generate(&self.model, &prompt).await?;
        parse_json_response(&text, FEEDBACK_CONTEXT)
    }

    pub async fn detailed_feedback(
        &self,
        state: &CaseState,
    ) -> Result<DetailedFeedbackReport, SimulationError> {
        let prompt = build_detailed_feedback_prompt(state);
        let text = self.client.generate(&self.model, &prompt).await?;
        parse_json_response(&text, DETAILED_FEEDBACK_CONTEXT)
    }
}
