//! Clerking session state and the context object that owns it.
//!
//! `CaseSession` holds the `CaseState` of the case in progress and only
//! changes through its named transitions. `ClerkingContext` adds what
//! lives across cases: the local store, the signed-in email, the cached
//! location and the history of generated diagnoses.

use rand::seq::SliceRandom;

use crate::local_store::{LocalStore, StoreError};
use crate::models::{
    Case, CaseCategory, CaseGenerationOptions, CaseState, Department, Difficulty, Feedback,
    InvestigationResult, LocationInfo, Message,
};
use crate::pipeline::simulation::{SimulationEngine, SimulationError};

/// Build the system note shown when the student first sees the patient.
pub fn system_greeting(department: &Department, case: &Case) -> String {
    let who = if department.is_pediatric() {
        "You are now seeing the patient. Both the child and caregiver are present."
    } else {
        "You are now seeing the patient."
    };
    format!(
        "{who}\n\nVisual Assessment:\n{}\n\nOpening Statement:\n\"{}\"",
        case.visual_appearance, case.opening_line
    )
}

/// Single-owner holder of the active case. Last write wins.
#[derive(Debug, Default)]
pub struct CaseSession {
    state: CaseState,
}

impl CaseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaseState {
        &self.state
    }

    pub fn has_case(&self) -> bool {
        self.state.case_details.is_some()
    }

    /// Reset, then seed a new case with its department and greeting.
    pub fn start_case(&mut self, department: Department, case: Case) {
        self.reset();
        let greeting = system_greeting(&department, &case);
        self.state.department = Some(department);
        self.state.case_details = Some(case);
        self.append_message(Message::system(greeting));
    }

    pub fn append_message(&mut self, message: Message) {
        self.state.messages.push(message);
    }

    pub fn set_preliminary(&mut self, diagnosis: &str, investigation_plan: &str) {
        self.state.preliminary_diagnosis = diagnosis.to_string();
        self.state.investigation_plan = investigation_plan.to_string();
    }

    pub fn set_investigation_results(&mut self, results: Vec<InvestigationResult>) {
        self.state.investigation_results = results;
    }

    pub fn set_final(&mut self, diagnosis: &str, management_plan: &str) {
        self.state.final_diagnosis = diagnosis.to_string();
        self.state.management_plan = management_plan.to_string();
    }

    pub fn set_feedback(&mut self, feedback: Feedback) {
        self.state.feedback = Some(feedback);
    }

    pub fn reset(&mut self) {
        self.state = CaseState::default();
    }
}


/// Application context for one student on this machine.
pub struct ClerkingContext {
    session: CaseSession,
    store: LocalStore,
    user_email: Option<String>,
    location: Option<LocationInfo>,
    previous_cases: Vec<String>,
    onboarding_complete: bool,
}

impl ClerkingContext {
    /// Load cross-session data from the store.
    pub fn load(store: LocalStore) -> Self {
        Self {
            session: CaseSession::new(),
            user_email: store.user_email(),
            location: store.location(),
            previous_cases: store.recent_cases(),
            onboarding_complete: store.onboarding_complete(),
            store,
        }
    }

    pub fn session(&self) -> &CaseSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CaseSession {
        &mut self.session
    }

    pub fn user_email(&self) -> Option<&str> {
        self.user_email.as_deref()
    }

    pub fn location(&self) -> Option<&LocationInfo> {
        self.location.as_ref()
    }

    /// Most recent diagnoses, oldest first.
    pub fn previous_cases(&self) -> &[String] {
        &self.previous_cases
    }

    pub fn onboarding_complete(&self) -> bool {
        self.onboarding_complete
    }

    /// Generate a case for `department` and make it the active one.
    ///
    /// Unset difficulty or category is picked at random; recent diagnoses
    /// and the cached location are always passed along.
    pub async fn generate_new_case(
        &mut self,
        engine: &SimulationEngine,
        department: Department,
        difficulty: Option<Difficulty>,
        category: Option<CaseCategory>,
    ) -> Result<&CaseState, SimulationError> {
        let options = {
            let mut rng = rand::thread_rng();
            CaseGenerationOptions {
                difficulty: difficulty.or_else(|| Difficulty::ALL.choose(&mut rng).copied()),
                category: category.or_else(|| CaseCategory::ALL.choose(&mut rng).copied()),
                avoid_similar_to: self.previous_cases.clone(),
                location: self.location.clone(),
            }
        };

        tracing::info!(
            department = %department.name,
            difficulty = ?options.difficulty,
            category = ?options.category,
            avoid = options.avoid_similar_to.len(),
            "Generating new case"
        );

        let case = engine.generate_case(&department.name, &options).await?;

        let diagnosis = case.diagnosis.clone();
        self.session.start_case(department, case);

        if let Err(e) = self.store.record_case(&diagnosis) {
            tracing::warn!(error = %e, "Failed to record case history");
        }
        self.previous_cases = self.store.recent_cases();
        Ok(self.session.state())
    }

    pub fn set_user_email(&mut self, email: &str) -> Result<(), StoreError> {
        self.store.set_user_email(email)?;
        self.user_email = Some(email.to_string());
        Ok(())
    }

    /// Forget the signed-in user and drop the active case.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.store.clear_user_email()?;
        self.user_email = None;
        self.session.reset();
        Ok(())
    }

    pub fn set_location(&mut self, location: LocationInfo) -> Result<(), StoreError> {
        self.store.set_location(&location)?;
        self.location = Some(location);
        Ok(())
    }

    pub fn complete_onboarding(&mut self) -> Result<(), StoreError> {
        self.store.set_onboarding_complete()?;
        self.onboarding_complete = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::location::lookup_location;
    use crate::local_store::STORE_FILE_NAME;
    use crate::models::{find_department, Sender};
    use crate::pipeline::llm::{LlmError, MockLlmClient};

    const CASE_JSON: &str = r###"{"diagnosis": "Pre-eclampsia", "primaryInfo": "## BIODATA\n32-year-old G2P1", "openingLine": "My head is pounding.", "visualAppearance": "Anxious woman with swollen ankles."}"###;

    fn sample_case() -> Case {
        serde_json::from_str(CASE_JSON).unwrap()
    }

    fn context() -> (tempfile::TempDir, ClerkingContext) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join(STORE_FILE_NAME)).unwrap();
        (dir, ClerkingContext::load(store))
    }

    fn engine(client: MockLlmClient) -> (SimulationEngine, Arc<MockLlmClient>) {
        let client = Arc::new(client);
        (SimulationEngine::new(client.clone(), "test-model"), client)
    }

    #[test]
    fn messages_keep_append_order() {
        let mut session = CaseSession::new();
        let m1 = Message::student("What brings you in today?");
        let m2 = Message::patient("I've had a headache for two days.");
        session.append_message(m1.clone());
        session.append_message(m2.clone());
        assert_eq!(session.state().messages, vec![m1.clone(), m2]);

        session.append_message(Message::student("Any visual changes?"));
        assert_eq!(session.state().messages[0], m1);
        assert_eq!(session.state().messages.len(), 3);
    }

    #[test]
    fn start_case_resets_and_greets() {
        let mut session = CaseSession::new();
        session.set_final("Old diagnosis", "Old plan");
        session.start_case(Department::new("Obstetrics", ""), sample_case());

        let state = session.state();
        assert!(state.final_diagnosis.is_empty());
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].sender, Sender::System);
        assert_eq!(
            state.messages[0].text,
            "You are now seeing the patient.\n\nVisual Assessment:\nAnxious woman with swollen ankles.\n\nOpening Statement:\n\"My head is pounding.\""
        );
    }

    #[test]
    fn pediatric_greeting_mentions_caregiver() {
        let greeting = system_greeting(&Department::new("Pediatrics", ""), &sample_case());
        assert!(greeting.starts_with(
            "You are now seeing the patient. Both the child and caregiver are present.\n\n"
        ));
    }

    #[test]
    fn setters_are_last_write_wins() {
        let mut session = CaseSession::new();
        session.set_preliminary("Migraine", "FBC");
        session.set_preliminary("Pre-eclampsia", "FBC, U&E, LFT");
        session.set_final("Pre-eclampsia", "Admit, MgSO4");
        session.set_investigation_results(vec![]);
        session.set_feedback(Feedback::default());

        let state = session.state();
        assert_eq!(state.preliminary_diagnosis, "Pre-eclampsia");
        assert_eq!(state.investigation_plan, "FBC, U&E, LFT");
        assert_eq!(state.management_plan, "Admit, MgSO4");
        assert!(state.feedback.is_some());

        session.reset();
        assert_eq!(session.state(), &CaseState::default());
    }

    #[tokio::test]
    async fn generate_new_case_uses_history_and_location() {
        let (_dir, mut ctx) = context();
        ctx.set_location(lookup_location("India")).unwrap();
        let (engine, client) = engine(MockLlmClient::new(CASE_JSON));

        let department = find_department("Obstetrics").unwrap();
        ctx.generate_new_case(&engine, department.clone(), None, None)
            .await
            .unwrap();
        let state = ctx
            .generate_new_case(&engine, department, Some(Difficulty::Basic), None)
            .await
            .unwrap();

        assert_eq!(state.messages.len(), 1);
        assert_eq!(ctx.previous_cases(), &["Pre-eclampsia", "Pre-eclampsia"]);

        let prompt = client.last_prompt().unwrap();
        assert!(prompt.contains("- Country: India"));
        assert!(prompt.contains("recent diagnoses: Pre-eclampsia"));
        assert!(prompt.contains("DIFFICULTY LEVEL: basic"));
        assert!(prompt.contains("CASE CATEGORY: "));
    }

    #[tokio::test]
    async fn store_write_failure_keeps_generated_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        let mut ctx = ClerkingContext::load(LocalStore::open(&path).unwrap());
        // A directory where the file should be makes every write fail.
        std::fs::create_dir(&path).unwrap();
        let (engine, _) = engine(MockLlmClient::new(CASE_JSON));

        let state = ctx
            .generate_new_case(&engine, Department::new("Obstetrics", ""), None, None)
            .await
            .unwrap();

        assert_eq!(
            state.case_details.as_ref().map(|c| c.diagnosis.as_str()),
            Some("Pre-eclampsia")
        );
        assert_eq!(state.messages.len(), 1);
        assert!(ctx.session().has_case());
    }

    #[tokio::test]
    async fn failed_generation_leaves_state_unchanged() {
        let (_dir, mut ctx) = context();
        ctx.session_mut().append_message(Message::student("hello"));
        let (engine, _) = engine(MockLlmClient::failing(LlmError::Timeout(120)));

        let result = ctx
            .generate_new_case(&engine, Department::new("Gynecology", ""), None, None)
            .await;
        assert!(result.is_err());
        assert_eq!(ctx.session().state().messages.len(), 1);
        assert!(ctx.previous_cases().is_empty());
    }

    #[test]
    fn logout_clears_email_and_case() {
        let (_dir, mut ctx) = context();
        ctx.set_user_email("student@example.test").unwrap();
        ctx.session_mut()
            .start_case(Department::new("Obstetrics", ""), sample_case());
        ctx.complete_onboarding().unwrap();

        ctx.logout().unwrap();
        assert!(ctx.user_email().is_none());
        assert!(!ctx.session().has_case());
        assert!(ctx.onboarding_complete());
    }

    #[test]
    fn context_reloads_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        {
            let mut ctx = ClerkingContext::load(LocalStore::open(&path).unwrap());
            ctx.set_user_email("again@example.test").unwrap();
            ctx.complete_onboarding().unwrap();
        }
        let ctx = ClerkingContext::load(LocalStore::open(&path).unwrap());
        assert_eq!(ctx.user_email(), Some("again@example.test"));
        assert!(ctx.onboarding_complete());
        assert!(ctx.location().is_none());
    }
}
