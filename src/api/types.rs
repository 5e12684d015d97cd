//! Shared types for the HTTP API layer.

use std::sync::{Arc, Mutex};

use crate::mail::{Mailer, TracingMailer};
use crate::pipeline::llm::LlmClient;
use crate::pipeline::simulation::SimulationEngine;
use crate::trials::TrialLedger;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
///
/// The engine is stateless; the trial ledger is the only mutable state.
#[derive(Clone)]
pub struct ApiContext {
    pub engine: SimulationEngine,
    pub mailer: Arc<dyn Mailer>,
    pub trials: Arc<Mutex<TrialLedger>>,
}

impl ApiContext {
    pub fn new(engine: SimulationEngine, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            engine,
            mailer,
            trials: Arc::new(Mutex::new(TrialLedger::new())),
        }
    }

    /// Context with a logging-only mailer.
    pub fn with_client(client: Arc<dyn LlmClient>, model: &str) -> Self {
        Self::new(
            SimulationEngine::new(client, model),
            Arc::new(TracingMailer),
        )
    }
}
