use std::collections::HashMap;

use serde::Serialize;

/// Free simulations per user before a subscription is needed.
pub const FREE_TRIALS: u32 = 5;

/// Trial usage for one user, as returned by the user endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialUsage {
    pub trials_used: u32,
    pub trials_remaining: u32,
}

impl TrialUsage {
    fn from_used(used: u32) -> Self {
        Self {
            trials_used: used,
            trials_remaining: FREE_TRIALS.saturating_sub(used),
        }
    }

    pub fn exhausted(&self) -> bool {
        self.trials_remaining == 0
    }
}

/// In-memory per-user trial counter. Shared behind a mutex by the server.
#[derive(Debug, Default)]
pub struct TrialLedger {
    used: HashMap<String, u32>,
}

impl TrialLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more trial for `user_id`, registering the user if new.
    pub fn increment(&mut self, user_id: &str) -> TrialUsage {
        let used = self.used.entry(user_id.to_string()).or_insert(0);
        *used = used.saturating_add(1);
        tracing::debug!(user_id, trials_used = *used, "Trial counted");
        TrialUsage::from_used(*used)
    }

    /// Usage for a known user; `None` if the user was never seen.
    pub fn usage(&self, user_id: &str) -> Option<TrialUsage> {
        self.used.get(user_id).copied().map(TrialUsage::from_used)
    }
}
