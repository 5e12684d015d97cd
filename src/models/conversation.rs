use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::case::{Case, Department};
use super::enums::Sender;
use super::feedback::Feedback;
use super::investigation::InvestigationResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn student(text: impl Into<String>) -> Self {
        Self::new(Sender::Student, text)
    }

    pub fn patient(text: impl Into<String>) -> Self {
        Self::new(Sender::Patient, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Sender::System, text)
    }
}

/// Everything known about the clerking session in progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseState {
    pub department: Option<Department>,
    pub case_details: Option<Case>,
    pub messages: Vec<Message>,
    pub preliminary_diagnosis: String,
    pub investigation_plan: String,
    pub investigation_results: Vec<InvestigationResult>,
    pub final_diagnosis: String,
    pub management_plan: String,
    pub feedback: Option<Feedback>,
}

impl CaseState {
    /// Student and patient turns in conversation order.
    pub fn dialogue(&self) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.sender.is_dialogue()).collect()
    }
}
