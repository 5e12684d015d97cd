//! Clinical simulation: prompt construction, provider call, and response
//! parsing for each request kind the student can make.

pub mod classify;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use classify::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

use crate::pipeline::llm::LlmError;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("The AI returned an invalid format for {context}.")]
    InvalidFormat { context: String },

    #[error("{0}")]
    Llm(#[from] LlmError),
}
