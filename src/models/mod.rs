pub mod case;
pub mod conversation;
pub mod enums;
pub mod feedback;
pub mod investigation;
pub mod location;

pub use case::*;
pub use conversation::*;
pub use enums::*;
pub use feedback::*;
pub use investigation::*;
pub use location::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
