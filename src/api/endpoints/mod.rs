pub mod ai;
pub mod email;
pub mod health;
pub mod location;
pub mod user;
