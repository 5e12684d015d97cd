//! HTTP API for the clerking simulator.
//!
//! `POST /api/ai` carries every simulation request; the remaining routes
//! are small helpers around it (health, locations, report email, trials).

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;
