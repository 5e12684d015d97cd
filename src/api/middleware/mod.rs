//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. CORS: browser preflight and origin headers
//! 2. Access logger: method, path, status, elapsed time

pub mod audit;
