//! API Module
//!
//! - commands.rs: `Command`/`Reply` wire types and `dispatch`
//! - engine_status.rs: status report for diagnostics

pub mod commands;
pub mod engine_status;

#[cfg(test)]
mod tests;

pub use commands::{dispatch, Command, DeferThreadRequest, Reply};
pub use engine_status::{EngineStatus, ModelStatus};
