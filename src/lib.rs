//! Decision Load Guard - decision-load scoring and adaptive learning core
//!
//! Consumes interaction events from a webmail UI, keeps a decay-weighted
//! Decision Load Score, and trains a small on-device classifier to flag
//! overload early.

pub mod api;
pub mod constants;
pub mod logic;

pub use api::{Command, Reply};
pub use logic::config::GuardConfig;
pub use logic::engine::{spawn, EngineError, GuardHandle};
pub use logic::events::Outbound;
pub use logic::session::Session;
