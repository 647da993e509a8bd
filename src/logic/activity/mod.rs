//! Activity Module - Interaction events and the windowed event log
//!
//! - `event.rs`: `Event`, `EventKind` and the per-kind payload union
//! - `lenient.rs`: defaulting decoders for malformed payload fields
//! - `window.rs`: `EventLog` and window pruning

pub mod event;
pub mod lenient;
pub mod window;

#[cfg(test)]
mod tests;

pub use event::{ClickAction, ContextSwitchKind, Event, EventData, EventKind, OTHER_ACTION};
pub use window::{prune_window, EventLog, WINDOW_MS};
