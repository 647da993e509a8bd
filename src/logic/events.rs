//! Event Emitter - outbound messages to UI consumers
//!
//! Every subscriber gets every message. Sending with nobody subscribed is
//! not an error; the message is simply dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::logic::session::{DeferredItem, GuardState};

/// Message kinds on the wire
pub mod events {
    pub const STATE: &str = "state";
    pub const DEFERRED: &str = "deferred";
    pub const TOAST: &str = "toast";
}

/// Buffered messages per slow subscriber before it starts lagging
pub const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    State { state: GuardState },
    Deferred { threads: Vec<DeferredItem> },
    Toast { message: String },
}

impl Outbound {
    pub fn kind(&self) -> &'static str {
        match self {
            Outbound::State { .. } => events::STATE,
            Outbound::Deferred { .. } => events::DEFERRED,
            Outbound::Toast { .. } => events::TOAST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Emitter {
    tx: broadcast::Sender<Outbound>,
}

impl Emitter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.tx.subscribe()
    }

    /// Live subscribers; ticks are skipped while this is zero
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn emit(&self, message: Outbound) {
        let kind = message.kind();
        if self.tx.send(message).is_err() {
            log::trace!("No subscribers, '{}' dropped", kind);
        }
    }

    pub fn emit_state(&self, state: &GuardState) {
        self.emit(Outbound::State {
            state: state.clone(),
        });
    }

    pub fn emit_deferred(&self, threads: &[DeferredItem]) {
        self.emit(Outbound::Deferred {
            threads: threads.to_vec(),
        });
    }

    pub fn toast(&self, message: impl Into<String>) {
        self.emit(Outbound::Toast {
            message: message.into(),
        });
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
