//! Commands - typed request/reply surface for the UI collaborator
//!
//! Both directions are JSON objects tagged by `kind`. `dispatch` runs one
//! command against the session; the engine serializes calls to it.

use serde::{Deserialize, Serialize};

use crate::logic::activity::Event;
use crate::logic::engine::EngineError;
use crate::logic::session::{DeferSource, DeferredItem, GuardState, Session};

use super::engine_status::EngineStatus;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Thread the user chose to postpone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferThreadRequest {
    #[serde(alias = "hash")]
    pub reference: String,
    #[serde(default, alias = "timestamp")]
    pub ts: Option<i64>,
    #[serde(default)]
    pub source: DeferSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Event {
        event: Event,
    },
    DeferThread {
        thread: DeferThreadRequest,
    },
    GetDeferred,
    RemoveDeferred {
        #[serde(alias = "hash")]
        reference: String,
    },
    TrainNow,
    ManualOverload {
        #[serde(default)]
        overloaded: bool,
    },
    SimulateOverload {
        #[serde(default)]
        count: Option<u32>,
    },
    GetState,
    GetStatus,
    ClearAll,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Event { .. } => "event",
            Command::DeferThread { .. } => "defer_thread",
            Command::GetDeferred => "get_deferred",
            Command::RemoveDeferred { .. } => "remove_deferred",
            Command::TrainNow => "train_now",
            Command::ManualOverload { .. } => "manual_overload",
            Command::SimulateOverload { .. } => "simulate_overload",
            Command::GetState => "get_state",
            Command::GetStatus => "get_status",
            Command::ClearAll => "clear_all",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    State { state: GuardState },
    Deferred { threads: Vec<DeferredItem> },
    Status { status: EngineStatus },
    Ack,
    Error { message: String },
}

impl Reply {
    pub fn error(e: impl std::fmt::Display) -> Self {
        Reply::Error {
            message: e.to_string(),
        }
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Run one command at time `now`
pub fn dispatch(session: &mut Session, command: Command, now: i64) -> Reply {
    log::debug!("Command: {}", command.name());

    match command {
        Command::Event { event } => Reply::State {
            state: session.ingest(event, now),
        },
        Command::DeferThread { thread } => Reply::Deferred {
            threads: session.defer(&thread.reference, thread.ts, thread.source, now),
        },
        Command::GetDeferred => Reply::Deferred {
            threads: session.deferred().to_vec(),
        },
        Command::RemoveDeferred { reference } => Reply::Deferred {
            threads: session.remove_deferred(&reference, now),
        },
        Command::TrainNow => {
            if !session.request_training(now) {
                log::debug!("train_now ignored, run already in flight");
            }
            Reply::Ack
        }
        Command::ManualOverload { overloaded } => Reply::State {
            state: session.feedback(overloaded, now),
        },
        Command::SimulateOverload { count } => Reply::State {
            state: session.simulate_overload(count, now),
        },
        Command::GetState => {
            let state = match session.last_state().cloned() {
                Some(state) => state,
                None => session.recompute(now),
            };
            Reply::State { state }
        }
        Command::GetStatus => Reply::Status {
            status: EngineStatus::collect(session),
        },
        Command::ClearAll => match session.reset(now) {
            Ok(()) => Reply::Ack,
            Err(e) => {
                log::error!("clear_all: durable keys not removed yet: {}", e);
                Reply::error(EngineError::Storage(e))
            }
        },
    }
}
