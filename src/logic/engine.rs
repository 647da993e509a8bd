//! Guard Engine - the async loop that owns the session
//!
//! Commands, periodic ticks, training completions and write-back flushes
//! are serialized through one `select!` loop, so a recomputation never
//! interleaves with another. Training runs on the blocking pool against an
//! owned snapshot and reports back through a channel.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::commands::{dispatch, Command, Reply};
use crate::logic::events::{Emitter, Outbound};
use crate::logic::model::ModelError;
use crate::logic::session::Session;
use crate::logic::storage::StorageError;
use crate::logic::training::TrainingOutcome;

/// Pending commands before `submit` waits
const COMMAND_QUEUE: usize = 64;
/// How often the flush policy is checked
const FLUSH_POLL_MS: u64 = 100;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine stopped")]
    Closed,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

struct Request {
    command: Command,
    reply: oneshot::Sender<Reply>,
}

/// Cheap to clone; the engine stops once every handle is dropped
#[derive(Clone)]
pub struct GuardHandle {
    tx: mpsc::Sender<Request>,
    emitter: Emitter,
}

impl GuardHandle {
    pub async fn submit(&self, command: Command) -> Result<Reply, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request { command, reply })
            .await
            .map_err(|_| EngineError::Closed)?;
        rx.await.map_err(|_| EngineError::Closed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.emitter.subscribe()
    }
}

/// Wall clock in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Start the engine on the current runtime
pub fn spawn(session: Session) -> (GuardHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    let handle = GuardHandle {
        tx,
        emitter: session.emitter().clone(),
    };
    let task = tokio::spawn(run(session, rx));
    (handle, task)
}

async fn run(mut session: Session, mut commands: mpsc::Receiver<Request>) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<TrainingOutcome>();

    let mut tick = tokio::time::interval(session.config().tick_interval());
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut flush = tokio::time::interval(Duration::from_millis(FLUSH_POLL_MS));
    flush.set_missed_tick_behavior(MissedTickBehavior::Skip);

    log::info!(
        "Guard engine started (tick {} ms, debounce {} ms)",
        session.config().tick_interval_ms,
        session.config().persist_debounce_ms
    );
    session.recompute(now_ms());
    launch_training(&mut session, &done_tx);

    loop {
        tokio::select! {
            request = commands.recv() => match request {
                Some(Request { command, reply }) => {
                    let response = dispatch(&mut session, command, now_ms());
                    if reply.send(response).is_err() {
                        log::debug!("Caller went away before the reply");
                    }
                }
                None => break,
            },
            Some(outcome) = done_rx.recv() => {
                session.finish_training(outcome, now_ms());
            }
            _ = tick.tick() => {
                // Nobody is watching; let the score decay silently
                if session.emitter().receiver_count() > 0 {
                    session.recompute(now_ms());
                }
            }
            _ = flush.tick() => {
                session.flush_due(now_ms());
            }
        }
        launch_training(&mut session, &done_tx);
    }

    let report = session.flush_all(now_ms());
    log::info!(
        "Guard engine stopped ({} writes, {} removals on final flush, {} failed)",
        report.written,
        report.removed,
        report.errors.len()
    );
}

/// Hand a parked job to the blocking pool
fn launch_training(session: &mut Session, done: &mpsc::UnboundedSender<TrainingOutcome>) {
    let Some(job) = session.take_job() else {
        return;
    };
    let (generation, reason) = (job.generation, job.reason);
    let done = done.clone();

    tokio::spawn(async move {
        let outcome = match tokio::task::spawn_blocking(move || job.run()).await {
            Ok(outcome) => outcome,
            Err(e) => TrainingOutcome::failed(generation, reason, ModelError::Aborted(e.to_string())),
        };
        if done.send(outcome).is_err() {
            log::debug!("Engine stopped before training finished");
        }
    });
}
