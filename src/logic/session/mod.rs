//! Session - the single owner of all guard state
//!
//! Event log, thread pairing, Decision Inbox, training samples, the
//! orchestrator and the write-back cache live here. Every operation takes
//! the current time explicitly and runs to completion; the engine task is
//! the only caller.
//!
//! Training jobs are not spawned here. Starting a run parks a
//! `TrainingJob` that the engine collects with `take_job`.

pub mod deferred;
pub mod state;
pub mod threads;


use crate::logic::activity::{ClickAction, ContextSwitchKind, Event, EventData, EventKind, EventLog, WINDOW_MS};
use crate::logic::config::GuardConfig;
use crate::logic::events::Emitter;
use crate::logic::features::compute_feature_vector;
use crate::logic::model::{load_or_fresh, ModelArtifacts, ModelMeta};
use crate::logic::scoring::{compute_dls, effective_state, DlsState};
use crate::logic::storage::{load_json, FlushReport, KeyValueStore, StorageError, StorageKey, WriteBackCache};
use crate::logic::training::{
    Completion, Sample, SampleBuffer, SampleThrottle, TrainReason, TrainingJob, TrainingOrchestrator,
    TrainingOutcome,
};

pub use deferred::{normalize_reference, DeferSource, DeferredItem, DeferredList};
pub use state::{GuardState, ModelState};
pub use threads::ThreadTracker;

/// Synthetic burst size bounds
pub const SIMULATE_DEFAULT: u32 = 12;
pub const SIMULATE_MAX: u32 = 60;

pub mod toasts {
    pub const DEFERRED_ADDED: &str = "Added to Decision Inbox.";
    pub const TRAINING_FAILED: &str = "Model training failed.";
    pub const DATA_CLEARED: &str = "Local data cleared.";
    pub const FEEDBACK_OVERLOADED: &str = "Feedback recorded: overloaded.";
    pub const FEEDBACK_NOT_OVERLOADED: &str = "Feedback recorded: not overloaded.";

    pub fn trained(reason: crate::logic::training::TrainReason) -> String {
        format!("Model trained ({}).", reason.as_str())
    }
}

pub struct Session {
    config: GuardConfig,
    store: Box<dyn KeyValueStore>,
    emitter: Emitter,
    log: EventLog,
    threads: ThreadTracker,
    deferred: DeferredList,
    samples: SampleBuffer,
    throttle: SampleThrottle,
    orchestrator: TrainingOrchestrator,
    cache: WriteBackCache,
    last_event_type: Option<EventKind>,
    last_state: Option<GuardState>,
    pending_job: Option<TrainingJob>,
}

impl Session {
    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Restore persisted state. Every key is optional; unreadable values fall
    /// back to defaults.
    pub fn open(config: GuardConfig, store: Box<dyn KeyValueStore>, emitter: Emitter, now: i64) -> Self {
        let store_ref: &dyn KeyValueStore = &*store;

        let mut event_log = EventLog::from_events(load_json(store_ref, StorageKey::Events).unwrap_or_default());
        event_log.prune(now);

        let deferred = DeferredList::from_items(
            load_json(store_ref, StorageKey::Deferred).unwrap_or_default(),
            config.deferred_capacity,
        );
        let samples = SampleBuffer::from_samples(
            load_json::<Vec<Sample>, _>(store_ref, StorageKey::Samples).unwrap_or_default(),
            config.training.sample_capacity,
        );

        let artifacts: Option<ModelArtifacts> = load_json(store_ref, StorageKey::ModelArtifacts);
        let mut meta: ModelMeta = load_json(store_ref, StorageKey::ModelMeta).unwrap_or_default();
        let (model, loaded) = load_or_fresh(artifacts.as_ref());
        if !loaded && meta.is_trained() {
            log::warn!("Model metadata without usable weights, treating model as untrained");
            meta = ModelMeta::default();
        }

        log::info!(
            "Session opened on {} store: {} events, {} deferred, {} samples, model {}",
            store.name(),
            event_log.len(),
            deferred.len(),
            samples.len(),
            if meta.is_trained() { "trained" } else { "untrained" }
        );

        Self {
            throttle: SampleThrottle::new(config.training.sample_interval_ms),
            orchestrator: TrainingOrchestrator::new(model, meta, config.training.clone()),
            cache: WriteBackCache::new(config.persist_debounce_ms),
            threads: ThreadTracker::new(),
            last_event_type: None,
            last_state: None,
            pending_job: None,
            config,
            store,
            emitter,
            log: event_log,
            deferred,
            samples,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn last_state(&self) -> Option<&GuardState> {
        self.last_state.as_ref()
    }

    pub fn events(&self) -> &[Event] {
        self.log.as_slice()
    }

    pub fn deferred(&self) -> &[DeferredItem] {
        self.deferred.items()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Opens still waiting for a first action
    pub fn open_thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn orchestrator(&self) -> &TrainingOrchestrator {
        &self.orchestrator
    }

    pub fn pending_storage_keys(&self) -> usize {
        self.cache.pending_keys()
    }

    /// Job parked by the last operation, if any
    pub fn take_job(&mut self) -> Option<TrainingJob> {
        self.pending_job.take()
    }

    // ========================================================================
    // RECOMPUTE
    // ========================================================================

    /// Score, sample, infer, broadcast. May start an automatic training run.
    pub fn recompute(&mut self, now: i64) -> GuardState {
        if self.log.prune(now) > 0 {
            self.cache.mark_dirty(StorageKey::Events, now);
        }
        self.threads.prune(now - WINDOW_MS);

        let events = self.log.as_slice();
        let score = compute_dls(events, now);
        let state = score.state();
        let fv = compute_feature_vector(events, now);

        if self.throttle.try_acquire(now) {
            self.samples.push(Sample::new(&fv, state == DlsState::Red, now));
            self.cache.mark_dirty(StorageKey::Samples, now);
        }

        let inference = self.orchestrator.inference(&fv);
        let risk = inference.as_ref().map(|(risk, _)| *risk);
        let meta = self.orchestrator.meta();

        let guard_state = GuardState {
            now,
            dls: score.dls,
            raw_score: score.raw,
            state,
            effective_state: effective_state(state, score.dls, risk, &self.config.early_warning),
            window_event_count: self.log.len(),
            last_event_type: self.last_event_type,
            model: ModelState {
                available: meta.is_trained(),
                overload_risk: risk,
                top_contributors: inference.map(|(_, top)| top).unwrap_or_default(),
                training: self.orchestrator.is_training(),
                trained_at: meta.trained_at,
                sample_count: self.samples.len(),
            },
        };

        log::debug!(
            "Recomputed: dls {} ({}), effective {}, {} events",
            guard_state.dls,
            guard_state.state,
            guard_state.effective_state,
            guard_state.window_event_count
        );

        self.emitter.emit_state(&guard_state);
        self.last_state = Some(guard_state.clone());

        // Starting a run recomputes again with `training: true`
        if self.orchestrator.should_auto_train(self.samples.len(), now) {
            self.start_training(TrainReason::Auto, now);
        }

        self.last_state.clone().unwrap_or(guard_state)
    }

    // ========================================================================
    // INGESTION
    // ========================================================================

    fn append(&mut self, event: Event, now: i64) {
        self.last_event_type = Some(event.kind());
        self.log.append(event);
        self.log.prune(now);
        self.cache.mark_dirty(StorageKey::Events, now);
    }

    /// Ingest one event from the UI, with thread pairing, then recompute
    pub fn ingest(&mut self, event: Event, now: i64) -> GuardState {
        let ts = event.timestamp;
        match event.data {
            EventData::OpenThread { thread_id: Some(thread_id) } => {
                self.threads.record_open(&thread_id, ts);
                self.detect_reopen(&thread_id, ts, now);
                self.append(Event::open_thread(ts, Some(thread_id)), now);
            }
            EventData::ClickAction { action, label, thread_id } => {
                let action = action.unwrap_or_else(|| ClickAction::infer_from_label(label.as_deref().unwrap_or("")));
                let open_ts = thread_id.as_deref().and_then(|id| self.threads.take_open(id));
                self.append(
                    Event::new(ts, EventData::ClickAction { action: Some(action), label, thread_id }),
                    now,
                );
                if let Some(open_ts) = open_ts {
                    self.append(Event::time_to_first_action(ts, threads::seconds_between(open_ts, ts)), now);
                }
            }
            data => self.append(Event::new(ts, data), now),
        }
        self.recompute(now)
    }

    /// Reopen if the same thread was opened or reopened within the window
    fn detect_reopen(&mut self, thread_id: &str, ts: i64, now: i64) {
        let previous = self
            .log
            .last_matching(|e| {
                matches!(e.kind(), EventKind::OpenThread | EventKind::ReopenSameThread)
                    && e.thread_id() == Some(thread_id)
            })
            .map(|e| e.timestamp);

        if let Some(previous) = previous {
            if ts - previous <= self.config.reopen_within_ms {
                self.append(Event::reopen(ts, Some(thread_id.to_string())), now);
            }
        }
    }

    // ========================================================================
    // DECISION INBOX
    // ========================================================================

    /// Add a reference to the Decision Inbox. Blank references are ignored.
    pub fn defer(&mut self, reference: &str, ts: Option<i64>, source: DeferSource, now: i64) -> Vec<DeferredItem> {
        let Some(reference) = normalize_reference(reference) else {
            log::debug!("Ignoring blank deferred reference");
            return self.deferred.items().to_vec();
        };

        self.deferred.add(DeferredItem {
            reference: reference.clone(),
            timestamp: ts.unwrap_or(now),
            source,
        });
        self.cache.mark_dirty(StorageKey::Deferred, now);
        self.append(
            Event::new(now, EventData::DeferThread { reference: Some(reference) }),
            now,
        );

        self.emitter.emit_deferred(self.deferred.items());
        self.emitter.toast(toasts::DEFERRED_ADDED);
        self.recompute(now);
        self.deferred.items().to_vec()
    }

    pub fn remove_deferred(&mut self, reference: &str, now: i64) -> Vec<DeferredItem> {
        if let Some(reference) = normalize_reference(reference) {
            if self.deferred.remove(&reference) {
                self.cache.mark_dirty(StorageKey::Deferred, now);
            }
        }
        self.emitter.emit_deferred(self.deferred.items());
        self.deferred.items().to_vec()
    }

    // ========================================================================
    // FEEDBACK & DEMO
    // ========================================================================

    /// Explicit user label; bypasses the pseudo-label throttle
    pub fn feedback(&mut self, overloaded: bool, now: i64) -> GuardState {
        self.append(Event::new(now, EventData::ManualOverload { overloaded }), now);

        let fv = compute_feature_vector(self.log.as_slice(), now);
        self.samples.push(Sample::new(&fv, overloaded, now));
        self.cache.mark_dirty(StorageKey::Samples, now);

        self.emitter.toast(if overloaded {
            toasts::FEEDBACK_OVERLOADED
        } else {
            toasts::FEEDBACK_NOT_OVERLOADED
        });
        self.recompute(now)
    }

    /// Inject a synthetic burst for demos. `count` is clamped to 1..=60.
    pub fn simulate_overload(&mut self, count: Option<u32>, now: i64) -> GuardState {
        let count = count.unwrap_or(SIMULATE_DEFAULT).clamp(1, SIMULATE_MAX);
        log::info!("Simulating overload burst of {}", count);

        for i in 0..count {
            let base = now + i64::from(i) * 5;
            let thread_id = format!("sim_{}", i);
            self.append(Event::open_thread(base, Some(thread_id.clone())), now);
            self.append(Event::click(base + 1, ClickAction::Reply), now);
            self.append(Event::hover(base + 2, 8.0), now);
            self.append(Event::context_switch(base + 3, Some(ContextSwitchKind::Blur)), now);
            if i % 4 == 0 {
                self.append(Event::undo(base + 4), now);
            }
            if i % 3 == 0 {
                self.append(Event::reopen(base + 4, Some(thread_id)), now);
            }
        }
        self.recompute(now)
    }

    // ========================================================================
    // TRAINING
    // ========================================================================

    fn start_training(&mut self, reason: TrainReason, now: i64) -> bool {
        match self.orchestrator.begin(reason, &self.samples) {
            Some(job) => {
                self.pending_job = Some(job);
                self.recompute(now);
                true
            }
            None => false,
        }
    }

    /// Manual request. False if a run is already in flight.
    pub fn request_training(&mut self, now: i64) -> bool {
        self.start_training(TrainReason::Manual, now)
    }

    pub fn finish_training(&mut self, outcome: TrainingOutcome, now: i64) -> GuardState {
        match self.orchestrator.complete(outcome, now) {
            Completion::Installed { reason, .. } => {
                self.cache.mark_dirty(StorageKey::ModelArtifacts, now);
                self.cache.mark_dirty(StorageKey::ModelMeta, now);
                self.emitter.toast(toasts::trained(reason));
            }
            Completion::Failed { .. } => self.emitter.toast(toasts::TRAINING_FAILED),
            Completion::Stale => {}
        }
        self.recompute(now)
    }

    // ========================================================================
    // RESET
    // ========================================================================

    /// Clear everything and delete every durable key.
    ///
    /// In-memory state is cleared even if the store fails; the deletions
    /// stay queued and the error is returned.
    pub fn reset(&mut self, now: i64) -> Result<(), StorageError> {
        self.log.clear();
        self.deferred.clear();
        self.samples.clear();
        self.threads.clear();
        self.throttle.reset();
        self.orchestrator.reset_meta();
        self.last_event_type = None;
        if self.pending_job.take().is_some() {
            self.orchestrator.cancel();
        }

        for key in StorageKey::ALL {
            self.cache.mark_removed(key, now);
        }
        let report = self.flush(now);
        log::info!("Session reset ({} keys removed)", report.removed);

        self.emitter.toast(toasts::DATA_CLEARED);
        self.recompute(now);
        self.emitter.emit_deferred(self.deferred.items());

        match report.errors.into_iter().next() {
            Some((_, e)) => Err(e),
            None => Ok(()),
        }
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Flush if the debounce delay has elapsed
    pub fn flush_due(&mut self, now: i64) -> Option<FlushReport> {
        if !self.cache.is_due(now) {
            return None;
        }
        Some(self.flush(now))
    }

    /// Flush whatever is pending (shutdown path)
    pub fn flush_all(&mut self, now: i64) -> FlushReport {
        if !self.cache.has_pending() {
            return FlushReport::default();
        }
        self.flush(now)
    }

    fn flush(&mut self, now: i64) -> FlushReport {
        let Self {
            cache,
            store,
            log: events,
            deferred,
            samples,
            orchestrator,
            ..
        } = self;

        let report = cache.flush(&**store, now, |key| {
            let json = match key {
                StorageKey::Events => serde_json::to_string(events.as_slice())?,
                StorageKey::Deferred => serde_json::to_string(deferred.items())?,
                StorageKey::Samples => serde_json::to_string(&samples.to_vec())?,
                StorageKey::ModelArtifacts => serde_json::to_string(&orchestrator.artifacts())?,
                StorageKey::ModelMeta => serde_json::to_string(&orchestrator.meta())?,
            };
            Ok(json)
        });

        for (key, e) in &report.errors {
            log::error!("Failed to persist {}: {}", key, e);
        }
        if report.written + report.removed > 0 {
            log::debug!("Flushed {} writes, {} removals", report.written, report.removed);
        }
        report
    }
}
