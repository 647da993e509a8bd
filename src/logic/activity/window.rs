//! Event Log & Window Manager
//!
//! Chronological event store with a 30 minute sliding window. Pruning
//! advances a cursor from the head while entries are stale, so a log that
//! is already mostly inside the window costs only the stale prefix.

use super::event::Event;

/// Sliding window length (30 minutes)
pub const WINDOW_MS: i64 = 30 * 60 * 1000;

/// Sub-slice of `events` with `timestamp >= now - WINDOW_MS`.
///
/// Assumes ascending timestamps; the first in-window entry ends the scan.
pub fn prune_window(events: &[Event], now: i64) -> &[Event] {
    let cutoff = now - WINDOW_MS;
    let mut first = 0;
    while first < events.len() && events[first].timestamp < cutoff {
        first += 1;
    }
    &events[first..]
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Add to the tail
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Drop the stale prefix in place, returns how many entries went
    pub fn prune(&mut self, now: i64) -> usize {
        let stale = self.events.len() - prune_window(&self.events, now).len();
        if stale > 0 {
            self.events.drain(..stale);
        }
        stale
    }

    /// In-window view without mutating
    pub fn window(&self, now: i64) -> &[Event] {
        prune_window(&self.events, now)
    }

    /// Most recent event matching `pred`
    pub fn last_matching<P>(&self, pred: P) -> Option<&Event>
    where
        P: Fn(&Event) -> bool,
    {
        self.events.iter().rev().find(|e| pred(e))
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
