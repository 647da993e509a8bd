//! Training samples - bounded ring buffer plus the pseudo-label throttle

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(alias = "x")]
    pub features: [f32; FEATURE_COUNT],
    /// 0 = calm, 1 = overloaded
    #[serde(alias = "y")]
    pub label: u8,
    #[serde(rename = "ts", alias = "timestamp")]
    pub timestamp: i64,
}

impl Sample {
    pub fn new(fv: &FeatureVector, overloaded: bool, timestamp: i64) -> Self {
        Self {
            features: fv.values,
            label: u8::from(overloaded),
            timestamp,
        }
    }

    /// `(x, y)` pair for the fitter; any non-zero label counts as 1
    pub fn as_pair(&self) -> ([f32; FEATURE_COUNT], f32) {
        (self.features, if self.label > 0 { 1.0 } else { 0.0 })
    }
}

// ============================================================================
// RING BUFFER
// ============================================================================

/// Oldest samples are evicted once `capacity` is reached
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity: capacity.max(1),
        }
    }

    /// Restore from storage, keeping only the newest `capacity` entries
    pub fn from_samples(samples: Vec<Sample>, capacity: usize) -> Self {
        let mut buffer = Self::new(capacity);
        for s in samples {
            buffer.push(s);
        }
        buffer
    }

    pub fn push(&mut self, sample: Sample) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// The newest `n` samples, oldest first
    pub fn recent(&self, n: usize) -> Vec<Sample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

// ============================================================================
// THROTTLE
// ============================================================================

/// At most one pseudo-label per `interval_ms`
#[derive(Debug, Clone)]
pub struct SampleThrottle {
    interval_ms: i64,
    last: Option<i64>,
}

impl SampleThrottle {
    pub fn new(interval_ms: i64) -> Self {
        Self { interval_ms, last: None }
    }

    /// True (and arms the throttle) when a sample may be taken at `now`
    pub fn try_acquire(&mut self, now: i64) -> bool {
        let ready = match self.last {
            None => true,
            Some(last) => now - last > self.interval_ms,
        };
        if ready {
            self.last = Some(now);
        }
        ready
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
