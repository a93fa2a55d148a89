//! Metrics registry for neurochain
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by the tracker and its collaborators.
///
/// All counters use `Relaxed` ordering; they are informational and never
/// feed back into control flow.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    incidents_opened: AtomicU64,
    events_recorded: AtomicU64,
    chain_entries_appended: AtomicU64,
    chain_verifications: AtomicU64,
    chain_verification_failures: AtomicU64,
    score_fallbacks: AtomicU64,
    responses_drafted: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_incidents_opened(&self) {
        self.incidents_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_events_recorded(&self) {
        self.events_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_chain_entries(&self) {
        self.chain_entries_appended.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one full chain verification
    pub fn record_verification(&self, intact: bool) {
        self.chain_verifications.fetch_add(1, Ordering::Relaxed);
        if !intact {
            self.chain_verification_failures
                .fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_score_fallbacks(&self) {
        self.score_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_responses_drafted(&self) {
        self.responses_drafted.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            incidents_opened: self.incidents_opened.load(Ordering::Relaxed),
            events_recorded: self.events_recorded.load(Ordering::Relaxed),
            chain_entries_appended: self.chain_entries_appended.load(Ordering::Relaxed),
            chain_verifications: self.chain_verifications.load(Ordering::Relaxed),
            chain_verification_failures: self
                .chain_verification_failures
                .load(Ordering::Relaxed),
            score_fallbacks: self.score_fallbacks.load(Ordering::Relaxed),
            responses_drafted: self.responses_drafted.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub incidents_opened: u64,
    pub events_recorded: u64,
    pub chain_entries_appended: u64,
    pub chain_verifications: u64,
    pub chain_verification_failures: u64,
    pub score_fallbacks: u64,
    pub responses_drafted: u64,
}
