//! Observability counters for the tracker.
//!
//! Tracks how many events were accepted, how many were dropped before
//! enqueue, and how flushes fared. All counters use atomic operations so a
//! shared handle can be read from a monitoring thread while the tracker
//! works.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing tracker activity.
///
/// Cloning is cheap; all clones share the same underlying counters.
#[derive(Debug, Clone, Default)]
pub struct TrackerMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Events that passed validation and entered the queue.
    events_queued: AtomicU64,
    /// Events dropped before enqueue (validation failure or tracker
    /// disabled).
    events_dropped: AtomicU64,
    /// Hits handed to the transport in flushes that settled successfully.
    hits_delivered: AtomicU64,
    /// Flushes that failed (transport error, non-2xx, rejected hits).
    flush_failures: AtomicU64,
}

impl TrackerMetrics {
    /// Create a fresh set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_queued(&self) {
        self.inner.events_queued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.inner.events_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self, hits: u64) {
        self.inner.hits_delivered.fetch_add(hits, Ordering::Relaxed);
    }

    pub(crate) fn record_flush_failure(&self) {
        self.inner.flush_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Events that entered the queue.
    pub fn events_queued(&self) -> u64 {
        self.inner.events_queued.load(Ordering::Relaxed)
    }

    /// Events dropped before enqueue.
    pub fn events_dropped(&self) -> u64 {
        self.inner.events_dropped.load(Ordering::Relaxed)
    }

    /// Hits delivered by successful flushes.
    pub fn hits_delivered(&self) -> u64 {
        self.inner.hits_delivered.load(Ordering::Relaxed)
    }

    /// Flushes that failed.
    pub fn flush_failures(&self) -> u64 {
        self.inner.flush_failures.load(Ordering::Relaxed)
    }

    /// Point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_queued: self.events_queued(),
            events_dropped: self.events_dropped(),
            hits_delivered: self.hits_delivered(),
            flush_failures: self.flush_failures(),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inner.events_queued.store(0, Ordering::Relaxed);
        self.inner.events_dropped.store(0, Ordering::Relaxed);
        self.inner.hits_delivered.store(0, Ordering::Relaxed);
        self.inner.flush_failures.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of tracker metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Events that entered the queue.
    pub events_queued: u64,
    /// Events dropped before enqueue.
    pub events_dropped: u64,
    /// Hits delivered by successful flushes.
    pub hits_delivered: u64,
    /// Flushes that failed.
    pub flush_failures: u64,
}

impl MetricsSnapshot {
    /// Ratio of dropped events to all events offered (0.0 to 1.0).
    pub fn drop_rate(&self) -> f64 {
        let total = self.events_queued.saturating_add(self.events_dropped);
        if total == 0 {
            0.0
        } else {
            self.events_dropped as f64 / total as f64
        }
    }
}
