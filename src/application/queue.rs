//! Pending-event queue.
//!
//! An insertion-ordered buffer of events awaiting transmission. Ordering only
//! matters for the line order of a batch POST body. The queue also owns the
//! batching threshold decision; the tracker consults it after every enqueue.

use crate::domain::event::Event;

/// Ordered buffer of events between enqueue and flush.
///
/// Invariant: empty after every flush, whether the transport call succeeded
/// or failed. Single-owner; callers in multi-threaded hosts serialize access
/// externally.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, preserving insertion order.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every pending event out of the queue, leaving it empty.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Drop all pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Whether an immediate flush is due.
    ///
    /// True when any of: debug mode is on, batching is disabled, or the queue
    /// has reached the configured maximum batch size. An empty queue never
    /// flushes.
    pub fn should_flush(&self, debug: bool, batching: bool, max_batch_hits: usize) -> bool {
        if self.is_empty() {
            return false;
        }
        debug || !batching || self.len() >= max_batch_hits
    }
}
