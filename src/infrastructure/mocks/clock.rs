//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, so cache busters and
/// event timestamps become deterministic.
///
/// # Thread Safety
///
/// `MockClock` is thread-safe and can be cloned to share across threads. All
/// clones share the same underlying time value, so advancing time in one
/// clone affects all clones.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    current: Arc<AtomicU64>,
}

impl MockClock {
    /// Create a mock clock starting at the given epoch second.
    pub fn new(start: u64) -> Self {
        Self {
            current: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Advance the clock by whole seconds.
    pub fn advance(&self, seconds: u64) {
        self.current.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Set the clock to a specific epoch second.
    pub fn set(&self, epoch_seconds: u64) {
        self.current.store(epoch_seconds, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}
