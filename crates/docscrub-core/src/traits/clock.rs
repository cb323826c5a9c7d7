//! Wall-clock time source.
//!
//! Artifact ages are measured against file modification times, so the
//! cleanup code asks a [`Clock`] for "now" instead of reading the system
//! clock directly. Tests substitute a clock that can jump forward.

use std::fmt::Debug;
#[cfg(any(test, feature = "test-util"))]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(any(test, feature = "test-util"))]
use std::time::Duration;
use std::time::SystemTime;

/// Time source for age comparisons against filesystem timestamps.
pub trait Clock: Send + Sync + Debug + 'static {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that runs `offset` ahead of the system clock.
///
/// Advancing it makes every existing file look older without touching the
/// filesystem, which lets retention rules be exercised quickly.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct ManualClock {
    /// Offset in milliseconds.
    offset_ms: AtomicU64,
}

#[cfg(any(test, feature = "test-util"))]
impl ManualClock {
    /// Create a clock with no offset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(by, Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        SystemTime::now() + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}
