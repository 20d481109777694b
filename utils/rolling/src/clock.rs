//! Time sources for rolling counters.
//!
//! Nothing else in the crate reads real time. Production code uses
//! [`SystemClock`]; tests drive a [`ManualClock`] by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Supplies the current time in milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn current_time_millis(&self) -> i64;
}

impl<C: Clock> Clock for Arc<C> {
    fn current_time_millis(&self) -> i64 {
        (**self).current_time_millis()
    }
}

/// Wall clock that never runs backwards.
///
/// The Unix-epoch millisecond reading is captured once at construction and
/// advanced from a monotonic [`Instant`] afterwards, so NTP steps or manual
/// clock changes cannot move bucket boundaries backwards.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    origin_ms: i64,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        let origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64;

        Self {
            origin: Instant::now(),
            origin_ms,
        }
    }
}

impl Clock for SystemClock {
    fn current_time_millis(&self) -> i64 {
        self.origin_ms + self.origin.elapsed().as_millis() as i64
    }
}

/// Manually advanced clock for deterministic tests.
///
/// ```rust
/// use loka_rolling::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(20);
/// assert_eq!(clock.current_time_millis(), 20);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(millis: i64) -> Self {
        Self {
            now: AtomicI64::new(millis),
        }
    }

    /// Moves the clock forward (or backward, for negative `millis`).
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn current_time_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
