//! Adapters that expose a rolling counter through the `metrics` facade.
//!
//! ```rust
//! use std::sync::Arc;
//! use loka_rolling::{RollingConfig, RollingEvent, RollingNumber};
//!
//! let number = Arc::new(RollingNumber::<RollingEvent>::new(RollingConfig::default()).unwrap());
//!
//! let successes = number.counter(RollingEvent::Success).unwrap();
//! successes.increment(3);
//!
//! let active = number.max_tracker(RollingEvent::ThreadMaxActive).unwrap();
//! active.record(12.0);
//!
//! assert_eq!(number.rolling_sum(RollingEvent::Success), 3);
//! assert_eq!(number.rolling_max(RollingEvent::ThreadMaxActive), 12);
//! ```

use std::sync::Arc;

use crate::clock::Clock;
use crate::error::Result;
use crate::event::EventKind;
use crate::number::RollingNumber;

/// `metrics::CounterFn` backed by one counter kind of a rolling counter.
#[derive(Debug)]
pub struct RollingCounter<K: EventKind, C: Clock> {
    number: Arc<RollingNumber<K, C>>,
    kind: K,
}

impl<K: EventKind, C: Clock> metrics::CounterFn for RollingCounter<K, C> {
    fn increment(&self, value: u64) {
        self.number.add(self.kind, value);
    }

    /// Tops the lifetime total up to `value`; never lowers it.
    fn absolute(&self, value: u64) {
        let total = self.number.cumulative_sum(self.kind);

        if value > total {
            self.number.add(self.kind, value - total);
        }
    }
}

/// `metrics::HistogramFn` backed by one max-updater kind of a rolling counter.
///
/// Each recorded value raises the current bucket's maximum. NaN is skipped and
/// negative values clamp to zero.
#[derive(Debug)]
pub struct RollingMaxTracker<K: EventKind, C: Clock> {
    number: Arc<RollingNumber<K, C>>,
    kind: K,
}

impl<K: EventKind, C: Clock> metrics::HistogramFn for RollingMaxTracker<K, C> {
    fn record(&self, value: f64) {
        if value.is_nan() {
            return;
        }

        self.number.update_max(self.kind, value.max(0.0) as u64);
    }
}

impl<K: EventKind, C: Clock> RollingNumber<K, C> {
    /// Wraps a counter kind as a [`metrics::Counter`].
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::CategoryMismatch`](crate::RollingError::CategoryMismatch)
    /// if `kind` is a max-updater kind.
    /// Returns [`RollingError::UndeclaredKind`](crate::RollingError::UndeclaredKind)
    /// if `kind` is missing from its catalog.
    pub fn counter(self: &Arc<Self>, kind: K) -> Result<metrics::Counter> {
        self.layout().counter(kind)?;

        Ok(metrics::Counter::from_arc(Arc::new(RollingCounter {
            number: Arc::clone(self),
            kind,
        })))
    }

    /// Wraps a max-updater kind as a [`metrics::Histogram`].
    ///
    /// # Errors
    ///
    /// Returns [`RollingError::CategoryMismatch`](crate::RollingError::CategoryMismatch)
    /// if `kind` is a counter kind.
    /// Returns [`RollingError::UndeclaredKind`](crate::RollingError::UndeclaredKind)
    /// if `kind` is missing from its catalog.
    pub fn max_tracker(self: &Arc<Self>, kind: K) -> Result<metrics::Histogram> {
        self.layout().max(kind)?;

        Ok(metrics::Histogram::from_arc(Arc::new(RollingMaxTracker {
            number: Arc::clone(self),
            kind,
        })))
    }
}
