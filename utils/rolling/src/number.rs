//! The rolling-window counter.

use std::sync::Arc;

use arc_swap::Guard;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::RollingConfig;
use crate::error::{Result, misuse};
use crate::event::{EventKind, Layout};
use crate::ring::{BucketRing, RingSnapshot, Transition};
use crate::types::{Bucket, WindowCumulative};

/// Lock-free counter over a sliding time window.
///
/// The window is `window_ms` wide and sliced into `bucket_count` buckets.
/// Writers bump accumulators in the newest bucket; readers aggregate over
/// whatever buckets the ring currently holds. Every call first brings the
/// ring up to date with the clock (see [`current_bucket`](Self::current_bucket)),
/// so reads alone are enough to roll stale buckets out.
///
/// Counts that leave the window are not lost: they are folded into lifetime
/// totals reported by [`cumulative_sum`](Self::cumulative_sum). The totals
/// travel with the ring snapshot, so every read sees the window and the
/// history from the same instant.
///
/// ```rust
/// use std::sync::Arc;
/// use loka_rolling::{ManualClock, RollingConfig, RollingEvent, RollingNumber};
///
/// let clock = Arc::new(ManualClock::new());
/// let counter: RollingNumber<RollingEvent, _> =
///     RollingNumber::with_clock(RollingConfig::new(200, 10), Arc::clone(&clock)).unwrap();
///
/// counter.increment(RollingEvent::Success);
/// counter.increment(RollingEvent::Failure);
/// clock.advance(60);
/// counter.increment(RollingEvent::Success);
///
/// assert_eq!(counter.rolling_sum(RollingEvent::Success), 2);
/// assert_eq!(counter.values_per_bucket(RollingEvent::Success), vec![1, 0, 0, 1]);
/// ```
#[derive(Debug)]
pub struct RollingNumber<K: EventKind, C: Clock = SystemClock> {
    config: RollingConfig,
    window_ms: i64,
    bucket_size_ms: i64,
    layout: Arc<Layout<K>>,
    ring: BucketRing<K>,
    clock: C,
}

/// What a housekeeping pass is about to do to the ring.
#[derive(Debug, Clone, Copy)]
enum Advance {
    Open,
    Roll { elapsed: i64 },
    Discard { stale: usize },
}

impl<K: EventKind> RollingNumber<K> {
    /// Creates a counter driven by the system clock.
    pub fn new(config: RollingConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<K: EventKind, C: Clock> RollingNumber<K, C> {
    /// Creates a counter driven by `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](crate::ConfigError) (wrapped in
    /// [`RollingError::Config`](crate::RollingError::Config)) if the window or
    /// bucket count is zero, the window does not divide evenly into buckets,
    /// or the event catalog is malformed.
    pub fn with_clock(config: RollingConfig, clock: C) -> Result<Self> {
        config.validate()?;

        let layout = Arc::new(Layout::new()?);
        let totals = WindowCumulative::new(layout.counters(), layout.maxes());

        Ok(Self {
            config,
            window_ms: config.window_ms as i64,
            bucket_size_ms: config.bucket_size_ms() as i64,
            ring: BucketRing::new(config.bucket_count, totals),
            layout,
            clock,
        })
    }

    pub fn config(&self) -> &RollingConfig {
        &self.config
    }

    pub fn window_ms(&self) -> u64 {
        self.config.window_ms
    }

    pub fn bucket_count(&self) -> usize {
        self.config.bucket_count
    }

    pub fn bucket_size_ms(&self) -> u64 {
        self.config.bucket_size_ms()
    }

    /// Number of buckets the ring holds right now, without rolling it forward.
    pub fn ring_len(&self) -> usize {
        self.ring.load().len()
    }

    /// Adds one to a counter kind.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a max-updater kind or is missing from its catalog.
    pub fn increment(&self, kind: K) {
        self.add(kind, 1);
    }

    /// Adds `value` to a counter kind.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a max-updater kind or is missing from its catalog.
    pub fn add(&self, kind: K, value: u64) {
        let index = self.layout.counter(kind).unwrap_or_else(|err| misuse(err));

        // A retired tail means the ring moved under us; record into the new one.
        loop {
            if self.current_bucket().try_add(index, value) {
                break;
            }
        }
    }

    /// Raises the current bucket's value for a max-updater kind to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a counter kind or is missing from its catalog.
    pub fn update_max(&self, kind: K, value: u64) {
        let index = self.layout.max(kind).unwrap_or_else(|err| misuse(err));

        loop {
            if self.current_bucket().try_update_max(index, value) {
                break;
            }
        }
    }

    /// Sum of a counter kind across every bucket in the window.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a max-updater kind or is missing from its catalog.
    pub fn rolling_sum(&self, kind: K) -> u64 {
        let index = self.layout.counter(kind).unwrap_or_else(|err| misuse(err));

        self.window().iter().map(|bucket| bucket.counter_at(index)).sum()
    }

    /// Largest value of a max-updater kind across the window, 0 if none.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a counter kind or is missing from its catalog.
    pub fn rolling_max(&self, kind: K) -> u64 {
        let index = self.layout.max(kind).unwrap_or_else(|err| misuse(err));

        self.window()
            .iter()
            .map(|bucket| bucket.max_at(index))
            .max()
            .unwrap_or(0)
    }

    /// One value per bucket, oldest first: the sum for counter kinds, the
    /// max for max-updater kinds.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is missing from its catalog.
    pub fn values_per_bucket(&self, kind: K) -> Vec<u64> {
        let slot = self.layout.slot(kind).unwrap_or_else(|err| misuse(err));

        self.window().iter().map(|bucket| bucket.value_at(slot)).collect()
    }

    /// Value held by the newest bucket only.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is missing from its catalog.
    pub fn latest_bucket_value(&self, kind: K) -> u64 {
        self.current_bucket().value(kind)
    }

    /// Every event ever recorded for a counter kind: folded history plus the
    /// buckets still in the window, read from one snapshot.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a max-updater kind or is missing from its catalog.
    pub fn cumulative_sum(&self, kind: K) -> u64 {
        let index = self.layout.counter(kind).unwrap_or_else(|err| misuse(err));

        self.window().lifetime_sum(index)
    }

    /// Largest value ever reported for a max-updater kind, including
    /// buckets that have already left the window.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a counter kind or is missing from its catalog.
    pub fn cumulative_max(&self, kind: K) -> u64 {
        let index = self.layout.max(kind).unwrap_or_else(|err| misuse(err));

        self.window().lifetime_max(index)
    }

    /// Folds every bucket into the lifetime totals and empties the window.
    ///
    /// No replacement bucket is installed; the next call creates one.
    /// Cumulative totals are kept.
    pub fn reset(&self) {
        loop {
            let current = self.ring.snapshot();
            if current.is_empty() {
                return;
            }

            let transition = self.ring.replace(&current, None);
            let discarded = transition.displaced();

            if self.ring.publish(&current, transition).is_some() {
                debug!(discarded, "Reset rolling window");
                return;
            }

            trace!("Rolling window changed during reset, retrying");
        }
    }

    /// Brings the ring up to date with the clock and returns its newest bucket.
    ///
    /// - An empty ring gets a first bucket starting now.
    /// - Within the newest bucket's span (or if the clock went backwards) the
    ///   ring is left alone.
    /// - After a full window of silence every bucket is folded away and a
    ///   single fresh bucket starts now.
    /// - Otherwise the elapsed periods are filled with buckets aligned to the
    ///   newest one, evicting the oldest as needed.
    ///
    /// Each change is installed with one compare-and-swap; concurrent callers
    /// racing for the same time range converge on a single winner's buckets.
    pub fn current_bucket(&self) -> Arc<Bucket<K>> {
        let now = self.clock.current_time_millis();

        loop {
            let current = self.ring.snapshot();

            let (transition, advance) = match current.tail() {
                None => (
                    self.ring.replace(&current, Some(self.bucket_at(now))),
                    Advance::Open,
                ),
                Some(tail) => {
                    let delta = now - tail.start_ms();

                    if delta < self.bucket_size_ms {
                        return Arc::clone(tail);
                    }

                    if delta >= self.window_ms {
                        (
                            self.ring.replace(&current, Some(self.bucket_at(now))),
                            Advance::Discard {
                                stale: current.len(),
                            },
                        )
                    } else {
                        let elapsed = delta / self.bucket_size_ms;
                        (
                            self.roll(&current, tail.start_ms(), elapsed),
                            Advance::Roll { elapsed },
                        )
                    }
                }
            };

            let evicted = transition.displaced();

            match self.ring.publish(&current, transition) {
                Some(next) => {
                    match advance {
                        Advance::Open => debug!(start_ms = now, "Opened rolling window"),
                        Advance::Roll { elapsed } => debug!(
                            elapsed,
                            evicted,
                            ring_len = next.len(),
                            "Advanced rolling window"
                        ),
                        Advance::Discard { stale } => {
                            debug!(stale, start_ms = now, "Discarded stale rolling window")
                        }
                    }

                    if let Some(tail) = next.tail() {
                        return Arc::clone(tail);
                    }
                }
                None => trace!(now, "Lost race advancing rolling window, retrying"),
            }
        }
    }

    pub(crate) fn layout(&self) -> &Layout<K> {
        &self.layout
    }

    /// Fills `elapsed` periods after `last_start` with empty buckets.
    fn roll(&self, current: &RingSnapshot<K>, last_start: i64, elapsed: i64) -> Transition<K> {
        let mut transition = self.ring.extend(current);

        for period in 1..=elapsed {
            transition.append_evicting(self.bucket_at(last_start + period * self.bucket_size_ms));
        }

        transition
    }

    /// Current ring snapshot after housekeeping.
    fn window(&self) -> Guard<Arc<RingSnapshot<K>>> {
        drop(self.current_bucket());
        self.ring.load()
    }

    fn bucket_at(&self, start_ms: i64) -> Bucket<K> {
        Bucket::new(start_ms, &self.layout)
    }
}
