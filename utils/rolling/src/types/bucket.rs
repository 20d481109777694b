use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{WindowCumulative, raise_max};
use crate::error::misuse;
use crate::event::{EventKind, Layout, Slot};

/// Set in `writers` once the bucket has left the ring.
const SEALED: u64 = 1 << 63;

/// One `bucket_size_ms`-wide slice of the rolling window.
///
/// A bucket holds one additive accumulator per counter kind and one
/// max-tracker per max-updater kind. Its start time never changes after
/// creation; only the accumulators move.
///
/// Once a bucket leaves the ring it is sealed: new writes are refused and
/// redirected to the current tail. Its contents become final as soon as the
/// writers that got in before the seal have finished, and only then are they
/// folded into the lifetime totals. Holding on to a bucket returned by
/// [`RollingNumber::current_bucket`](crate::RollingNumber::current_bucket)
/// has no effect on that.
#[derive(Debug)]
pub struct Bucket<K: EventKind> {
    start_ms: i64,
    counters: Box<[AtomicU64]>,
    maxes: Box<[AtomicU64]>,
    /// Seal bit plus the number of writers currently updating accumulators.
    writers: AtomicU64,
    layout: Arc<Layout<K>>,
}

/// A writer admitted into an unsealed bucket.
pub(crate) struct WriteGuard<'a> {
    writers: &'a AtomicU64,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.writers.fetch_sub(1, Ordering::Release);
    }
}

impl<K: EventKind> Bucket<K> {
    pub(crate) fn new(start_ms: i64, layout: &Arc<Layout<K>>) -> Self {
        Self {
            start_ms,
            counters: (0..layout.counters()).map(|_| AtomicU64::new(0)).collect(),
            maxes: (0..layout.maxes()).map(|_| AtomicU64::new(0)).collect(),
            writers: AtomicU64::new(0),
            layout: Arc::clone(layout),
        }
    }

    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// Total recorded for a counter kind.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a max-updater kind or is missing from its catalog.
    pub fn sum(&self, kind: K) -> u64 {
        let index = self.layout.counter(kind).unwrap_or_else(|err| misuse(err));
        self.counter_at(index)
    }

    /// Largest value reported for a max-updater kind.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is a counter kind or is missing from its catalog.
    pub fn max(&self, kind: K) -> u64 {
        let index = self.layout.max(kind).unwrap_or_else(|err| misuse(err));
        self.max_at(index)
    }

    /// The sum or the max, whichever the kind's category calls for.
    pub fn value(&self, kind: K) -> u64 {
        let slot = self.layout.slot(kind).unwrap_or_else(|err| misuse(err));
        self.value_at(slot)
    }

    /// Whether the bucket has left its ring and refuses new writes.
    pub fn is_retired(&self) -> bool {
        self.writers.load(Ordering::Acquire) & SEALED != 0
    }

    pub(crate) fn value_at(&self, slot: Slot) -> u64 {
        match slot {
            Slot::Counter(index) => self.counter_at(index),
            Slot::Max(index) => self.max_at(index),
        }
    }

    pub(crate) fn counter_at(&self, index: usize) -> u64 {
        self.counters[index].load(Ordering::Relaxed)
    }

    pub(crate) fn max_at(&self, index: usize) -> u64 {
        self.maxes[index].load(Ordering::Relaxed)
    }

    /// Adds to a counter slot unless the bucket is sealed.
    ///
    /// Returns `false` when the caller must find the new tail bucket instead.
    pub(crate) fn try_add(&self, index: usize, value: u64) -> bool {
        let Some(_write) = self.begin_write() else {
            return false;
        };

        self.counters[index].fetch_add(value, Ordering::Relaxed);
        true
    }

    /// Raises a max slot unless the bucket is sealed.
    pub(crate) fn try_update_max(&self, index: usize, value: u64) -> bool {
        let Some(_write) = self.begin_write() else {
            return false;
        };

        raise_max(&self.maxes[index], value);
        true
    }

    /// Refuses every write that has not already been admitted.
    pub(crate) fn retire(&self) {
        self.writers.fetch_or(SEALED, Ordering::AcqRel);
    }

    /// Sealed with no writer mid-update: the accumulators are final.
    pub(crate) fn is_settled(&self) -> bool {
        self.writers.load(Ordering::Acquire) == SEALED
    }

    pub(crate) fn fold_into(&self, totals: &mut WindowCumulative) {
        totals.fold(&self.counters, &self.maxes);
    }

    /// Admits a writer, or returns `None` once the bucket is sealed.
    ///
    /// The bucket cannot settle while the returned guard is alive.
    pub(crate) fn begin_write(&self) -> Option<WriteGuard<'_>> {
        let previous = self.writers.fetch_add(1, Ordering::AcqRel);

        if previous & SEALED != 0 {
            self.writers.fetch_sub(1, Ordering::Release);
            return None;
        }

        Some(WriteGuard {
            writers: &self.writers,
        })
    }
}
