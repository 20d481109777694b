use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime totals for every bucket that has been folded out of the window.
///
/// Counter slots only ever grow by folding a settled bucket in. Max slots
/// keep the largest value any folded bucket held. A value is never mutated
/// once published in a ring snapshot; folding works on a private copy.
#[derive(Debug, Clone)]
pub(crate) struct WindowCumulative {
    counters: Box<[u64]>,
    maxes: Box<[u64]>,
}

impl WindowCumulative {
    pub(crate) fn new(counters: usize, maxes: usize) -> Self {
        Self {
            counters: vec![0; counters].into_boxed_slice(),
            maxes: vec![0; maxes].into_boxed_slice(),
        }
    }

    /// Merges one bucket's accumulators into the running totals.
    pub(crate) fn fold(&mut self, counters: &[AtomicU64], maxes: &[AtomicU64]) {
        for (total, counter) in self.counters.iter_mut().zip(counters) {
            *total += counter.load(Ordering::Relaxed);
        }

        for (total, max) in self.maxes.iter_mut().zip(maxes) {
            *total = (*total).max(max.load(Ordering::Relaxed));
        }
    }

    pub(crate) fn sum(&self, index: usize) -> u64 {
        self.counters[index]
    }

    pub(crate) fn max(&self, index: usize) -> u64 {
        self.maxes[index]
    }
}
