//! Fixed-capacity ring of time buckets, oldest first.
//!
//! The whole ring is one immutable [`RingSnapshot`] published through an
//! [`ArcSwap`]. Every structural change (append, eviction, discard) builds
//! the next snapshot off to the side as a [`Transition`] and installs it with
//! a single compare-and-swap against the snapshot it was derived from.
//! Readers therefore see either the old ring or the new one, never a
//! half-applied change, and a writer that loses the race simply re-reads and
//! recomputes from the winner's state.
//!
//! A snapshot also carries the lifetime totals. A bucket leaving the ring
//! moves to the snapshot's retiring list, is sealed once the move is
//! published, and is folded into the totals by a later transition after its
//! last admitted writer is done. At every step each bucket is counted exactly
//! once: in the ring, in the retiring list, or in the totals.

use std::collections::VecDeque;
use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};

use crate::event::EventKind;
use crate::types::{Bucket, WindowCumulative};

/// Immutable view of the ring at one instant.
#[derive(Debug, Clone)]
pub(crate) struct RingSnapshot<K: EventKind> {
    buckets: VecDeque<Arc<Bucket<K>>>,
    retiring: Vec<Arc<Bucket<K>>>,
    folded: Arc<WindowCumulative>,
}

impl<K: EventKind> RingSnapshot<K> {
    pub(crate) fn len(&self) -> usize {
        self.buckets.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub(crate) fn tail(&self) -> Option<&Arc<Bucket<K>>> {
        self.buckets.back()
    }

    /// Buckets from oldest to newest.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Bucket<K>>> {
        self.buckets.iter()
    }

    /// Everything ever recorded in a counter slot.
    pub(crate) fn lifetime_sum(&self, index: usize) -> u64 {
        let unfolded: u64 = self
            .buckets
            .iter()
            .chain(&self.retiring)
            .map(|bucket| bucket.counter_at(index))
            .sum();

        self.folded.sum(index) + unfolded
    }

    /// Largest value ever recorded in a max slot.
    pub(crate) fn lifetime_max(&self, index: usize) -> u64 {
        self.buckets
            .iter()
            .chain(&self.retiring)
            .map(|bucket| bucket.max_at(index))
            .fold(self.folded.max(index), u64::max)
    }

    /// Buckets out of the ring but not yet folded into the totals.
    pub(crate) fn retiring(&self) -> usize {
        self.retiring.len()
    }

    /// Copy of this snapshot with an empty ring and every settled retiring
    /// bucket folded into the totals.
    fn settled(&self) -> Self {
        let mut folded = Arc::clone(&self.folded);
        let mut retiring = Vec::with_capacity(self.retiring.len());

        for bucket in &self.retiring {
            if bucket.is_settled() {
                bucket.fold_into(Arc::make_mut(&mut folded));
            } else {
                retiring.push(Arc::clone(bucket));
            }
        }

        Self {
            buckets: VecDeque::new(),
            retiring,
            folded,
        }
    }
}

/// A ring change being prepared against one snapshot.
///
/// Nothing is visible to other threads until it is handed to
/// [`BucketRing::publish`].
#[derive(Debug)]
pub(crate) struct Transition<K: EventKind> {
    capacity: usize,
    next: RingSnapshot<K>,
    displaced: Vec<Arc<Bucket<K>>>,
}

impl<K: EventKind> Transition<K> {
    /// Appends `bucket` as the new tail, evicting the oldest bucket first if
    /// the ring is full. Returns the evicted bucket, if any.
    pub(crate) fn append_evicting(&mut self, bucket: Bucket<K>) -> Option<Arc<Bucket<K>>> {
        let evicted = if self.next.len() >= self.capacity {
            self.next.buckets.pop_front()
        } else {
            None
        };

        if let Some(evicted) = &evicted {
            self.displace(Arc::clone(evicted));
        }

        self.next.buckets.push_back(Arc::new(bucket));
        evicted
    }

    pub(crate) fn displaced(&self) -> usize {
        self.displaced.len()
    }

    fn displace(&mut self, bucket: Arc<Bucket<K>>) {
        self.next.retiring.push(Arc::clone(&bucket));
        self.displaced.push(bucket);
    }
}

#[derive(Debug)]
pub(crate) struct BucketRing<K: EventKind> {
    capacity: usize,
    state: ArcSwap<RingSnapshot<K>>,
}

impl<K: EventKind> BucketRing<K> {
    pub(crate) fn new(capacity: usize, totals: WindowCumulative) -> Self {
        Self {
            capacity,
            state: ArcSwap::from_pointee(RingSnapshot {
                buckets: VecDeque::new(),
                retiring: Vec::new(),
                folded: Arc::new(totals),
            }),
        }
    }

    /// Owned handle on the current snapshot, suitable as a CAS expectation.
    pub(crate) fn snapshot(&self) -> Arc<RingSnapshot<K>> {
        self.state.load_full()
    }

    /// Cheap read guard on the current snapshot.
    pub(crate) fn load(&self) -> Guard<Arc<RingSnapshot<K>>> {
        self.state.load()
    }

    /// Starts a transition that keeps the buckets of `from` and appends to it.
    pub(crate) fn extend(&self, from: &RingSnapshot<K>) -> Transition<K> {
        let mut next = from.settled();
        next.buckets = from.buckets.clone();

        Transition {
            capacity: self.capacity,
            next,
            displaced: Vec::new(),
        }
    }

    /// Starts a transition that displaces every bucket in `from`, optionally
    /// installing `replacement` as the sole bucket of the new ring.
    pub(crate) fn replace(
        &self,
        from: &RingSnapshot<K>,
        replacement: Option<Bucket<K>>,
    ) -> Transition<K> {
        let mut transition = Transition {
            capacity: self.capacity,
            next: from.settled(),
            displaced: Vec::with_capacity(from.len()),
        };

        for bucket in &from.buckets {
            transition.displace(Arc::clone(bucket));
        }

        if let Some(bucket) = replacement {
            transition.append_evicting(bucket);
        }

        transition
    }

    /// Installs `transition` if the ring still holds `current`.
    ///
    /// On success the displaced buckets are sealed and the new snapshot is
    /// returned. On failure nothing changes and the caller must re-read.
    pub(crate) fn publish(
        &self,
        current: &Arc<RingSnapshot<K>>,
        transition: Transition<K>,
    ) -> Option<Arc<RingSnapshot<K>>> {
        let Transition {
            next, displaced, ..
        } = transition;
        let next = Arc::new(next);

        let previous = self.state.compare_and_swap(current, Arc::clone(&next));
        if !Arc::ptr_eq(&previous, current) {
            return None;
        }

        for bucket in &displaced {
            bucket.retire();
        }

        Some(next)
    }
}
