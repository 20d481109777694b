//! Event kinds and how they map onto bucket accumulators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RollingError};

/// How a kind is accumulated inside a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Summed: every event adds to the bucket total.
    Counter,
    /// Max-tracked: the bucket keeps the largest value reported.
    MaxUpdater,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Counter => write!(f, "counter"),
            EventCategory::MaxUpdater => write!(f, "max-updater"),
        }
    }
}

/// A closed catalog of event kinds a rolling counter tracks.
///
/// `ALL` lists every kind once; `ordinal` must be a dense index into it.
/// The catalog is resolved into accumulator slots when the counter is built,
/// so the hot path never inspects kinds beyond a table lookup.
///
/// ```rust
/// use loka_rolling::{EventCategory, EventKind};
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Request {
///     Served,
///     Dropped,
///     QueueDepth,
/// }
///
/// impl EventKind for Request {
///     const ALL: &'static [Self] = &[Request::Served, Request::Dropped, Request::QueueDepth];
///
///     fn ordinal(self) -> usize {
///         self as usize
///     }
///
///     fn category(self) -> EventCategory {
///         match self {
///             Request::QueueDepth => EventCategory::MaxUpdater,
///             _ => EventCategory::Counter,
///         }
///     }
/// }
/// ```
pub trait EventKind: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn ordinal(self) -> usize;

    fn category(self) -> EventCategory;
}

/// Outcomes of a guarded call, plus concurrency high-water marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollingEvent {
    Success,
    Failure,
    Timeout,
    ShortCircuited,
    ThreadPoolRejected,
    SemaphoreRejected,
    FallbackSuccess,
    FallbackFailure,
    FallbackRejection,
    ExceptionThrown,
    ThreadExecution,
    Collapsed,
    ResponseFromCache,
    ThreadMaxActive,
    CommandMaxActive,
}

impl EventKind for RollingEvent {
    const ALL: &'static [Self] = &[
        RollingEvent::Success,
        RollingEvent::Failure,
        RollingEvent::Timeout,
        RollingEvent::ShortCircuited,
        RollingEvent::ThreadPoolRejected,
        RollingEvent::SemaphoreRejected,
        RollingEvent::FallbackSuccess,
        RollingEvent::FallbackFailure,
        RollingEvent::FallbackRejection,
        RollingEvent::ExceptionThrown,
        RollingEvent::ThreadExecution,
        RollingEvent::Collapsed,
        RollingEvent::ResponseFromCache,
        RollingEvent::ThreadMaxActive,
        RollingEvent::CommandMaxActive,
    ];

    fn ordinal(self) -> usize {
        self as usize
    }

    fn category(self) -> EventCategory {
        match self {
            RollingEvent::ThreadMaxActive | RollingEvent::CommandMaxActive => {
                EventCategory::MaxUpdater
            }
            _ => EventCategory::Counter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Counter(usize),
    Max(usize),
}

/// Ordinal-to-slot table shared by every bucket of one counter.
///
/// Each entry remembers the kind that claimed the ordinal, so a kind missing
/// from `ALL` is rejected instead of borrowing another kind's slot.
#[derive(Debug)]
pub(crate) struct Layout<K> {
    slots: Box<[(K, Slot)]>,
    counters: usize,
    maxes: usize,
}

impl<K: EventKind> Layout<K> {
    pub(crate) fn new() -> Result<Self, ConfigError> {
        if K::ALL.is_empty() {
            return Err(ConfigError::InvalidCatalog {
                message: "catalog declares no event kinds".to_string(),
            });
        }

        let mut slots: Vec<Option<(K, Slot)>> = vec![None; K::ALL.len()];
        let (mut counters, mut maxes) = (0, 0);

        for &kind in K::ALL {
            let ordinal = kind.ordinal();
            let entry = slots
                .get_mut(ordinal)
                .ok_or_else(|| ConfigError::InvalidCatalog {
                    message: format!(
                        "{kind:?} has ordinal {ordinal}, catalog size is {}",
                        K::ALL.len()
                    ),
                })?;

            if entry.is_some() {
                return Err(ConfigError::InvalidCatalog {
                    message: format!("ordinal {ordinal} is declared twice ({kind:?})"),
                });
            }

            let slot = match kind.category() {
                EventCategory::Counter => {
                    counters += 1;
                    Slot::Counter(counters - 1)
                }
                EventCategory::MaxUpdater => {
                    maxes += 1;
                    Slot::Max(maxes - 1)
                }
            };
            *entry = Some((kind, slot));
        }

        // Every entry is filled: ALL.len() unique ordinals below ALL.len().
        let slots = slots.into_iter().flatten().collect::<Vec<_>>();

        Ok(Self {
            slots: slots.into_boxed_slice(),
            counters,
            maxes,
        })
    }

    pub(crate) fn counters(&self) -> usize {
        self.counters
    }

    pub(crate) fn maxes(&self) -> usize {
        self.maxes
    }

    pub(crate) fn slot(&self, kind: K) -> Result<Slot, RollingError> {
        match self.slots.get(kind.ordinal()) {
            Some(&(declared, slot)) if declared == kind => Ok(slot),
            _ => Err(RollingError::UndeclaredKind {
                kind: format!("{kind:?}"),
            }),
        }
    }

    pub(crate) fn counter(&self, kind: K) -> Result<usize, RollingError> {
        match self.slot(kind)? {
            Slot::Counter(index) => Ok(index),
            Slot::Max(_) => Err(Self::mismatch(kind, EventCategory::Counter)),
        }
    }

    pub(crate) fn max(&self, kind: K) -> Result<usize, RollingError> {
        match self.slot(kind)? {
            Slot::Max(index) => Ok(index),
            Slot::Counter(_) => Err(Self::mismatch(kind, EventCategory::MaxUpdater)),
        }
    }

    fn mismatch(kind: K, expected: EventCategory) -> RollingError {
        RollingError::CategoryMismatch {
            kind: format!("{kind:?}"),
            expected,
            actual: kind.category(),
        }
    }
}
