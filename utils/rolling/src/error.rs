use thiserror::Error;

use crate::event::EventCategory;

/// Errors produced by rolling counters.
///
/// Only construction can fail. Once a [`RollingNumber`](crate::RollingNumber)
/// exists, contention is resolved internally and never surfaces here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RollingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Event kind {kind} is a {actual} kind, expected {expected}")]
    CategoryMismatch {
        kind: String,
        expected: EventCategory,
        actual: EventCategory,
    },

    #[error("Event kind {kind} is not declared in its catalog")]
    UndeclaredKind { kind: String },
}

/// Construction-time configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid window: {window_ms}ms (must be > 0)")]
    InvalidWindow { window_ms: u64 },

    #[error("Window of {window_ms}ms exceeds the supported maximum of {max_ms}ms")]
    WindowTooLarge { window_ms: u64, max_ms: u64 },

    #[error("Invalid bucket count: {bucket_count} (must be > 0)")]
    InvalidBucketCount { bucket_count: usize },

    #[error("Window of {window_ms}ms does not divide evenly into {bucket_count} buckets")]
    UnevenBuckets { window_ms: u64, bucket_count: usize },

    #[error("Invalid event catalog: {message}")]
    InvalidCatalog { message: String },
}

pub type Result<T> = std::result::Result<T, RollingError>;

/// Panics with the message of a caller-misuse error.
///
/// Category mismatches on the hot path are programming errors, not
/// recoverable conditions, so they do not travel through `Result`.
#[track_caller]
pub(crate) fn misuse(err: RollingError) -> ! {
    panic!("{err}")
}
