use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shape of a rolling window: how long it spans and how many buckets it is
/// sliced into.
///
/// ```rust
/// use loka_rolling::RollingConfig;
///
/// let config = RollingConfig::new(10_000, 10);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.bucket_size_ms(), 1_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingConfig {
    /// Total width of the window in milliseconds (default 10 seconds)
    pub window_ms: u64,
    /// Number of buckets the window is split into (default 10)
    pub bucket_count: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window_ms: 10_000,
            bucket_count: 10,
        }
    }
}

impl RollingConfig {
    pub fn new(window_ms: u64, bucket_count: usize) -> Self {
        Self {
            window_ms,
            bucket_count,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_ms == 0 {
            return Err(ConfigError::InvalidWindow {
                window_ms: self.window_ms,
            });
        }

        // Timestamps are signed milliseconds
        if self.window_ms > i64::MAX as u64 {
            return Err(ConfigError::WindowTooLarge {
                window_ms: self.window_ms,
                max_ms: i64::MAX as u64,
            });
        }

        if self.bucket_count == 0 {
            return Err(ConfigError::InvalidBucketCount {
                bucket_count: self.bucket_count,
            });
        }

        if self.window_ms % self.bucket_count as u64 != 0 {
            return Err(ConfigError::UnevenBuckets {
                window_ms: self.window_ms,
                bucket_count: self.bucket_count,
            });
        }

        Ok(())
    }

    /// Width of a single bucket. Only meaningful once [`validate`](Self::validate) passed.
    pub fn bucket_size_ms(&self) -> u64 {
        self.window_ms / self.bucket_count.max(1) as u64
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}
