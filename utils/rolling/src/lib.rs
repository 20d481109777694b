//! # Loka Rolling
//!
//! Lock-free, time-windowed event counters for latency-sensitive paths.
//!
//! ## Overview
//!
//! A [`RollingNumber`] records outcomes of guarded calls (successes, failures,
//! timeouts, rejections) and concurrency high-water marks without ever
//! blocking the calling thread. Readers get sliding-window aggregates (sums,
//! maxima, a per-bucket time series) plus lifetime totals that survive window
//! rollover and explicit resets.
//!
//! ## Features
//!
//! - **🔒 Lock-Free**: Ring changes are a single compare-and-swap over an immutable snapshot
//! - **📊 Two Accumulators**: Counter kinds are summed, max-updater kinds keep their maximum
//! - **🔄 Lazy Housekeeping**: Every call rolls the window forward, reads included
//! - **📈 Lifetime Totals**: Evicted buckets are folded into cumulative sums, never dropped
//! - **⏱️ Injectable Clock**: Deterministic tests with [`ManualClock`]
//! - **🎯 Metrics Facade**: Expose kinds as `metrics::Counter` / `metrics::Histogram`
//!
//! ## Quick Start
//!
//! ```rust
//! use loka_rolling::{RollingConfig, RollingEvent, RollingNumber};
//!
//! // 10 second window, 10 buckets of 1 second each
//! let counter = RollingNumber::<RollingEvent>::new(RollingConfig::default())
//!     .expect("Failed to create rolling counter");
//!
//! counter.increment(RollingEvent::Success);
//! counter.increment(RollingEvent::Timeout);
//! counter.update_max(RollingEvent::ThreadMaxActive, 4);
//!
//! assert_eq!(counter.rolling_sum(RollingEvent::Success), 1);
//! assert_eq!(counter.rolling_max(RollingEvent::ThreadMaxActive), 4);
//! assert_eq!(counter.cumulative_sum(RollingEvent::Timeout), 1);
//! ```
//!
//! ## Window Mechanics
//!
//! The window is sliced into `bucket_count` buckets of `window_ms / bucket_count`
//! milliseconds. Buckets are created lazily:
//!
//! - Periods with no activity show up as zero-valued buckets, never as holes
//! - Once the ring is full, the oldest bucket is evicted for each new one
//! - After a full window of silence the whole ring is folded away at once
//!
//! ```rust
//! use std::sync::Arc;
//! use loka_rolling::{ManualClock, RollingConfig, RollingEvent, RollingNumber};
//!
//! let clock = Arc::new(ManualClock::new());
//! let counter = RollingNumber::<RollingEvent, _>::with_clock(
//!     RollingConfig::new(200, 10),
//!     Arc::clone(&clock),
//! )
//! .unwrap();
//!
//! counter.update_max(RollingEvent::ThreadMaxActive, 10);
//! clock.advance(60);
//! counter.update_max(RollingEvent::ThreadMaxActive, 20);
//!
//! assert_eq!(counter.values_per_bucket(RollingEvent::ThreadMaxActive), vec![10, 0, 0, 20]);
//! ```
//!
//! ## Thread Safety
//!
//! All operations take `&self` and are safe to call from any number of threads:
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use loka_rolling::{RollingConfig, RollingEvent, RollingNumber};
//!
//! let counter = Arc::new(RollingNumber::<RollingEvent>::new(RollingConfig::default()).unwrap());
//! let mut handles = vec![];
//!
//! for _ in 0..8 {
//!     let counter = Arc::clone(&counter);
//!     handles.push(thread::spawn(move || {
//!         for _ in 0..1000 {
//!             counter.increment(RollingEvent::Success);
//!         }
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(counter.cumulative_sum(RollingEvent::Success), 8000);
//! ```
//!
//! ## Error Handling
//!
//! - **Construction**: invalid windows and malformed catalogs return [`ConfigError`]
//! - **Misuse**: passing a max-updater kind to a counter operation (or the
//!   reverse), or a kind missing from its catalog, panics; the `metrics`
//!   adapters report it as [`RollingError`] instead
//! - **Contention**: resolved internally by retrying, never surfaced

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod handle;
pub mod types;

pub(crate) mod number;
pub(crate) mod ring;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RollingConfig;
pub use error::{ConfigError, Result, RollingError};
pub use event::{EventCategory, EventKind, RollingEvent};
pub use handle::{RollingCounter, RollingMaxTracker};
pub use number::RollingNumber;
pub use types::Bucket;
