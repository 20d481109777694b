use std::sync::atomic::{AtomicU64, Ordering};

mod bucket;
mod cumulative;

pub use bucket::Bucket;
pub(crate) use cumulative::WindowCumulative;

/// Raises `cell` to `value` if `value` is larger.
///
/// Lock-free: a failed exchange means another writer moved the maximum, and
/// the loop exits as soon as the stored value is at least `value`.
pub(crate) fn raise_max(cell: &AtomicU64, value: u64) {
    let mut current = cell.load(Ordering::Relaxed);

    while value > current {
        match cell.compare_exchange_weak(current, value, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => break,
            Err(actual) => current = actual,
        }
    }
}
