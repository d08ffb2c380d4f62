//! Global configuration for ordwin runtime behavior.
//!
//! Settings here are read on the query path, so they are plain atomics set
//! once at startup.

use std::sync::atomic::{AtomicBool, Ordering};

/// Default window allowance in bases.
///
/// A buffered variant whose end lies more than this many bases behind the
/// newest arrival on the same contig is flushed.
pub const DEFAULT_WINDOW_ALLOWANCE: u64 = 5000;

/// Whether region queries that move backwards on a chromosome are rejected.
///
/// The region matcher only buffers what lies ahead of the previous query, so
/// a smaller `start1` can silently miss regions that were already evicted.
static STRICT_QUERY_ORDER: AtomicBool = AtomicBool::new(true);

/// Enable or disable rejection of non-monotonic region queries.
///
/// # Example
///
/// ```
/// use ordwin::config;
///
/// // Tolerate queries that step backwards (results may miss regions)
/// config::set_strict_query_order(false);
/// assert!(!config::is_strict_query_order());
/// config::set_strict_query_order(true);
/// ```
#[inline]
pub fn set_strict_query_order(enabled: bool) {
    STRICT_QUERY_ORDER.store(enabled, Ordering::Release);
}

/// Check if non-monotonic region queries are rejected.
#[inline]
pub fn is_strict_query_order() -> bool {
    STRICT_QUERY_ORDER.load(Ordering::Acquire)
}
