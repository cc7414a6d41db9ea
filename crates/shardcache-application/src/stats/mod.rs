//! Operational stats window
//!
//! Counters are plain atomics updated with fetch-add from any task, so
//! recording never blocks and never fails the data operation it measures.
//!
//! ## Snapshot protocol
//!
//! [`StatsAggregator::snapshot`] reads every counter, derives the report,
//! then subtracts exactly what it read and advances the window start by the
//! elapsed time. Increments that land between the read and the subtract
//! survive into the next window instead of being zeroed away.
//!
//! The read and the subtract are not one atomic step across all five
//! counters. A writer racing a snapshot can have its hit counted in one
//! window and its latency in the next, so a single window may be skewed by
//! the operations in flight while the snapshot ran. Totals across windows
//! stay exact. Making the snapshot strictly atomic would need a lock on the
//! write path.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use shardcache_domain::constants::{MILLIS_PER_SEC, NANOS_PER_MILLI};
use shardcache_domain::value_objects::{StatsCounters, StatsReport};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

/// Rolling window of cache operation counters
pub struct StatsAggregator {
    hits: AtomicU64,
    misses: AtomicU64,
    requests: AtomicI64,
    latency_nanos: AtomicI64,
    window_start_nanos: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl StatsAggregator {
    /// Create a window starting now on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a window starting now on the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let start = clock.now_nanos();
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            requests: AtomicI64::new(0),
            latency_nanos: AtomicI64::new(0),
            window_start_nanos: AtomicI64::new(start),
            clock,
        }
    }

    /// Record one get; `found` decides hit or miss
    pub fn record_get(&self, found: bool, elapsed: Duration) {
        if found {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        self.record_requests(1, elapsed);
    }

    /// Record one operation that does not affect hit/miss counts
    pub fn record_request(&self, elapsed: Duration) {
        self.record_requests(1, elapsed);
    }

    /// Record a pipelined get covering `hits + misses` keys in one round trip
    pub fn record_batch_get(&self, hits: u64, misses: u64, elapsed: Duration) {
        self.hits.fetch_add(hits, Ordering::Relaxed);
        self.misses.fetch_add(misses, Ordering::Relaxed);
        let keys = i64::try_from(hits.saturating_add(misses)).unwrap_or(i64::MAX);
        self.record_requests(keys, elapsed);
    }

    /// Record `count` operations sharing one round trip of `elapsed`
    pub fn record_requests(&self, count: i64, elapsed: Duration) {
        let nanos = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);
        self.latency_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.requests.fetch_add(count, Ordering::Relaxed);
    }

    /// Current counter values without closing the window
    pub fn counters(&self) -> StatsCounters {
        StatsCounters {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            requests: self.requests.load(Ordering::Relaxed),
            latency_nanos: self.latency_nanos.load(Ordering::Relaxed),
            window_start_nanos: self.window_start_nanos.load(Ordering::Relaxed),
        }
    }

    /// Close the current window and report on it
    ///
    /// An idle window (no gets) or one shorter than a millisecond yields a
    /// report with zeroed metrics and is left open.
    pub fn snapshot(&self) -> StatsReport {
        let read = self.counters();
        let now = self.clock.now_nanos();
        let elapsed_millis = now.saturating_sub(read.window_start_nanos) / NANOS_PER_MILLI;

        if (read.hits == 0 && read.misses == 0) || elapsed_millis <= 0 {
            return StatsReport::empty(read.window_start_nanos, now);
        }

        let report = derive_report(&read, now, elapsed_millis);

        self.hits.fetch_sub(read.hits, Ordering::Relaxed);
        self.misses.fetch_sub(read.misses, Ordering::Relaxed);
        self.requests.fetch_sub(read.requests, Ordering::Relaxed);
        self.latency_nanos
            .fetch_sub(read.latency_nanos, Ordering::Relaxed);
        self.window_start_nanos
            .fetch_add(now - read.window_start_nanos, Ordering::Relaxed);

        report
    }
}

/// Metrics for a non-idle window of `elapsed_millis` > 0
///
/// Every division truncates, so the same counters always give the same
/// report.
fn derive_report(read: &StatsCounters, now: i64, elapsed_millis: i64) -> StatsReport {
    let lookups = u128::from(read.hits) + u128::from(read.misses);
    let hit_ratio = u128::from(read.hits) * 100 / lookups;

    let queries_per_second =
        i128::from(read.requests) * i128::from(MILLIS_PER_SEC) / i128::from(elapsed_millis);

    let mean_latency_millis = if read.requests > 0 {
        read.latency_nanos / read.requests / NANOS_PER_MILLI
    } else {
        0
    };

    StatsReport {
        start_time: read.window_start_nanos,
        end_time: now,
        hit_ratio: hit_ratio as f64,
        mean_latency_millis: mean_latency_millis as f64,
        queries_per_second: i64::try_from(queries_per_second).unwrap_or(i64::MAX),
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsAggregator")
            .field("counters", &self.counters())
            .field("clock", &self.clock)
            .finish()
    }
}
