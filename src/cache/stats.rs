//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, evictions, expirations,
//! and a rolling operations-per-second figure over a fixed 10-second window.

use std::collections::VecDeque;

/// Width of the rolling throughput window in milliseconds.
pub const ROLLING_WINDOW_MS: u64 = 10_000;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed by the replacement policy
    pub evictions: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
    /// Timestamps of recent accesses, bounded to the rolling window
    op_timestamps: VecDeque<u64>,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter and stamps the access.
    pub fn record_hit(&mut self, now_ms: u64) {
        self.hits += 1;
        self.record_op(now_ms);
    }

    // == Record Miss ==
    /// Increments the miss counter and stamps the access.
    pub fn record_miss(&mut self, now_ms: u64) {
        self.misses += 1;
        self.record_op(now_ms);
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expirations ==
    /// Adds `count` TTL removals to the expiration counter.
    pub fn record_expirations(&mut self, count: u64) {
        self.expirations += count;
    }

    // == Hit Rate ==
    /// Cache hit rate as a percentage, rounded to two decimal places.
    ///
    /// Returns 0 when there have been no accesses.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            let pct = self.hits as f64 / total as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        }
    }

    // == Ops Per Second ==
    /// Accesses per second over the rolling window, rounded to the nearest
    /// integer.
    pub fn ops_per_second(&mut self, now_ms: u64) -> u64 {
        self.prune(now_ms);
        let window_secs = (ROLLING_WINDOW_MS / 1_000) as f64;
        (self.op_timestamps.len() as f64 / window_secs).round() as u64
    }

    // == Reset ==
    /// Zeros every counter and empties the throughput buffer.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        self.expirations = 0;
        self.op_timestamps.clear();
    }

    // == Internal ==
    fn record_op(&mut self, now_ms: u64) {
        self.prune(now_ms);
        self.op_timestamps.push_back(now_ms);
    }

    fn prune(&mut self, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(ROLLING_WINDOW_MS);
        while self
            .op_timestamps
            .front()
            .is_some_and(|&stamp| stamp < cutoff)
        {
            self.op_timestamps.pop_front();
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit(0);
        stats.record_hit(1);
        assert_eq!(stats.hit_rate(), 100.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit(0);
        stats.record_miss(1);
        assert_eq!(stats.hit_rate(), 50.0);
    }

    #[test]
    fn test_hit_rate_rounds_to_two_decimals() {
        let mut stats = CacheStats::new();
        stats.record_hit(0);
        stats.record_miss(1);
        stats.record_miss(2);
        // 1/3 = 33.333...% rounds to 33.33
        assert_eq!(stats.hit_rate(), 33.33);
    }

    #[test]
    fn test_record_eviction() {
        let mut stats = CacheStats::new();
        stats.record_eviction();
        stats.record_eviction();
        assert_eq!(stats.evictions, 2);
    }

    #[test]
    fn test_record_expirations() {
        let mut stats = CacheStats::new();
        stats.record_expirations(3);
        stats.record_expirations(1);
        assert_eq!(stats.expirations, 4);
    }

    #[test]
    fn test_ops_per_second_counts_window() {
        let mut stats = CacheStats::new();
        for i in 0..50 {
            stats.record_hit(1_000 + i);
        }
        // 50 ops inside the window: 50 / 10 = 5 ops/sec.
        assert_eq!(stats.ops_per_second(2_000), 5);
    }

    #[test]
    fn test_ops_per_second_rounds() {
        let mut stats = CacheStats::new();
        for i in 0..17 {
            stats.record_miss(i);
        }
        // 17 / 10 = 1.7 rounds to 2.
        assert_eq!(stats.ops_per_second(100), 2);
    }

    #[test]
    fn test_ops_per_second_drops_stale_entries() {
        let mut stats = CacheStats::new();
        stats.record_hit(1_000);
        stats.record_hit(2_000);
        stats.record_hit(14_000);

        // At t=14s only the t=14s stamp is younger than the 10s cutoff...
        assert_eq!(stats.ops_per_second(14_000), 0);
        // ...and counters are unaffected by pruning.
        assert_eq!(stats.hits, 3);
    }

    #[test]
    fn test_reset_zeros_everything() {
        let mut stats = CacheStats::new();
        stats.record_hit(0);
        stats.record_miss(1);
        stats.record_eviction();
        stats.record_expirations(2);

        stats.reset();

        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.ops_per_second(10), 0);
    }
}
