//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with a pluggable replacement
//! policy, approximate memory accounting, and TTL expiration. The store and
//! its policy always track the same key set; every insert, removal, eviction,
//! and expiration is mirrored on both sides.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Number, Value};

use crate::cache::{
    sizer, CacheEntry, CacheStats, Clock, EvictionPolicy, PolicyKind, SystemClock,
};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with policy-driven eviction, byte budget, and TTL.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Replacement policy tracking eviction order over the resident keys
    policy: Box<dyn EvictionPolicy>,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of the size fields of all resident entries
    current_bytes: usize,
    /// Hard memory bound
    max_bytes: usize,
    /// Soft ceiling (90% of max_bytes); SET evicts down to this before inserting
    threshold_bytes: usize,
    /// Maximum number of resident keys; 0 disables the cache entirely
    max_keys: usize,
    /// Which policy this store was built with
    policy_kind: PolicyKind,
    /// Time source for TTL decisions
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    // == Constructors ==
    /// Creates a new CacheStore on the system clock.
    ///
    /// # Arguments
    /// * `policy_kind` - Replacement policy to run with
    /// * `max_keys` - Key-count bound (0 = cache disabled)
    /// * `max_memory_mb` - Memory bound in megabytes
    pub fn new(policy_kind: PolicyKind, max_keys: usize, max_memory_mb: usize) -> Self {
        Self::with_clock(policy_kind, max_keys, max_memory_mb, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore reading time from the given clock.
    pub fn with_clock(
        policy_kind: PolicyKind,
        max_keys: usize,
        max_memory_mb: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let max_bytes = max_memory_mb.saturating_mul(crate::config::BYTES_PER_MB);
        Self {
            entries: HashMap::new(),
            policy: policy_kind.create(max_keys),
            stats: CacheStats::new(),
            current_bytes: 0,
            max_bytes,
            threshold_bytes: max_bytes.saturating_mul(9) / 10,
            max_keys,
            policy_kind,
            clock,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit promotes the key in the replacement policy. An entry found past
    /// its expiry is removed on the spot and reported as a miss, so callers
    /// never observe an expired value.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();
        match self.entries.get(key) {
            None => {
                self.stats.record_miss(now);
                None
            }
            Some(entry) => {
                if entry.is_expired(now) {
                    self.remove_expired(key);
                    self.stats.record_miss(now);
                    None
                } else {
                    let value = entry.value.clone();
                    self.policy.record_access(key);
                    self.stats.record_hit(now);
                    Some(value)
                }
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL in milliseconds.
    ///
    /// Existing keys are overwritten in place; a SET without a TTL makes the
    /// entry eternal even if it previously had one. When the incoming entry
    /// would push the byte budget past the soft ceiling, victims are evicted
    /// first. An entry too large to ever fit under the ceiling is dropped
    /// rather than stored, keeping the hard bound intact.
    pub fn set(&mut self, key: &str, value: Value, ttl_ms: Option<u64>) {
        if self.max_keys == 0 {
            // Cache disabled: accept and discard.
            return;
        }

        let now = self.clock.now_ms();
        let entry_size = sizer::estimate_entry_bytes(key, &value);

        // Evict down to the soft ceiling before inserting.
        while self.current_bytes + entry_size > self.threshold_bytes {
            match self.policy.evict() {
                Some(victim) => {
                    if let Some(old) = self.entries.remove(&victim) {
                        self.current_bytes -= old.size;
                    }
                    self.stats.record_eviction();
                }
                None => break,
            }
        }
        if entry_size > self.threshold_bytes {
            return;
        }

        let expires_at = ttl_ms.map(|ttl| now + ttl);
        match self.entries.get_mut(key) {
            Some(existing) => {
                self.current_bytes -= existing.size;
                existing.value = value;
                existing.expires_at = expires_at;
                existing.size = entry_size;
                self.current_bytes += entry_size;
                self.policy.record_access(key);
            }
            None => {
                self.entries
                    .insert(key.to_string(), CacheEntry::new(value, expires_at, entry_size));
                self.current_bytes += entry_size;
                // The policy enforces the key-count bound and names the victim.
                if let Some(victim) = self.policy.insert(key) {
                    if let Some(old) = self.entries.remove(&victim) {
                        self.current_bytes -= old.size;
                    }
                    self.stats.record_eviction();
                }
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns false if the key was absent.
    ///
    /// Operator-initiated, so it does not count toward evictions.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.current_bytes -= entry.size;
                self.policy.remove(key);
                true
            }
            None => false,
        }
    }

    // == Exists ==
    /// Checks whether a live entry exists for the key.
    ///
    /// Honors lazy expiration (an expired entry is removed and reported
    /// absent) but does not touch the hit/miss counters or the policy order.
    pub fn exists(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            self.remove_expired(key);
            return false;
        }
        true
    }

    // == Increment ==
    /// Adds `amount` to the numeric value at `key`, creating it from zero.
    ///
    /// Goes through the public GET and SET, so the read counts as a hit or
    /// miss and the write clears any TTL, exactly like a hand-rolled
    /// read-modify-write. Fails without touching state when the stored value
    /// is not a number.
    pub fn increment(&mut self, key: &str, amount: &Number) -> Result<Number> {
        match self.get(key) {
            None => {
                self.set(key, Value::Number(amount.clone()), None);
                Ok(amount.clone())
            }
            Some(Value::Number(current)) => {
                let next = add_numbers(&current, amount)
                    .ok_or_else(|| CacheError::NonNumeric(key.to_string()))?;
                self.set(key, Value::Number(next.clone()), None);
                Ok(next)
            }
            Some(_) => Err(CacheError::NonNumeric(key.to_string())),
        }
    }

    // == Update TTL ==
    /// Rewrites the expiry of an existing entry to `now + ttl_ms`.
    ///
    /// The key keeps its replacement-policy position. Returns false when the
    /// key is absent or already expired (the latter is removed and counted).
    pub fn update_ttl(&mut self, key: &str, ttl_ms: u64) -> bool {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            self.remove_expired(key);
            return false;
        }
        if let Some(entry) = self.entries.get_mut(key) {
            entry.expires_at = Some(now + ttl_ms);
        }
        true
    }

    // == Keys ==
    /// Snapshot of resident keys: the slice `[offset, offset + limit)` plus
    /// the total count. Order is stable within a single call only.
    pub fn keys(&self, limit: usize, offset: usize) -> (Vec<String>, usize) {
        let total = self.entries.len();
        let keys = self
            .entries
            .keys()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        (keys, total)
    }

    // == Clear ==
    /// Drops all entries and the policy state. Statistics are not reset.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.policy.clear();
        self.current_bytes = 0;
    }

    // == Cleanup Expired ==
    /// Removes all expired entries in one pass.
    ///
    /// Returns the number of entries removed; each counts as one expiration.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            if let Some(entry) = self.entries.remove(&key) {
                self.current_bytes -= entry.size;
            }
            self.policy.remove(&key);
        }

        self.stats.record_expirations(count as u64);
        count
    }

    // == Stats ==
    /// Read access to the statistics counters.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Zeros the statistics counters without touching entries.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Accesses per second over the rolling window.
    pub fn ops_per_second(&mut self) -> u64 {
        let now = self.clock.now_ms();
        self.stats.ops_per_second(now)
    }

    // == Accessors ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approximate bytes currently resident.
    pub fn current_bytes(&self) -> usize {
        self.current_bytes
    }

    /// Hard memory bound in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Key-count bound.
    pub fn max_keys(&self) -> usize {
        self.max_keys
    }

    /// Which replacement policy this store runs.
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy_kind
    }

    /// Memory usage as a percentage of the bound, rounded to two decimals.
    pub fn memory_usage_percent(&self) -> f64 {
        if self.max_bytes == 0 {
            return 0.0;
        }
        let pct = self.current_bytes as f64 / self.max_bytes as f64 * 100.0;
        (pct * 100.0).round() / 100.0
    }

    /// Number of keys the policy currently tracks. Diagnostics hook for the
    /// store/policy key-set invariant.
    #[cfg(test)]
    pub fn policy_len(&self) -> usize {
        self.policy.len()
    }

    // == Internal ==
    /// Removes an entry that was found past its expiry.
    fn remove_expired(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.current_bytes -= entry.size;
            self.policy.remove(key);
            self.stats.record_expirations(1);
        }
    }
}

// == Numeric Addition ==
/// Adds two JSON numbers, staying in integer arithmetic when both sides are
/// integral and falling back to f64 otherwise. Returns None when the result
/// is not representable (non-finite float).
fn add_numbers(current: &Number, amount: &Number) -> Option<Number> {
    if let (Some(a), Some(b)) = (current.as_i64(), amount.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Some(Number::from(sum));
        }
    }
    let sum = current.as_f64()? + amount.as_f64()?;
    Number::from_f64(sum)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use serde_json::json;

    fn lru_store(max_keys: usize) -> CacheStore {
        CacheStore::new(PolicyKind::Lru, max_keys, 64)
    }

    #[test]
    fn test_store_new() {
        let store = lru_store(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.current_bytes(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = lru_store(100);

        store.set("key1", json!("value1"), None);
        let value = store.get("key1");

        assert_eq!(value, Some(json!("value1")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = lru_store(100);

        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = lru_store(100);

        store.set("key1", json!("value1"), None);
        store.set("key1", json!({"new": true}), None);

        assert_eq!(store.get("key1"), Some(json!({"new": true})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_overwrite_adjusts_bytes() {
        let mut store = lru_store(100);

        store.set("k", json!("aaaaaaaaaa"), None);
        let first = store.current_bytes();
        store.set("k", json!("a"), None);

        assert_eq!(store.current_bytes(), first - 9);
    }

    #[test]
    fn test_store_delete() {
        let mut store = lru_store(100);

        store.set("key1", json!(1), None);
        assert!(store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.current_bytes(), 0);
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_store_delete_is_idempotent() {
        let mut store = lru_store(100);

        store.set("key1", json!(1), None);
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_exists_does_not_touch_counters() {
        let mut store = lru_store(100);

        store.set("key1", json!(1), None);
        assert!(store.exists("key1"));
        assert!(!store.exists("ghost"));

        assert_eq!(store.stats().hits, 0);
        assert_eq!(store.stats().misses, 0);
    }

    #[test]
    fn test_store_exists_does_not_promote() {
        let mut store = lru_store(3);

        store.set("a", json!(1), None);
        store.set("b", json!(2), None);
        store.set("c", json!(3), None);

        // EXISTS on a must not rescue it from eviction.
        assert!(store.exists("a"));
        store.set("d", json!(4), None);

        assert_eq!(store.get("a"), None);
    }

    // == Eviction Scenarios ==

    #[test]
    fn test_lru_eviction_ordering() {
        let mut store = lru_store(3);

        store.set("a", json!(1), None);
        store.set("b", json!(2), None);
        store.set("c", json!(3), None);
        store.get("a");
        store.set("d", json!(4), None);

        assert_eq!(store.len(), 3);
        assert!(store.exists("a"));
        assert!(!store.exists("b"));
        assert!(store.exists("c"));
        assert!(store.exists("d"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_lfu_eviction_with_tie_break() {
        let mut store = CacheStore::new(PolicyKind::Lfu, 3, 64);

        store.set("a", json!(1), None);
        store.set("b", json!(2), None);
        store.set("c", json!(3), None);
        store.get("a");
        store.get("a");
        store.get("b");
        store.set("d", json!(4), None);

        // c stayed at frequency 1 and is the victim.
        assert!(store.exists("a"));
        assert!(store.exists("b"));
        assert!(!store.exists("c"));
        assert!(store.exists("d"));
    }

    #[test]
    fn test_fifo_eviction_ignores_access() {
        let mut store = CacheStore::new(PolicyKind::Fifo, 3, 64);

        store.set("a", json!(1), None);
        store.set("b", json!(2), None);
        store.set("c", json!(3), None);
        store.get("a");
        store.get("a");
        store.set("d", json!(4), None);

        // a is the oldest insert and goes first despite its accesses.
        assert!(!store.exists("a"));
        assert!(store.exists("b"));
        assert!(store.exists("c"));
        assert!(store.exists("d"));
    }

    #[test]
    fn test_memory_bound_eviction() {
        let mut store = CacheStore::new(PolicyKind::Lru, 10_000, 1);
        let big = "x".repeat(25_000);

        for i in 0..50 {
            store.set(&format!("key{}", i), json!(big.clone()), None);
        }

        assert!(store.current_bytes() <= store.max_bytes());
        assert!(store.stats().evictions > 0);
        assert!(store.len() < 50);
        assert_eq!(store.len(), store.policy_len());
    }

    #[test]
    fn test_oversized_entry_is_not_stored() {
        let mut store = CacheStore::new(PolicyKind::Lru, 100, 1);

        store.set("small", json!(1), None);
        // 2 MB value against a 1 MB budget: everything is evicted to make
        // room, then the entry is dropped because it can never fit.
        store.set("huge", json!("x".repeat(2 * 1_048_576)), None);

        assert!(!store.exists("huge"));
        assert_eq!(store.current_bytes(), 0);
        assert!(store.current_bytes() <= store.max_bytes());
    }

    // == TTL Scenarios ==

    #[test]
    fn test_ttl_expiration_on_get() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(PolicyKind::Lru, 100, 64, clock.clone());

        store.set("k", json!("v"), Some(1_000));

        clock.advance(500);
        assert_eq!(store.get("k"), Some(json!("v")));
        assert_eq!(store.stats().hits, 1);

        clock.advance(600);
        assert_eq!(store.get("k"), None);
        assert_eq!(store.stats().misses, 1);
        assert_eq!(store.stats().expirations, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_without_ttl_clears_expiry() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(PolicyKind::Lru, 100, 64, clock.clone());

        store.set("k", json!(1), Some(1_000));
        store.set("k", json!(2), None);

        clock.advance(5_000);
        assert_eq!(store.get("k"), Some(json!(2)));
    }

    #[test]
    fn test_update_ttl_extends_lifetime() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(PolicyKind::Lru, 100, 64, clock.clone());

        store.set("k", json!(1), Some(1_000));
        clock.advance(900);
        assert!(store.update_ttl("k", 1_000));

        clock.advance(500);
        assert_eq!(store.get("k"), Some(json!(1)));
    }

    #[test]
    fn test_update_ttl_absent_and_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(PolicyKind::Lru, 100, 64, clock.clone());

        assert!(!store.update_ttl("ghost", 1_000));

        store.set("k", json!(1), Some(100));
        clock.advance(200);
        assert!(!store.update_ttl("k", 1_000));
        assert_eq!(store.stats().expirations, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_ttl_keeps_policy_position() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(PolicyKind::Lru, 3, 64, clock);

        store.set("a", json!(1), None);
        store.set("b", json!(2), None);
        store.set("c", json!(3), None);

        // Refreshing a's TTL must not promote it.
        assert!(store.update_ttl("a", 60_000));
        store.set("d", json!(4), None);

        assert!(!store.exists("a"));
    }

    #[test]
    fn test_exists_expires_lazily() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(PolicyKind::Lru, 100, 64, clock.clone());

        store.set("k", json!(1), Some(100));
        clock.advance(150);

        assert!(!store.exists("k"));
        assert_eq!(store.stats().expirations, 1);
        assert_eq!(store.stats().misses, 0);
    }

    #[test]
    fn test_cleanup_expired_drains_only_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = CacheStore::with_clock(PolicyKind::Lru, 100, 64, clock.clone());

        store.set("gone1", json!(1), Some(100));
        store.set("gone2", json!(2), Some(200));
        store.set("stays", json!(3), Some(60_000));
        store.set("eternal", json!(4), None);

        clock.advance(500);
        let removed = store.cleanup_expired();

        assert_eq!(removed, 2);
        assert_eq!(store.stats().expirations, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.len(), store.policy_len());
        assert!(store.exists("stays"));
        assert!(store.exists("eternal"));
    }

    // == Increment Scenarios ==

    #[test]
    fn test_increment_from_absent() {
        let mut store = lru_store(100);

        let one = store.increment("counter", &Number::from(1)).unwrap();
        assert_eq!(one, Number::from(1));

        let four = store.increment("counter", &Number::from(3)).unwrap();
        assert_eq!(four, Number::from(4));
        assert_eq!(store.get("counter"), Some(json!(4)));
    }

    #[test]
    fn test_increment_twice_doubles() {
        let mut store = lru_store(100);

        assert_eq!(store.increment("n", &Number::from(5)).unwrap(), Number::from(5));
        assert_eq!(store.increment("n", &Number::from(5)).unwrap(), Number::from(10));
    }

    #[test]
    fn test_increment_non_numeric_fails_without_change() {
        let mut store = lru_store(100);

        store.set("counter", json!("x"), None);
        let result = store.increment("counter", &Number::from(1));

        assert!(matches!(result, Err(CacheError::NonNumeric(_))));
        assert_eq!(store.get("counter"), Some(json!("x")));
    }

    #[test]
    fn test_increment_float_amount() {
        let mut store = lru_store(100);

        store.set("pi", json!(3.0), None);
        let next = store
            .increment("pi", &Number::from_f64(0.14).unwrap())
            .unwrap();
        assert!((next.as_f64().unwrap() - 3.14).abs() < 1e-9);
    }

    #[test]
    fn test_increment_counts_get_and_set() {
        let mut store = lru_store(100);

        store.increment("c", &Number::from(1)).unwrap(); // miss
        store.increment("c", &Number::from(1)).unwrap(); // hit

        assert_eq!(store.stats().misses, 1);
        assert_eq!(store.stats().hits, 1);
    }

    // == Disabled Cache ==

    #[test]
    fn test_zero_max_keys_disables_cache() {
        let mut store = lru_store(0);

        store.set("k", json!(1), None);

        assert!(store.is_empty());
        assert_eq!(store.current_bytes(), 0);
        assert_eq!(store.get("k"), None);
        assert_eq!(store.stats().misses, 1);
        assert_eq!(store.stats().evictions, 0);
    }

    // == Clear and Keys ==

    #[test]
    fn test_clear_keeps_statistics() {
        let mut store = lru_store(100);

        store.set("a", json!(1), None);
        store.get("a");
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.current_bytes(), 0);
        assert_eq!(store.policy_len(), 0);
        assert_eq!(store.stats().hits, 1);
    }

    #[test]
    fn test_keys_pagination() {
        let mut store = lru_store(100);

        for i in 0..10 {
            store.set(&format!("key{}", i), json!(i), None);
        }

        let (page, total) = store.keys(3, 0);
        assert_eq!(total, 10);
        assert_eq!(page.len(), 3);

        let (rest, _) = store.keys(100, 8);
        assert_eq!(rest.len(), 2);

        let (past_end, _) = store.keys(5, 50);
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_byte_accounting_matches_entry_sum() {
        let mut store = lru_store(100);

        store.set("a", json!("12345"), None);
        store.set("b", json!([1, 2, 3]), None);
        store.set("c", json!({"k": true}), None);
        store.delete("b");

        let expected = sizer::estimate_entry_bytes("a", &json!("12345"))
            + sizer::estimate_entry_bytes("c", &json!({"k": true}));
        assert_eq!(store.current_bytes(), expected);
    }
}
