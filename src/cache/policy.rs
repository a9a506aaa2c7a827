//! Eviction Policy Module
//!
//! Common contract for the replacement policies. A policy tracks the set of
//! resident keys and their eviction order; entry values live in the store's
//! primary map. All implementations keep every operation O(1) by threading
//! doubly linked lists through an index-addressed node arena.

use std::fmt;

// == Policy Contract ==
/// Replacement-policy interface shared by LRU, LFU, and FIFO.
///
/// The store keeps the policy's key set identical to the primary map's key
/// set: every insert, removal, and eviction is mirrored on both sides.
pub trait EvictionPolicy: fmt::Debug + Send + Sync {
    /// Registers an access to an existing key (GET hit or overwrite SET).
    ///
    /// Promotes under LRU, increments frequency under LFU, noop under FIFO.
    /// Unknown keys are ignored.
    fn record_access(&mut self, key: &str);

    /// Registers a new key.
    ///
    /// If the policy is at capacity, the victim selected by the policy rule
    /// is removed first and its key returned. With capacity 0 nothing is
    /// stored and no victim is reported.
    fn insert(&mut self, key: &str) -> Option<String>;

    /// Removes a key. Returns false if the key was not tracked.
    fn remove(&mut self, key: &str) -> bool;

    /// Removes and returns the current victim, independent of capacity.
    ///
    /// Used by the store when the memory budget, rather than the key count,
    /// forces an eviction.
    fn evict(&mut self) -> Option<String>;

    /// Checks whether a key is tracked, without registering an access.
    fn contains(&self, key: &str) -> bool;

    /// Number of tracked keys.
    fn len(&self) -> usize;

    /// Returns true when no keys are tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all tracked keys.
    fn clear(&mut self);

    /// Snapshot of the tracked keys, in no particular order.
    fn keys(&self) -> Vec<String>;
}

// == Policy Selection ==
/// Which replacement policy a store runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Lru,
    Lfu,
    Fifo,
}

impl PolicyKind {
    /// Builds a fresh policy of this kind, bounded at `capacity` keys.
    pub fn create(self, capacity: usize) -> Box<dyn EvictionPolicy> {
        match self {
            PolicyKind::Lru => Box::new(crate::cache::lru::LruPolicy::new(capacity)),
            PolicyKind::Lfu => Box::new(crate::cache::lfu::LfuPolicy::new(capacity)),
            PolicyKind::Fifo => Box::new(crate::cache::fifo::FifoPolicy::new(capacity)),
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LRU" => Ok(PolicyKind::Lru),
            "LFU" => Ok(PolicyKind::Lfu),
            "FIFO" => Ok(PolicyKind::Fifo),
            other => Err(format!("Unknown eviction policy: {}", other)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Lru => "LRU",
            PolicyKind::Lfu => "LFU",
            PolicyKind::Fifo => "FIFO",
        };
        f.write_str(name)
    }
}

// == Arena Plumbing ==
/// Index into a policy's node arena.
pub(crate) type NodeIndex = usize;

/// Sentinel for null links.
pub(crate) const NULL_INDEX: NodeIndex = usize::MAX;
