//! FIFO Policy Module
//!
//! First-In First-Out replacement. Keys live in an arena-backed doubly linked
//! list ordered from oldest inserted (head, the victim end) to newest (tail).
//! Accesses and value overwrites never reorder the queue; only insertion
//! position matters.

use std::collections::HashMap;

use crate::cache::policy::{EvictionPolicy, NodeIndex, NULL_INDEX};

// == List Node ==
#[derive(Debug)]
struct Node {
    key: String,
    prev: NodeIndex,
    next: NodeIndex,
}

// == FIFO Policy ==
/// Tracks insertion order for FIFO eviction.
#[derive(Debug)]
pub struct FifoPolicy {
    /// Node arena; slots are recycled via `free_list`
    arena: Vec<Node>,
    /// Indices of recycled slots
    free_list: Vec<NodeIndex>,
    /// Key to arena slot
    index: HashMap<String, NodeIndex>,
    /// Oldest inserted (eviction victim)
    head: NodeIndex,
    /// Newest inserted
    tail: NodeIndex,
    /// Maximum number of tracked keys
    capacity: usize,
}

impl FifoPolicy {
    // == Constructor ==
    /// Creates a FIFO policy bounded at `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: Vec::with_capacity(capacity.min(1024)),
            free_list: Vec::new(),
            index: HashMap::with_capacity(capacity.min(1024)),
            head: NULL_INDEX,
            tail: NULL_INDEX,
            capacity,
        }
    }

    // == Node Management ==
    fn alloc_node(&mut self, key: String) -> NodeIndex {
        let node = Node {
            key,
            prev: NULL_INDEX,
            next: NULL_INDEX,
        };
        if let Some(idx) = self.free_list.pop() {
            self.arena[idx] = node;
            idx
        } else {
            self.arena.push(node);
            self.arena.len() - 1
        }
    }

    /// Links a detached node in at the newest end.
    fn push_tail(&mut self, idx: NodeIndex) {
        self.arena[idx].prev = self.tail;
        self.arena[idx].next = NULL_INDEX;
        if self.tail != NULL_INDEX {
            self.arena[self.tail].next = idx;
        } else {
            self.head = idx;
        }
        self.tail = idx;
    }

    /// Removes a node from list, index, and arena; returns its key.
    fn remove_node(&mut self, idx: NodeIndex) -> String {
        let (prev, next) = (self.arena[idx].prev, self.arena[idx].next);
        if prev != NULL_INDEX {
            self.arena[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NULL_INDEX {
            self.arena[next].prev = prev;
        } else {
            self.tail = prev;
        }

        let key = std::mem::take(&mut self.arena[idx].key);
        self.index.remove(&key);
        self.free_list.push(idx);
        key
    }
}

impl EvictionPolicy for FifoPolicy {
    /// Accesses never reorder a FIFO queue.
    fn record_access(&mut self, _key: &str) {}

    fn insert(&mut self, key: &str) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }
        if self.index.contains_key(key) {
            // Overwrites keep the original queue position.
            return None;
        }

        let victim = if self.index.len() >= self.capacity {
            let head = self.head;
            Some(self.remove_node(head))
        } else {
            None
        };

        let idx = self.alloc_node(key.to_string());
        self.index.insert(key.to_string(), idx);
        self.push_tail(idx);
        victim
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.index.get(key) {
            Some(&idx) => {
                self.remove_node(idx);
                true
            }
            None => false,
        }
    }

    fn evict(&mut self) -> Option<String> {
        if self.head == NULL_INDEX {
            return None;
        }
        let head = self.head;
        Some(self.remove_node(head))
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn clear(&mut self) {
        self.arena.clear();
        self.free_list.clear();
        self.index.clear();
        self.head = NULL_INDEX;
        self.tail = NULL_INDEX;
    }

    fn keys(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_new() {
        let fifo = FifoPolicy::new(3);
        assert!(fifo.is_empty());
        assert_eq!(fifo.len(), 0);
    }

    #[test]
    fn test_fifo_evicts_oldest_inserted() {
        let mut fifo = FifoPolicy::new(3);

        fifo.insert("a");
        fifo.insert("b");
        fifo.insert("c");

        assert_eq!(fifo.insert("d"), Some("a".to_string()));
        assert_eq!(fifo.len(), 3);
        assert!(!fifo.contains("a"));
    }

    #[test]
    fn test_fifo_ignores_accesses() {
        let mut fifo = FifoPolicy::new(3);

        fifo.insert("a");
        fifo.insert("b");
        fifo.insert("c");
        fifo.record_access("a");
        fifo.record_access("a");

        // a is still the oldest despite the accesses.
        assert_eq!(fifo.insert("d"), Some("a".to_string()));
    }

    #[test]
    fn test_fifo_overwrite_keeps_position() {
        let mut fifo = FifoPolicy::new(3);

        fifo.insert("a");
        fifo.insert("b");
        fifo.insert("c");

        // Re-inserting a does not move it to the back of the queue.
        assert_eq!(fifo.insert("a"), None);
        assert_eq!(fifo.insert("d"), Some("a".to_string()));
    }

    #[test]
    fn test_fifo_evict_follows_insertion_order() {
        let mut fifo = FifoPolicy::new(3);

        fifo.insert("a");
        fifo.insert("b");
        fifo.insert("c");

        assert_eq!(fifo.evict(), Some("a".to_string()));
        assert_eq!(fifo.evict(), Some("b".to_string()));
        assert_eq!(fifo.evict(), Some("c".to_string()));
        assert_eq!(fifo.evict(), None);
    }

    #[test]
    fn test_fifo_remove_middle() {
        let mut fifo = FifoPolicy::new(3);

        fifo.insert("a");
        fifo.insert("b");
        fifo.insert("c");

        assert!(fifo.remove("b"));
        assert_eq!(fifo.evict(), Some("a".to_string()));
        assert_eq!(fifo.evict(), Some("c".to_string()));
    }

    #[test]
    fn test_fifo_remove_nonexistent() {
        let mut fifo = FifoPolicy::new(3);
        assert!(!fifo.remove("ghost"));
    }

    #[test]
    fn test_fifo_zero_capacity_rejects() {
        let mut fifo = FifoPolicy::new(0);

        assert_eq!(fifo.insert("a"), None);
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_fifo_clear() {
        let mut fifo = FifoPolicy::new(3);

        fifo.insert("a");
        fifo.insert("b");
        fifo.clear();

        assert!(fifo.is_empty());
        assert_eq!(fifo.evict(), None);

        fifo.insert("c");
        assert_eq!(fifo.evict(), Some("c".to_string()));
    }

    #[test]
    fn test_fifo_slot_recycling() {
        let mut fifo = FifoPolicy::new(2);

        fifo.insert("a");
        fifo.insert("b");
        fifo.insert("c");
        fifo.insert("d");

        assert_eq!(fifo.len(), 2);
        assert!(fifo.arena.len() <= 2);
    }
}
