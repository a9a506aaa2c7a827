//! LRU Policy Module
//!
//! Least Recently Used replacement. Keys live in an arena-backed doubly
//! linked list ordered from most recently used (head) to least recently used
//! (tail), with a HashMap from key to arena slot. Evicted slots are recycled
//! through a free list, so steady-state operation does not allocate nodes.

use std::collections::HashMap;

use crate::cache::policy::{EvictionPolicy, NodeIndex, NULL_INDEX};

// == List Node ==
#[derive(Debug)]
struct Node {
    key: String,
    prev: NodeIndex,
    next: NodeIndex,
}

// == LRU Policy ==
/// Tracks access recency for LRU eviction.
#[derive(Debug)]
pub struct LruPolicy {
    /// Node arena; slots are recycled via `free_list`
    arena: Vec<Node>,
    /// Indices of recycled slots
    free_list: Vec<NodeIndex>,
    /// Key to arena slot
    index: HashMap<String, NodeIndex>,
    /// Most recently used
    head: NodeIndex,
    /// Least recently used (eviction victim)
    tail: NodeIndex,
    /// Maximum number of tracked keys
    capacity: usize,
}

impl LruPolicy {
    // == Constructor ==
    /// Creates an LRU policy bounded at `capacity` keys.
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

    /// Unlinks a node from the list without touching the index.
    fn detach(&mut self, idx: NodeIndex) {
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
        self.arena[idx].prev = NULL_INDEX;
        self.arena[idx].next = NULL_INDEX;
    }

    /// Links a detached node in at the MRU end.
    fn push_head(&mut self, idx: NodeIndex) {
        self.arena[idx].prev = NULL_INDEX;
        self.arena[idx].next = self.head;
        if self.head != NULL_INDEX {
            self.arena[self.head].prev = idx;
        } else {
            self.tail = idx;
        }
        self.head = idx;
    }

    /// Removes a node from list, index, and arena; returns its key.
    fn remove_node(&mut self, idx: NodeIndex) -> String {
        self.detach(idx);
        let key = std::mem::take(&mut self.arena[idx].key);
        self.index.remove(&key);
        self.free_list.push(idx);
        key
    }
}

impl EvictionPolicy for LruPolicy {
    fn record_access(&mut self, key: &str) {
        if let Some(&idx) = self.index.get(key) {
            self.detach(idx);
            self.push_head(idx);
        }
    }

    fn insert(&mut self, key: &str) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }
        if let Some(&idx) = self.index.get(key) {
            // Already tracked: treat as an access.
            self.detach(idx);
            self.push_head(idx);
            return None;
        }

        let victim = if self.index.len() >= self.capacity {
            let tail = self.tail;
            Some(self.remove_node(tail))
        } else {
            None
        };

        let idx = self.alloc_node(key.to_string());
        self.index.insert(key.to_string(), idx);
        self.push_head(idx);
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
        if self.tail == NULL_INDEX {
            return None;
        }
        let tail = self.tail;
        Some(self.remove_node(tail))
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
