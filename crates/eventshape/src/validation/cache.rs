//! Fixed-capacity verdict cache.

use std::collections::HashMap;

const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node {
    key: String,
    verdict: bool,
    prev: usize,
    next: usize,
}

/// Least-recently-used cache of validator verdicts keyed by value text.
///
/// Nodes live in a slab linked in recency order: `head` is the most recently
/// used, `tail` the first to be evicted. Lookups and updates are O(1) and a
/// hit never allocates.
#[derive(Debug)]
pub struct VerdictCache {
    index: HashMap<String, usize>,
    nodes: Vec<Node>,
    head: usize,
    tail: usize,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl VerdictCache {
    /// Creates a cache holding at most `capacity` verdicts (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            index: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Gets a verdict and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<bool> {
        match self.index.get(key).copied() {
            Some(slot) => {
                self.touch(slot);
                self.hits += 1;
                Some(self.nodes[slot].verdict)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Stores a verdict, evicting the least recently used entry when full.
    pub fn insert(&mut self, key: String, verdict: bool) {
        if let Some(&slot) = self.index.get(&key) {
            self.nodes[slot].verdict = verdict;
            self.touch(slot);
            return;
        }

        let slot = if self.nodes.len() < self.capacity {
            self.nodes.push(Node {
                key: key.clone(),
                verdict,
                prev: NIL,
                next: NIL,
            });
            self.nodes.len() - 1
        } else {
            let slot = self.tail;
            self.unlink(slot);
            let evicted = std::mem::replace(&mut self.nodes[slot].key, key.clone());
            self.index.remove(&evicted);
            self.nodes[slot].verdict = verdict;
            slot
        };

        self.index.insert(key, slot);
        self.push_front(slot);
    }

    /// Returns the cached verdict or computes and stores it.
    pub fn get_or_insert_with(&mut self, key: &str, compute: impl FnOnce() -> bool) -> bool {
        if let Some(verdict) = self.get(key) {
            return verdict;
        }
        let verdict = compute();
        self.insert(key.to_string(), verdict);
        verdict
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hit and miss counts since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    fn touch(&mut self, slot: usize) {
        if self.head != slot {
            self.unlink(slot);
            self.push_front(slot);
        }
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }
    }

    fn push_front(&mut self, slot: usize) {
        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = self.head;
        if self.head == NIL {
            self.tail = slot;
        } else {
            self.nodes[self.head].prev = slot;
        }
        self.head = slot;
    }
}
