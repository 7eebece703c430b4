//! LRU (Least Recently Used) replacement policy.
//!
//! The recency order is a doubly linked list threaded through a hash map
//! keyed by block, so promotion, removal and eviction are all O(1).

use std::collections::HashMap;

use crate::common::BlockId;

/// Neighbours of a block in the recency list.
///
/// `newer` points toward the head (most recent), `older` toward the tail.
#[derive(Debug, Clone, Copy, Default)]
struct Link {
    newer: Option<BlockId>,
    older: Option<BlockId>,
}

/// A bounded recency order over resident blocks.
///
/// The head is the most recently used block and the tail the least. The
/// order is total: every access moves a block to the head, so two blocks
/// never share a recency rank.
#[derive(Debug)]
pub struct LruReplacer {
    /// Maximum number of tracked blocks.
    capacity: usize,

    /// Position of every tracked block in the list.
    links: HashMap<BlockId, Link>,

    /// Most recently used block.
    head: Option<BlockId>,

    /// Least recently used block.
    tail: Option<BlockId>,
}

impl LruReplacer {
    /// Create an empty replacer.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");

        Self {
            capacity,
            links: HashMap::with_capacity(capacity + 1),
            head: None,
            tail: None,
        }
    }

    /// Record that a block was accessed.
    ///
    /// The block becomes the most recently used. If tracking it pushes the
    /// count over capacity, the least recently used *other* block is dropped
    /// from the order and returned as the victim. At most one victim is
    /// produced per call.
    pub fn record_access(&mut self, block: BlockId) -> Option<BlockId> {
        if self.links.contains_key(&block) {
            self.unlink(block);
        }
        self.push_front(block);

        if self.links.len() > self.capacity {
            return self.evict();
        }
        None
    }

    /// Remove and return the least recently used block.
    pub fn evict(&mut self) -> Option<BlockId> {
        let victim = self.tail?;
        self.unlink(victim);
        Some(victim)
    }

    /// The least recently used block, without removing it.
    pub fn peek_lru(&self) -> Option<BlockId> {
        self.tail
    }

    /// Stop tracking a block. Returns whether it was tracked.
    pub fn remove(&mut self, block: BlockId) -> bool {
        if !self.links.contains_key(&block) {
            return false;
        }
        self.unlink(block);
        true
    }

    /// Whether the block is currently tracked.
    pub fn contains(&self, block: BlockId) -> bool {
        self.links.contains_key(&block)
    }

    /// Number of tracked blocks.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tracked blocks from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = BlockId> + '_ {
        std::iter::successors(self.head, move |block| {
            self.links.get(block).and_then(|link| link.older)
        })
    }

    fn push_front(&mut self, block: BlockId) {
        let link = Link {
            newer: None,
            older: self.head,
        };

        match self.head {
            Some(old_head) => {
                if let Some(old) = self.links.get_mut(&old_head) {
                    old.newer = Some(block);
                }
            }
            None => self.tail = Some(block),
        }

        self.head = Some(block);
        self.links.insert(block, link);
    }

    fn unlink(&mut self, block: BlockId) {
        let Some(link) = self.links.remove(&block) else {
            return;
        };

        match link.newer {
            Some(newer) => {
                if let Some(n) = self.links.get_mut(&newer) {
                    n.older = link.older;
                }
            }
            None => self.head = link.older,
        }

        match link.older {
            Some(older) => {
                if let Some(o) = self.links.get_mut(&older) {
                    o.newer = link.newer;
                }
            }
            None => self.tail = link.newer,
        }
    }
}
