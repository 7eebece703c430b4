//! Buffer pool statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the buffer pool.
///
/// All fields are atomic so they can be bumped through `&self`. Every
/// operation uses `Ordering::Relaxed`; the counters are independent and
/// only need atomicity.
///
/// # Example
/// ```
/// use bindisk::BufferPoolStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = BufferPoolStats::new();
/// stats.hits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct BufferPoolStats {
    /// Uses of a block that was already resident.
    pub hits: AtomicU64,

    /// Uses of a block that had to be loaded.
    pub misses: AtomicU64,

    /// Blocks pushed out by the LRU order.
    pub evictions: AtomicU64,

    /// Blocks read from disk.
    pub blocks_read: AtomicU64,

    /// Blocks written to disk.
    pub blocks_written: AtomicU64,
}

impl BufferPoolStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            blocks_read: self.blocks_read.load(Ordering::Relaxed),
            blocks_written: self.blocks_written.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.blocks_read.store(0, Ordering::Relaxed);
        self.blocks_written.store(0, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`BufferPoolStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub blocks_read: u64,
    pub blocks_written: u64,
}

impl StatsSnapshot {
    /// Fraction of block uses served from memory (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits: {}, misses: {}, evictions: {}, reads: {}, writes: {}, hit rate: {:.2}%",
            self.hits,
            self.misses,
            self.evictions,
            self.blocks_read,
            self.blocks_written,
            self.hit_rate() * 100.0
        )
    }
}
