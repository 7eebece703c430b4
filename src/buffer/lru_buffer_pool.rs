//! LRU Buffer Pool - the block caching layer.
//!
//! The [`LruBufferPool`] provides:
//! - Block caching between disk and memory
//! - A fixed cap on resident blocks with strict LRU eviction
//! - Automatic dirty block write-back on eviction, flush and drop
//! - A block table that grows lazily to the highest block addressed

use std::path::Path;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::buffer::replacer::LruReplacer;
use crate::buffer::{BufferPool, BufferPoolStats, Frame, LruBuffer};
use crate::common::config::PoolConfig;
use crate::common::{BlockId, Error, Result};
use crate::storage::DiskManager;

/// Mutable pool state, guarded by a single lock.
struct PoolState {
    /// Block table indexed by block number. `None` means not resident.
    table: Vec<Option<Frame>>,

    /// Recency order of resident blocks.
    replacer: LruReplacer,
}

impl PoolState {
    /// Slot for `block`, growing the table if needed.
    fn slot(&mut self, block: BlockId) -> &mut Option<Frame> {
        let index = block.index();
        if index >= self.table.len() {
            self.table.resize_with(index + 1, || None);
        }
        &mut self.table[index]
    }

    fn is_resident(&self, block: BlockId) -> bool {
        matches!(self.table.get(block.index()), Some(Some(_)))
    }
}

/// Caches blocks of a backing file under a strict LRU policy.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                       LruBufferPool                         │
/// │  ┌──────────────────────────────────────┐  ┌─────────────┐  │
/// │  │ table: Vec<Option<Frame>>            │  │  replacer   │  │
/// │  │ [Frame0] [None] [Frame2] [Frame3] .. │  │ LruReplacer │  │
/// │  └──────────────────────────────────────┘  └─────────────┘  │
/// │  ┌──────────────┐  ┌──────────────┐                         │
/// │  │ disk_manager │  │    stats     │                         │
/// │  │    Mutex     │  │   atomics    │                         │
/// │  └──────────────┘  └──────────────┘                         │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// A block is *resident* while its table slot holds a frame. The replacer
/// orders the resident blocks by recency and never tracks more than
/// `capacity` of them.
///
/// # Locking
/// - `state`: `Mutex`, table and replacer change together
/// - `disk_manager`: `Mutex`, always taken after `state`
///
/// The pool is meant for a single thread of control; the locks provide the
/// interior mutability that lets buffers share `&LruBufferPool`.
///
/// # Usage
/// ```ignore
/// let pool = LruBufferPool::open("data.bin", 2, 4)?;
///
/// pool.acquire_buffer(BlockId::new(0))?.write(0, b"AAAA")?;
/// pool.acquire_buffer(BlockId::new(1))?.write(0, b"BBBB")?;
/// pool.acquire_buffer(BlockId::new(2))?; // evicts block 0, writing it back
///
/// assert_eq!(pool.acquire_buffer(BlockId::new(0))?.read(0, 4)?, b"AAAA");
/// ```
pub struct LruBufferPool {
    state: Mutex<PoolState>,

    /// Handles all disk I/O.
    disk_manager: Mutex<DiskManager>,

    /// Performance statistics.
    stats: BufferPoolStats,

    /// Size of every block (immutable after construction).
    block_size: usize,

    /// Maximum resident blocks (immutable after construction).
    capacity: usize,
}

impl LruBufferPool {
    /// Create a pool over an open disk manager.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if `capacity` is 0
    pub fn new(disk_manager: DiskManager, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig("pool capacity must be > 0".into()));
        }

        let block_size = disk_manager.block_size();
        info!(
            "buffer pool ready: capacity {} blocks of {} bytes",
            capacity, block_size
        );

        Ok(Self {
            state: Mutex::new(PoolState {
                table: Vec::new(),
                replacer: LruReplacer::new(capacity),
            }),
            disk_manager: Mutex::new(disk_manager),
            stats: BufferPoolStats::new(),
            block_size,
            capacity,
        })
    }

    /// Open a pool over an existing file.
    ///
    /// # Errors
    /// - `Error::InvalidConfig` if `capacity` or `block_size` is 0
    /// - `Error::FileNotFound` if the file doesn't exist
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize, block_size: usize) -> Result<Self> {
        Self::from_config(&PoolConfig::new(path, capacity, block_size))
    }

    /// Open a pool as described by `config`.
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        config.validate()?;
        let disk_manager = DiskManager::open(&config.path, config.block_size)?;
        Self::new(disk_manager, config.capacity)
    }

    // ========================================================================
    // Public API: buffers and recency
    // ========================================================================

    /// Get the buffer for `block`.
    ///
    /// Acquiring counts as a use: the block becomes the most recently used
    /// and is loaded if it is not resident (zero-filled past the end of the
    /// file), which may evict the least recently used block.
    ///
    /// # Errors
    /// - I/O errors from loading the block or writing back the victim
    pub fn acquire_buffer(&self, block: BlockId) -> Result<LruBuffer<'_>> {
        self.mark_used(block)?;
        Ok(LruBuffer::new(self, block))
    }

    /// Promote `block` to most recently used, loading it if needed.
    ///
    /// If this pushes the resident count over capacity, the least recently
    /// used other block is written back and evicted first.
    pub fn mark_used(&self, block: BlockId) -> Result<()> {
        let mut state = self.state.lock();
        self.admit(&mut state, block)?;
        Ok(())
    }

    /// Write back `block` if dirty, release its bytes and drop it from the
    /// recency order.
    ///
    /// The table keeps its length, so [`size`](Self::size) is unchanged; the
    /// next use of the block loads it again. If the write fails the block
    /// stays resident and dirty.
    pub fn mark_flushed(&self, block: BlockId) -> Result<()> {
        let mut state = self.state.lock();
        self.release(&mut state, block)?;

        debug!("flushed {}", block);
        Ok(())
    }

    // ========================================================================
    // Public API: flushing
    // ========================================================================

    /// Write back every dirty resident block, in ascending block order.
    ///
    /// Blocks stay resident and become clean. The file is synced afterwards.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        for frame in state.table.iter_mut().flatten() {
            self.write_back(frame)?;
        }
        drop(state);

        self.disk_manager.lock().sync()
    }

    /// Flush and close the pool, reporting any write-back failure.
    pub fn close(self) -> Result<()> {
        self.flush()
    }

    // ========================================================================
    // Public API: info
    // ========================================================================

    /// Number of addressable blocks: highest block index ever used + 1.
    pub fn size(&self) -> usize {
        self.state.lock().table.len()
    }

    /// Size of a block in bytes.
    pub fn buf_size(&self) -> usize {
        self.block_size
    }

    /// Maximum number of resident blocks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `block` is currently in memory.
    pub fn is_resident(&self, block: BlockId) -> bool {
        self.state.lock().is_resident(block)
    }

    /// Resident blocks, most recently used first.
    pub fn resident_blocks(&self) -> Vec<BlockId> {
        self.state.lock().replacer.iter().collect()
    }

    /// Resident block ids, most recently used first, space separated.
    pub fn debug(&self) -> String {
        self.resident_blocks()
            .iter()
            .map(|block| block.0.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    // ========================================================================
    // Internal: block access for LruBuffer
    // ========================================================================

    pub(crate) fn read_block(&self, block: BlockId, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.check_bounds(block, offset, len)?;

        let mut state = self.state.lock();
        let frame = self.admit(&mut state, block)?;
        Ok(frame.data()[offset..offset + len].to_vec())
    }

    pub(crate) fn write_block(&self, block: BlockId, offset: usize, bytes: &[u8]) -> Result<()> {
        self.check_bounds(block, offset, bytes.len())?;

        let mut state = self.state.lock();
        let frame = self.admit(&mut state, block)?;
        frame.data_mut()[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    // ========================================================================
    // Internal: residency and eviction
    // ========================================================================

    /// Make `block` resident and most recently used.
    ///
    /// Room is made and the block loaded before the recency order changes.
    /// A failed write-back leaves the pool as it was; a failed read leaves
    /// the requested block untracked.
    fn admit<'s>(&self, state: &'s mut PoolState, block: BlockId) -> Result<&'s mut Frame> {
        debug_assert_eq!(state.is_resident(block), state.replacer.contains(block));

        let frame = match state.slot(block).take() {
            Some(frame) => {
                BufferPoolStats::bump(&self.stats.hits);
                frame
            }
            None => {
                BufferPoolStats::bump(&self.stats.misses);
                if state.replacer.len() >= state.replacer.capacity() {
                    if let Some(victim) = state.replacer.peek_lru() {
                        self.evict(state, victim)?;
                    }
                }
                self.load(block)?
            }
        };

        let overflow = state.replacer.record_access(block);
        debug_assert!(overflow.is_none(), "replacer over capacity");

        Ok(state.slot(block).insert(frame))
    }

    /// Read `block` from disk into a new frame.
    fn load(&self, block: BlockId) -> Result<Frame> {
        let mut data = vec![0u8; self.block_size].into_boxed_slice();
        self.disk_manager.lock().read_block(block, &mut data)?;

        BufferPoolStats::bump(&self.stats.blocks_read);
        debug!("loaded {}", block);

        Ok(Frame::new(block, data))
    }

    /// Write back and release the least recently used block.
    fn evict(&self, state: &mut PoolState, victim: BlockId) -> Result<()> {
        self.release(state, victim)?;

        BufferPoolStats::bump(&self.stats.evictions);
        debug!("evicted {}", victim);
        Ok(())
    }

    /// Write back `block` if dirty, then clear its slot and untrack it.
    ///
    /// On a failed write nothing changes: the frame stays resident, dirty
    /// and in the recency order.
    fn release(&self, state: &mut PoolState, block: BlockId) -> Result<()> {
        if let Some(slot) = state.table.get_mut(block.index()) {
            if let Some(frame) = slot {
                self.write_back(frame)?;
            }
            *slot = None;
        }
        state.replacer.remove(block);
        Ok(())
    }

    /// Write a frame to disk if dirty.
    fn write_back(&self, frame: &mut Frame) -> Result<()> {
        if frame.is_dirty() {
            self.disk_manager
                .lock()
                .write_block(frame.block(), frame.data())?;
            frame.clear_dirty();

            BufferPoolStats::bump(&self.stats.blocks_written);
        }
        Ok(())
    }

    fn check_bounds(&self, block: BlockId, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.block_size => Ok(()),
            _ => Err(Error::OutOfBounds {
                block,
                offset,
                len,
                block_size: self.block_size,
            }),
        }
    }
}

impl BufferPool for LruBufferPool {
    type Buffer<'a> = LruBuffer<'a>;

    fn acquire_buffer(&self, block: BlockId) -> Result<LruBuffer<'_>> {
        LruBufferPool::acquire_buffer(self, block)
    }

    fn buf_size(&self) -> usize {
        self.block_size
    }
}

impl Drop for LruBufferPool {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("failed to flush buffer pool on drop: {}", e);
        }
    }
}
