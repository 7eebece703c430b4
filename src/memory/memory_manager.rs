//! Memory Manager - handle-based allocation over the buffer pool.
//!
//! The [`MemoryManager`] hands out [`Handle`]s for byte ranges of a logical
//! address space and resolves them through a [`BufferPool`]. Logical offset
//! `o` lives in block `o / block_size` at in-block offset `o % block_size`;
//! records may span blocks.

use log::trace;
use parking_lot::Mutex;

use crate::buffer::{Buffer, BufferPool, LruBufferPool};
use crate::common::config::PoolConfig;
use crate::common::{BlockId, Error, Handle, Result};
use crate::memory::free_list::FreeList;

/// Number of blocks a `BlockId` can address.
const ADDRESSABLE_BLOCKS: u64 = u32::MAX as u64 + 1;

/// One block-local piece of a logical byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    block: BlockId,
    offset: usize,
    len: usize,
}

/// Allocates records in the storage pool and moves bytes in and out of them.
///
/// Allocation is strict: every read, write and free must name the first
/// byte of a live allocation, and reads/writes must stay inside it.
/// Anything else is `Error::InvalidHandle`, which catches use-after-free.
///
/// The allocation map is kept in memory only. The bytes go through the
/// buffer pool and end up in the backing file.
///
/// # Example
/// ```no_run
/// use bindisk::memory::MemoryManager;
/// use bindisk::common::config::PoolConfig;
///
/// # fn main() -> bindisk::Result<()> {
/// let mem = MemoryManager::open(&PoolConfig::new("data.bin", 4, 64))?;
///
/// let handle = mem.allocate(5)?;
/// mem.write(handle, b"hello")?;
/// assert_eq!(mem.read(handle, 5)?, b"hello");
/// mem.free(handle)?;
/// # Ok(())
/// # }
/// ```
pub struct MemoryManager<P: BufferPool = LruBufferPool> {
    pool: P,
    free_list: Mutex<FreeList>,
}

impl MemoryManager<LruBufferPool> {
    /// Open the pool described by `config` and manage its address space.
    pub fn open(config: &PoolConfig) -> Result<Self> {
        let pool = LruBufferPool::from_config(config)?;
        Ok(Self::new(pool, config.max_bytes()))
    }
}

impl<P: BufferPool> MemoryManager<P> {
    /// Manage the address space of `pool`, optionally capped at `max_bytes`.
    pub fn new(pool: P, max_bytes: Option<u64>) -> Self {
        let addressable = ADDRESSABLE_BLOCKS.saturating_mul(pool.buf_size() as u64);
        let limit = max_bytes.map_or(addressable, |max| max.min(addressable));

        Self {
            pool,
            free_list: Mutex::new(FreeList::new(limit)),
        }
    }

    /// Reserve `size` bytes.
    ///
    /// # Errors
    /// - `Error::EmptyAllocation` if `size` is 0
    /// - `Error::OutOfSpace` if the address space cannot grow far enough
    pub fn allocate(&self, size: usize) -> Result<Handle> {
        let offset = self.free_list.lock().allocate(size as u64)?;
        trace!("allocated {} bytes at {}", size, offset);
        Ok(Handle::new(offset))
    }

    /// Release the record at `handle` for reuse.
    ///
    /// # Errors
    /// - `Error::InvalidHandle` if `handle` is not a live allocation
    pub fn free(&self, handle: Handle) -> Result<()> {
        let size = self.free_list.lock().free(handle.offset())?;
        trace!("freed {} bytes at {}", size, handle.offset());
        Ok(())
    }

    /// Copy the first `size` bytes of the record at `handle`.
    pub fn read(&self, handle: Handle, size: usize) -> Result<Vec<u8>> {
        self.read_at(handle, 0, size)
    }

    /// Copy `size` bytes starting `offset` bytes into the record at `handle`.
    ///
    /// Blocks that are not resident are loaded, possibly evicting others.
    pub fn read_at(&self, handle: Handle, offset: usize, size: usize) -> Result<Vec<u8>> {
        let start = self.check_range(handle, offset, size)?;

        let mut out = Vec::with_capacity(size);
        for segment in self.segments(start, size) {
            let buffer = self.pool.acquire_buffer(segment.block)?;
            out.extend_from_slice(&buffer.read(segment.offset, segment.len)?);
        }
        Ok(out)
    }

    /// Overwrite the start of the record at `handle` with `bytes`.
    pub fn write(&self, handle: Handle, bytes: &[u8]) -> Result<()> {
        self.write_at(handle, 0, bytes)
    }

    /// Overwrite bytes starting `offset` bytes into the record at `handle`.
    pub fn write_at(&self, handle: Handle, offset: usize, bytes: &[u8]) -> Result<()> {
        let start = self.check_range(handle, offset, bytes.len())?;

        let mut written = 0;
        for segment in self.segments(start, bytes.len()) {
            let buffer = self.pool.acquire_buffer(segment.block)?;
            buffer.write(segment.offset, &bytes[written..written + segment.len])?;
            written += segment.len;
        }
        Ok(())
    }

    /// Size of the live record at `handle`.
    pub fn allocated_size(&self, handle: Handle) -> Option<usize> {
        self.free_list
            .lock()
            .size_of(handle.offset())
            .map(|size| size as usize)
    }

    /// Bytes held by live records.
    pub fn used_bytes(&self) -> u64 {
        self.free_list.lock().used()
    }

    /// Bytes that can still be allocated.
    pub fn available_bytes(&self) -> u64 {
        self.free_list.lock().available()
    }

    /// The underlying buffer pool.
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Validate an access and return its absolute logical start.
    fn check_range(&self, handle: Handle, offset: usize, len: usize) -> Result<u64> {
        let size = self
            .free_list
            .lock()
            .size_of(handle.offset())
            .ok_or(Error::InvalidHandle(handle))?;

        match (offset as u64).checked_add(len as u64) {
            Some(end) if end <= size => Ok(handle.offset() + offset as u64),
            _ => Err(Error::InvalidHandle(handle)),
        }
    }

    /// Split a logical range into block-local pieces.
    fn segments(&self, start: u64, len: usize) -> Vec<Segment> {
        let block_size = self.pool.buf_size() as u64;

        let mut segments = Vec::new();
        let mut position = start;
        let mut remaining = len as u64;

        while remaining > 0 {
            let offset = position % block_size;
            let take = (block_size - offset).min(remaining);

            segments.push(Segment {
                block: BlockId::new((position / block_size) as u32),
                offset: offset as usize,
                len: take as usize,
            });

            position += take;
            remaining -= take;
        }
        segments
    }
}
