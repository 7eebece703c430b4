//! [`LruBuffer`] - the buffer handed out by [`LruBufferPool`].
//!
//! An `LruBuffer` is a lightweight handle: a block id plus a reference back
//! to its pool. The bytes live in the pool's block table, so the handle stays
//! valid across evictions. Every read or write reports the use to the pool,
//! which promotes the block and reloads it if it had been evicted.

use crate::buffer::{Buffer, LruBufferPool};
use crate::common::{BlockId, Result};

/// Buffer for one block of an [`LruBufferPool`].
///
/// # Example
/// ```no_run
/// use bindisk::buffer::{Buffer, BufferPool, LruBufferPool};
/// use bindisk::BlockId;
///
/// # fn main() -> bindisk::Result<()> {
/// let pool = LruBufferPool::open("data.bin", 2, 4)?;
/// let buffer = pool.acquire_buffer(BlockId::new(0))?;
/// buffer.write(0, b"AAAA")?;
/// assert_eq!(buffer.read(0, 4)?, b"AAAA");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy)]
pub struct LruBuffer<'a> {
    /// Back-reference used to report uses and flushes.
    pool: &'a LruBufferPool,
    block: BlockId,
}

impl<'a> LruBuffer<'a> {
    /// Called by `LruBufferPool::acquire_buffer()`.
    pub(crate) fn new(pool: &'a LruBufferPool, block: BlockId) -> Self {
        Self { pool, block }
    }

    /// Whether the block's bytes are currently in memory.
    pub fn is_resident(&self) -> bool {
        self.pool.is_resident(self.block)
    }
}

impl Buffer for LruBuffer<'_> {
    #[inline]
    fn block_id(&self) -> BlockId {
        self.block
    }

    fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.pool.read_block(self.block, offset, len)
    }

    fn write(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.pool.write_block(self.block, offset, bytes)
    }

    /// Write the block back if dirty, then release its bytes.
    ///
    /// The block leaves the recency order but keeps its table slot; the next
    /// read or write loads it again.
    fn flush(&self) -> Result<()> {
        self.pool.mark_flushed(self.block)
    }
}
