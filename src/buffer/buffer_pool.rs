//! The capabilities the memory manager needs from a buffer pool.

use crate::common::{BlockId, Result};

/// One block of the backing file, materialized in memory.
///
/// Offsets are relative to the start of the block. Accesses that do not fit
/// inside the block fail with `Error::OutOfBounds`.
pub trait Buffer {
    /// The block this buffer mirrors.
    fn block_id(&self) -> BlockId;

    /// Copy `len` bytes starting at `offset`.
    fn read(&self, offset: usize, len: usize) -> Result<Vec<u8>>;

    /// Overwrite bytes starting at `offset`. Marks the buffer dirty.
    fn write(&self, offset: usize, bytes: &[u8]) -> Result<()>;

    /// Write the block back to disk if it was modified.
    ///
    /// Always safe to call; flushing a clean buffer does no I/O.
    fn flush(&self) -> Result<()>;
}

/// Hands out buffers for block indices, loading blocks as needed.
pub trait BufferPool {
    /// Buffer type handed out by this pool.
    type Buffer<'a>: Buffer
    where
        Self: 'a;

    /// Get the buffer for `block`, loading it if it is not resident.
    fn acquire_buffer(&self, block: BlockId) -> Result<Self::Buffer<'_>>;

    /// Size of every buffer in bytes.
    fn buf_size(&self) -> usize;
}
