//! Block identifier type.

use std::fmt;

/// Identifies a fixed-size block of the backing file.
///
/// Block N lives at file offset `N × block_size`. The block size is chosen
/// when the pool is opened, so a `BlockId` alone does not locate bytes.
///
/// # Example
/// ```
/// use bindisk::BlockId;
///
/// let block = BlockId::new(42);
/// assert_eq!(block.index(), 42);
/// assert_eq!(block.file_offset(512), 42 * 512);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Create a new BlockId.
    #[inline]
    pub fn new(id: u32) -> Self {
        BlockId(id)
    }

    /// Position of this block in the pool's block table.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Byte offset of the block in the backing file.
    #[inline]
    pub fn file_offset(&self, block_size: usize) -> u64 {
        (self.0 as u64) * (block_size as u64)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({})", self.0)
    }
}
