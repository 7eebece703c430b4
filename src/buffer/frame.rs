//! Frame - the in-memory bytes of one resident block.
//!
//! A [`Frame`] holds a block's contents plus the metadata needed for
//! write-back:
//! - Which block is loaded
//! - Dirty flag for write-back tracking

use crate::common::BlockId;

/// A resident block.
///
/// Frames live in the pool's block table. A table slot holding a frame is
/// resident; eviction and explicit flushes take the frame out of its slot.
#[derive(Debug)]
pub struct Frame {
    /// Which block this frame mirrors.
    block: BlockId,

    /// The block contents.
    data: Box<[u8]>,

    /// Whether the bytes have been modified since loading or the last flush.
    dirty: bool,
}

impl Frame {
    /// Wrap freshly loaded bytes. The frame starts clean.
    pub fn new(block: BlockId, data: Box<[u8]>) -> Self {
        Self {
            block,
            data,
            dirty: false,
        }
    }

    #[inline]
    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Block contents.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable block contents. Marks the frame dirty.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.dirty = true;
        &mut self.data
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
