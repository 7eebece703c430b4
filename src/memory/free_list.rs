//! Free-space bookkeeping for the logical address space.
//!
//! The address space is a single run of bytes `[0, end)` that grows at the
//! end. Freed regions are kept in an ordered map and coalesced with their
//! neighbours; a freed region touching `end` shrinks the space instead.

use std::collections::{BTreeMap, HashMap};

use crate::common::{Error, Handle, Result};

/// First-fit allocator over logical offsets.
///
/// Only offsets and lengths live here; the bytes themselves are reached
/// through the buffer pool.
#[derive(Debug)]
pub(crate) struct FreeList {
    /// Free regions: offset -> length. Never adjacent, never touching `end`.
    free: BTreeMap<u64, u64>,

    /// Live allocations: offset -> length.
    live: HashMap<u64, u64>,

    /// First byte past the highest allocation.
    end: u64,

    /// Hard upper bound for `end`.
    limit: u64,
}

impl FreeList {
    pub(crate) fn new(limit: u64) -> Self {
        Self {
            free: BTreeMap::new(),
            live: HashMap::new(),
            end: 0,
            limit,
        }
    }

    /// Reserve `size` bytes, reusing the lowest free region that fits.
    pub(crate) fn allocate(&mut self, size: u64) -> Result<u64> {
        if size == 0 {
            return Err(Error::EmptyAllocation);
        }

        let fit = self
            .free
            .iter()
            .find(|(_, len)| **len >= size)
            .map(|(&offset, &len)| (offset, len));

        let offset = match fit {
            Some((offset, len)) => {
                self.free.remove(&offset);
                if len > size {
                    self.free.insert(offset + size, len - size);
                }
                offset
            }
            None => {
                if self.end.checked_add(size).map_or(true, |end| end > self.limit) {
                    return Err(Error::OutOfSpace {
                        requested: size,
                        available: self.available(),
                    });
                }
                let offset = self.end;
                self.end += size;
                offset
            }
        };

        self.live.insert(offset, size);
        Ok(offset)
    }

    /// Release the allocation starting at `offset`, returning its length.
    ///
    /// # Errors
    /// - `Error::InvalidHandle` if no live allocation starts at `offset`
    pub(crate) fn free(&mut self, offset: u64) -> Result<u64> {
        let size = self
            .live
            .remove(&offset)
            .ok_or(Error::InvalidHandle(Handle::new(offset)))?;

        let mut start = offset;
        let mut len = size;

        // Merge with the region just before
        if let Some((&prev, &prev_len)) = self.free.range(..offset).next_back() {
            if prev + prev_len == offset {
                self.free.remove(&prev);
                start = prev;
                len += prev_len;
            }
        }

        // Merge with the region just after
        if let Some(next_len) = self.free.remove(&(offset + size)) {
            len += next_len;
        }

        if start + len == self.end {
            self.end = start;
        } else {
            self.free.insert(start, len);
        }

        Ok(size)
    }

    /// Length of the live allocation starting at `offset`.
    pub(crate) fn size_of(&self, offset: u64) -> Option<u64> {
        self.live.get(&offset).copied()
    }

    /// Bytes held by live allocations.
    pub(crate) fn used(&self) -> u64 {
        self.live.values().sum()
    }

    /// Bytes that could still be handed out, fragmented or not.
    pub(crate) fn available(&self) -> u64 {
        self.limit - self.end + self.free.values().sum::<u64>()
    }

    #[cfg(test)]
    pub(crate) fn end(&self) -> u64 {
        self.end
    }
}
