//! String records stored through a [`MemoryManager`].
//!
//! # Record layout
//! ```text
//! ┌──────────────┬──────────────────────────┐
//! │ len: u16 LE  │ UTF-8 payload (len bytes) │
//! └──────────────┴──────────────────────────┘
//! ```
//!
//! The handle points at the length prefix. A record may span blocks.

use crate::buffer::BufferPool;
use crate::common::config::{MAX_STRING_LEN, STRING_HEADER_SIZE};
use crate::common::{Error, Handle, Result};
use crate::memory::MemoryManager;

/// Allocate a record for `value` and write it.
///
/// # Errors
/// - `Error::RecordTooLarge` if `value` is longer than `u16::MAX` bytes
/// - `Error::OutOfSpace` if the record cannot be allocated
pub fn store<P: BufferPool>(mem: &MemoryManager<P>, value: &str) -> Result<Handle> {
    let payload = value.as_bytes();
    if payload.len() > MAX_STRING_LEN {
        return Err(Error::RecordTooLarge {
            len: payload.len(),
            max: MAX_STRING_LEN,
        });
    }

    let mut record = Vec::with_capacity(STRING_HEADER_SIZE + payload.len());
    record.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    record.extend_from_slice(payload);

    let handle = mem.allocate(record.len())?;
    if let Err(e) = mem.write(handle, &record) {
        // Release the record and return the write error.
        let _ = mem.free(handle);
        return Err(e);
    }
    Ok(handle)
}

/// Read the string stored at `handle`.
///
/// # Errors
/// - `Error::InvalidHandle` if `handle` is not a live record
/// - `Error::CorruptRecord` if the length prefix overruns the record or the
///   payload is not UTF-8
pub fn deref<P: BufferPool>(mem: &MemoryManager<P>, handle: Handle) -> Result<String> {
    let header = mem.read(handle, STRING_HEADER_SIZE)?;
    let len = u16::from_le_bytes([header[0], header[1]]) as usize;

    let size = mem.allocated_size(handle).ok_or(Error::InvalidHandle(handle))?;
    if STRING_HEADER_SIZE + len > size {
        return Err(Error::CorruptRecord(handle));
    }

    let payload = mem.read_at(handle, STRING_HEADER_SIZE, len)?;
    String::from_utf8(payload).map_err(|_| Error::CorruptRecord(handle))
}

/// Release the record at `handle`.
pub fn free<P: BufferPool>(mem: &MemoryManager<P>, handle: Handle) -> Result<()> {
    mem.free(handle)
}
