//! Error types for bindisk.

use std::path::PathBuf;

use thiserror::Error;

use crate::common::{BlockId, Handle};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in bindisk.
///
/// Every variant aborts the operation that raised it. Nothing in the buffer
/// pool, the memory manager or the tree retries or degrades silently.
#[derive(Debug, Error)]
pub enum Error {
    /// The backing file does not exist.
    ///
    /// The pool never creates its file implicitly.
    #[error("backing file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A buffer access fell outside the block extent.
    #[error("access of {len} bytes at offset {offset} is outside {block} (block size {block_size})")]
    OutOfBounds {
        block: BlockId,
        offset: usize,
        len: usize,
        block_size: usize,
    },

    /// The allocator cannot satisfy a request.
    #[error("cannot allocate {requested} bytes: {available} bytes left in the pool")]
    OutOfSpace { requested: u64, available: u64 },

    /// Zero-byte allocations have no address of their own.
    #[error("cannot allocate an empty record")]
    EmptyAllocation,

    /// The handle does not refer to a live allocation, or the access runs
    /// past the end of that allocation.
    #[error("invalid handle: {0}")]
    InvalidHandle(Handle),

    /// Construction parameters were rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A string is too long for the record length prefix.
    #[error("record of {len} bytes exceeds the maximum of {max}")]
    RecordTooLarge { len: usize, max: usize },

    /// The bytes behind a handle do not decode as a string record.
    #[error("corrupt record at {0}")]
    CorruptRecord(Handle),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::OutOfBounds {
            block: BlockId::new(3),
            offset: 2,
            len: 4,
            block_size: 4,
        };
        assert_eq!(
            format!("{}", err),
            "access of 4 bytes at offset 2 is outside Block(3) (block size 4)"
        );

        let err = Error::InvalidHandle(Handle::new(17));
        assert_eq!(format!("{}", err), "invalid handle: Handle(17)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {} // Success
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(err.source().is_some());
        assert!(Error::CorruptRecord(Handle::new(0)).source().is_none());
    }
}
