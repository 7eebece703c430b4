//! Configuration constants and pool parameters.

use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// Default size of a block in bytes (4KB).
///
/// Matches the OS page size on most systems. Any positive size is accepted;
/// small blocks are useful in tests to force records across block boundaries.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Default number of blocks the buffer pool keeps resident.
pub const DEFAULT_POOL_CAPACITY: usize = 10;

/// Size of the length prefix in front of every string record.
///
/// # Layout
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       2     length of the UTF-8 payload (little-endian u16)
/// 2       len   payload
/// ```
pub const STRING_HEADER_SIZE: usize = 2;

/// Largest string payload a record can frame.
pub const MAX_STRING_LEN: usize = u16::MAX as usize;

/// Parameters for opening a pool-backed store.
///
/// # Example
/// ```
/// use bindisk::common::config::PoolConfig;
///
/// let config = PoolConfig::new("data.bin", 4, 512).with_max_blocks(64);
/// assert!(config.validate().is_ok());
/// assert!(PoolConfig::new("data.bin", 0, 512).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Backing file. It must already exist.
    pub path: PathBuf,
    /// Maximum number of resident blocks.
    pub capacity: usize,
    /// Size of one block in bytes.
    pub block_size: usize,
    /// Upper bound on the number of addressable blocks, if any.
    pub max_blocks: Option<u32>,
}

impl PoolConfig {
    /// Create a config with no block limit.
    pub fn new<P: AsRef<Path>>(path: P, capacity: usize, block_size: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            capacity,
            block_size,
            max_blocks: None,
        }
    }

    /// Limit the logical address space to `max_blocks` blocks.
    pub fn with_max_blocks(mut self, max_blocks: u32) -> Self {
        self.max_blocks = Some(max_blocks);
        self
    }

    /// Reject parameters the pool cannot work with.
    ///
    /// The file's existence is checked when it is opened, not here.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("pool capacity must be > 0".into()));
        }
        if self.block_size == 0 {
            return Err(Error::InvalidConfig("block size must be > 0".into()));
        }
        if self.max_blocks == Some(0) {
            return Err(Error::InvalidConfig("max_blocks must be > 0".into()));
        }
        Ok(())
    }

    /// Total bytes addressable under this config, if bounded.
    pub fn max_bytes(&self) -> Option<u64> {
        self.max_blocks
            .map(|blocks| blocks as u64 * self.block_size as u64)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new("bindisk.bin", DEFAULT_POOL_CAPACITY, DEFAULT_BLOCK_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block_size_is_power_of_two() {
        assert!(DEFAULT_BLOCK_SIZE.is_power_of_two());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(PoolConfig::default().validate().is_ok());
        assert_eq!(PoolConfig::default().max_bytes(), None);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = PoolConfig::new("x", 0, 16).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let err = PoolConfig::new("x", 2, 0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_max_bytes() {
        let config = PoolConfig::new("x", 2, 16).with_max_blocks(4);
        assert_eq!(config.max_bytes(), Some(64));
        assert!(config.validate().is_ok());
        assert!(PoolConfig::new("x", 2, 16)
            .with_max_blocks(0)
            .validate()
            .is_err());
    }
}
