//! Disk Manager - low-level file I/O for fixed-size blocks.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading blocks (zero-filled past the end of the file)
//! - Writing blocks (extending the file as needed)
//! - Syncing the file to stable storage

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::common::{BlockId, Error, Result};

/// Manages disk I/O for a single backing file.
///
/// # File Layout
/// The file is a raw sequence of blocks with no header:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │  ...    │ Block N │
/// └─────────┴─────────┴─────────┴─────────┘
/// Offset:  0    B        ...      N×B
/// ```
///
/// Block N is located at file offset `N × block_size`. Blocks that were never
/// written read back as zeros, so the file may be shorter than the highest
/// addressed block.
///
/// # Thread Safety
/// `DiskManager` is **single-threaded**. The buffer pool serializes access.
pub struct DiskManager {
    file: File,
    block_size: usize,
    /// Current length of the file in bytes.
    file_len: u64,
}

impl DiskManager {
    /// Open an existing backing file.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if the file doesn't exist
    /// - `Error::InvalidConfig` if `block_size` is 0
    pub fn open<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(Error::InvalidConfig("block size must be > 0".into()));
        }

        let file = match OpenOptions::new().read(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.as_ref().to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let file_len = file.metadata()?.len();

        debug!(
            "opened {} ({} bytes, block size {})",
            path.as_ref().display(),
            file_len,
            block_size
        );

        Ok(Self {
            file,
            block_size,
            file_len,
        })
    }

    /// Create a new, empty backing file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, block_size: usize) -> Result<Self> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;

        Self::open(path, block_size)
    }

    /// Read a block into `buf`.
    ///
    /// Bytes beyond the end of the file are zero-filled.
    ///
    /// # Panics
    /// Panics if `buf.len() != block_size`.
    pub fn read_block(&mut self, block: BlockId, buf: &mut [u8]) -> Result<()> {
        assert_eq!(buf.len(), self.block_size, "buffer is not one block");

        let offset = block.file_offset(self.block_size);
        let on_disk = self.file_len.saturating_sub(offset).min(buf.len() as u64) as usize;

        if on_disk > 0 {
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.read_exact(&mut buf[..on_disk])?;
        }
        buf[on_disk..].fill(0);

        Ok(())
    }

    /// Write a block from `buf`, extending the file if needed.
    ///
    /// # Panics
    /// Panics if `buf.len() != block_size`.
    pub fn write_block(&mut self, block: BlockId, buf: &[u8]) -> Result<()> {
        assert_eq!(buf.len(), self.block_size, "buffer is not one block");

        let offset = block.file_offset(self.block_size);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;

        self.file_len = self.file_len.max(offset + buf.len() as u64);
        Ok(())
    }

    /// Flush file contents to stable storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Size of one block in bytes.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Current length of the backing file in bytes.
    #[inline]
    pub fn file_len(&self) -> u64 {
        self.file_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let dm = DiskManager::create(&path, 16).unwrap();
        assert_eq!(dm.file_len(), 0);
        assert_eq!(dm.block_size(), 16);
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        DiskManager::create(&path, 16).unwrap();
        assert!(DiskManager::create(&path, 16).is_err());
    }

    #[test]
    fn test_open_nonexistent_is_file_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.bin");

        match DiskManager::open(&path, 16) {
            Err(Error::FileNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected FileNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_open_zero_block_size_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::File::create(&path).unwrap();

        assert!(matches!(
            DiskManager::open(&path, 0),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_read_past_end_is_zeroed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let mut dm = DiskManager::create(&path, 8).unwrap();

        let mut buf = [0xFFu8; 8];
        dm.read_block(BlockId::new(5), &mut buf).unwrap();
        assert_eq!(buf, [0u8; 8]);
    }

    #[test]
    fn test_write_and_read_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        let mut dm = DiskManager::create(&path, 4).unwrap();

        dm.write_block(BlockId::new(0), b"AAAA").unwrap();
        dm.write_block(BlockId::new(2), b"CCCC").unwrap();
        assert_eq!(dm.file_len(), 12);

        let mut buf = [0u8; 4];
        dm.read_block(BlockId::new(2), &mut buf).unwrap();
        assert_eq!(&buf, b"CCCC");

        // The gap reads back as zeros
        dm.read_block(BlockId::new(1), &mut buf).unwrap();
        assert_eq!(buf, [0u8; 4]);
    }

    #[test]
    fn test_partial_last_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::write(&path, b"ABCDEF").unwrap();

        let mut dm = DiskManager::open(&path, 4).unwrap();
        let mut buf = [0xFFu8; 4];
        dm.read_block(BlockId::new(1), &mut buf).unwrap();
        assert_eq!(&buf, b"EF\0\0");
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        {
            let mut dm = DiskManager::create(&path, 4).unwrap();
            dm.write_block(BlockId::new(1), b"WXYZ").unwrap();
            dm.sync().unwrap();
        }

        {
            let mut dm = DiskManager::open(&path, 4).unwrap();
            assert_eq!(dm.file_len(), 8);

            let mut buf = [0u8; 4];
            dm.read_block(BlockId::new(1), &mut buf).unwrap();
            assert_eq!(&buf, b"WXYZ");
        }
    }
}
