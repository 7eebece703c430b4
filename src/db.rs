//! String-to-string store on top of the index and the storage pool.

use std::sync::Arc;

use log::{debug, info};

use crate::buffer::{LruBufferPool, StatsSnapshot};
use crate::common::config::PoolConfig;
use crate::common::Result;
use crate::index::BinarySearchTree;
use crate::memory::{disk_string, MemoryManager};

/// The command surface: insert, find, remove and debug.
///
/// Keys and values are stored as string records in the pool; the tree keeps
/// only their handles. Duplicate keys are allowed.
///
/// # Example
/// ```no_run
/// use bindisk::common::config::PoolConfig;
/// use bindisk::Database;
///
/// # fn main() -> bindisk::Result<()> {
/// let mut db = Database::open(&PoolConfig::new("data.bin", 10, 4096))?;
/// db.insert("Blacksburg", "37.2N 80.4W")?;
/// db.insert("Blacksburg", "VT")?;
///
/// assert_eq!(db.find("Blacksburg")?, vec!["37.2N 80.4W", "VT"]);
/// assert_eq!(db.remove("Blacksburg")?.as_deref(), Some("37.2N 80.4W"));
/// println!("{}", db.debug());
/// # Ok(())
/// # }
/// ```
pub struct Database {
    tree: BinarySearchTree,
    mem: Arc<MemoryManager>,
}

impl Database {
    /// Open the backing file named by `config`. The file must exist.
    pub fn open(config: &PoolConfig) -> Result<Self> {
        let mem = Arc::new(MemoryManager::open(config)?);
        info!("database opened on {}", config.path.display());

        Ok(Self {
            tree: BinarySearchTree::new(Arc::clone(&mem)),
            mem,
        })
    }

    /// Store `key` and `value` and index them.
    pub fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        let key_handle = disk_string::store(&self.mem, key)?;
        let value_handle = match disk_string::store(&self.mem, value) {
            Ok(handle) => handle,
            Err(e) => {
                let _ = disk_string::free(&self.mem, key_handle);
                return Err(e);
            }
        };

        if let Err(e) = self.tree.insert(key_handle, value_handle) {
            let _ = disk_string::free(&self.mem, key_handle);
            let _ = disk_string::free(&self.mem, value_handle);
            return Err(e);
        }

        debug!("inserted {:?}", key);
        Ok(())
    }

    /// Every value stored under `key`, empty if there is none.
    pub fn find(&self, key: &str) -> Result<Vec<String>> {
        self.tree
            .find(key)?
            .into_iter()
            .map(|handle| disk_string::deref(&self.mem, handle))
            .collect()
    }

    /// Remove one entry for `key` and return its value.
    ///
    /// The value is read before the entry is unlinked, so a failed read
    /// leaves the entry in place. The entry's key and value records are
    /// freed afterwards.
    pub fn remove(&mut self, key: &str) -> Result<Option<String>> {
        let Some((_, value_handle)) = self.tree.get(key)? else {
            return Ok(None);
        };
        let value = disk_string::deref(&self.mem, value_handle)?;

        let Some((key_handle, value_handle)) = self.tree.remove_entry(key)? else {
            return Ok(None);
        };
        disk_string::free(&self.mem, key_handle)?;
        disk_string::free(&self.mem, value_handle)?;

        debug!("removed {:?}", key);
        Ok(Some(value))
    }

    /// Resident block ids, most recently used first.
    pub fn debug(&self) -> String {
        self.mem.pool().debug()
    }

    /// Write every modified resident block back to the file.
    pub fn flush(&self) -> Result<()> {
        self.mem.pool().flush()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// All entries in key order.
    pub fn entries(&self) -> Result<Vec<(String, String)>> {
        self.tree
            .entries()?
            .into_iter()
            .map(|(key, handle)| Ok((key, disk_string::deref(&self.mem, handle)?)))
            .collect()
    }

    /// Buffer pool counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.mem.pool().stats().snapshot()
    }

    /// Bytes held by live records.
    pub fn used_bytes(&self) -> u64 {
        self.mem.used_bytes()
    }

    pub fn pool(&self) -> &LruBufferPool {
        self.mem.pool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::STRING_HEADER_SIZE;
    use crate::common::Error;
    use tempfile::tempdir;

    fn create_test_db(capacity: usize, block_size: usize) -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::File::create(&path).unwrap();
        let db = Database::open(&PoolConfig::new(&path, capacity, block_size)).unwrap();
        (db, dir)
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.bin");

        let result = Database::open(&PoolConfig::new(&path, 2, 64));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_insert_find_remove() {
        let (mut db, _dir) = create_test_db(4, 64);

        db.insert("m", "1").unwrap();
        db.insert("b", "2").unwrap();
        db.insert("z", "3").unwrap();
        db.insert("b", "4").unwrap();

        assert_eq!(db.find("b").unwrap(), vec!["2", "4"]);
        assert_eq!(db.len(), 4);

        assert_eq!(db.remove("b").unwrap().as_deref(), Some("2"));
        assert_eq!(db.find("b").unwrap(), vec!["4"]);
        assert_eq!(db.remove("nope").unwrap(), None);
        assert_eq!(db.len(), 3);
    }

    #[test]
    fn test_remove_frees_records() {
        let (mut db, _dir) = create_test_db(4, 64);

        db.insert("key", "value").unwrap();
        assert!(db.used_bytes() > 0);

        db.remove("key").unwrap().unwrap();
        assert_eq!(db.used_bytes(), 0);
        assert!(db.is_empty());
    }

    #[test]
    fn test_remove_with_unreadable_value_keeps_entry() {
        let (mut db, _dir) = create_test_db(4, 64);
        db.insert("key", "ab").unwrap();
        let used = db.used_bytes();

        // Corrupt the value's payload in place
        let (_, value) = db.tree.get("key").unwrap().unwrap();
        db.mem.write_at(value, STRING_HEADER_SIZE, &[0xFF, 0xFE]).unwrap();

        assert!(matches!(db.remove("key"), Err(Error::CorruptRecord(_))));
        assert_eq!(db.len(), 1);
        assert_eq!(db.used_bytes(), used);
        assert_eq!(db.tree.get("key").unwrap().map(|(_, v)| v), Some(value));

        // Repairing the record makes the entry removable again
        db.mem.write_at(value, STRING_HEADER_SIZE, b"ok").unwrap();
        assert_eq!(db.remove("key").unwrap().as_deref(), Some("ok"));
        assert_eq!(db.used_bytes(), 0);
    }

    #[test]
    fn test_entries_sorted() {
        let (mut db, _dir) = create_test_db(2, 16);

        for (k, v) in [("pear", "3"), ("apple", "1"), ("fig", "2")] {
            db.insert(k, v).unwrap();
        }

        assert_eq!(
            db.entries().unwrap(),
            vec![
                ("apple".to_string(), "1".to_string()),
                ("fig".to_string(), "2".to_string()),
                ("pear".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_failed_insert_leaks_nothing() {
        let (mut db, _dir) = create_test_db(2, 64);
        let big = "x".repeat(u16::MAX as usize + 1);

        assert!(matches!(
            db.insert("k", &big),
            Err(Error::RecordTooLarge { .. })
        ));
        assert_eq!(db.used_bytes(), 0);
        assert!(db.is_empty());
    }

    #[test]
    fn test_debug_lists_resident_blocks() {
        let (mut db, _dir) = create_test_db(3, 4);
        assert_eq!(db.debug(), "");

        db.insert("a", "b").unwrap();
        // "a" occupies bytes 0..3, "b" bytes 3..6. The tree reads the key
        // back last, so block 0 is the most recent.
        assert_eq!(db.debug(), "0 1");
    }
}
