//! bindisk - A string index whose keys live on disk behind an LRU buffer pool.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            bindisk                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Command Surface (db.rs)                    │   │
//! │  │           Database: insert / find / remove / debug       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Index Layer (index/)                     │   │
//! │  │     BinarySearchTree: native nodes, handle keys          │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓  every comparison derefs         │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Memory Layer (memory/)                    │   │
//! │  │     MemoryManager (handles → blocks) + DiskString        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Buffer Pool (buffer/)                     │   │
//! │  │   LruBufferPool + LruReplacer + Frame + Statistics       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Storage Layer (storage/)                  │   │
//! │  │          DiskManager: block-addressed file I/O           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Handle, Error, config)
//! - [`storage`] - Disk I/O
//! - [`buffer`] - Buffer pool and LRU replacement
//! - [`memory`] - Handle allocation and string records
//! - [`index`] - Binary search tree
//!
//! # Quick Start
//! ```no_run
//! use bindisk::common::config::PoolConfig;
//! use bindisk::Database;
//!
//! // The backing file must already exist
//! let mut db = Database::open(&PoolConfig::new("my_data.bin", 10, 4096)).unwrap();
//!
//! db.insert("key", "value").unwrap();
//! assert_eq!(db.find("key").unwrap(), vec!["value"]);
//! println!("resident blocks: {}", db.debug());
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod memory;
pub mod storage;

mod db;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PoolConfig, DEFAULT_BLOCK_SIZE, DEFAULT_POOL_CAPACITY};
pub use common::{BlockId, Error, Handle, Result};

pub use buffer::{Buffer, BufferPool, BufferPoolStats, LruBufferPool, StatsSnapshot};
pub use db::Database;
pub use index::BinarySearchTree;
pub use memory::MemoryManager;
pub use storage::DiskManager;
