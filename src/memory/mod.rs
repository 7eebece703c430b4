//! Handle-based storage on top of the buffer pool.
//!
//! - [`MemoryManager`] - Allocates records and resolves handles to bytes
//! - [`disk_string`] - Length-prefixed string records

pub mod disk_string;
mod free_list;
mod memory_manager;

pub use memory_manager::MemoryManager;
