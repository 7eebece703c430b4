//! Storage layer - disk I/O for the backing file.
//!
//! - [`DiskManager`] - Block-addressed file I/O

mod disk_manager;

pub use disk_manager::DiskManager;
