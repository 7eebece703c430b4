//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between the memory manager
//! and disk. It keeps a bounded number of blocks resident, each held in a
//! frame.
//!
//! # Components
//! - [`BufferPool`] / [`Buffer`] - The capabilities the memory manager relies on
//! - [`LruBufferPool`] - The block cache with strict LRU eviction
//! - [`LruBuffer`] - Handle to one block of an `LruBufferPool`
//! - [`Frame`] - The bytes of a resident block + dirty flag
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Eviction policy implementations

mod buffer_pool;
mod frame;
mod lru_buffer;
mod lru_buffer_pool;
pub mod replacer;
mod stats;

pub use buffer_pool::{Buffer, BufferPool};
pub use frame::Frame;
pub use lru_buffer::LruBuffer;
pub use lru_buffer_pool::LruBufferPool;
pub use stats::{BufferPoolStats, StatsSnapshot};
