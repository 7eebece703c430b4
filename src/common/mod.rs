//! Common types and utilities shared across bindisk.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`PoolConfig`](config::PoolConfig)
//! - Error types
//! - Identifiers ([`BlockId`], [`Handle`])

mod block_id;
pub mod config;
pub mod error;
mod handle;

pub use block_id::BlockId;
pub use error::{Error, Result};
pub use handle::Handle;
