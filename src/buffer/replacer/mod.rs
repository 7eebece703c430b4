//! Eviction policy implementations (replacers).
//!
//! - [`LruReplacer`] - strict least-recently-used order with a fixed capacity

mod lru;

pub use lru::LruReplacer;
