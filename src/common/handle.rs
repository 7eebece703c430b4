//! Handle type.

use std::fmt;

/// An opaque reference to a record inside the storage pool.
///
/// A handle is a logical address, not a resource: it owns no bytes and
/// copying it is free. Two handles with the same offset denote the same
/// location. Handles are resolved only through a
/// [`MemoryManager`](crate::memory::MemoryManager) and support no arithmetic.
///
/// # Example
/// ```
/// use bindisk::Handle;
///
/// let handle = Handle::new(128);
/// assert_eq!(handle.offset(), 128);
/// assert_eq!(handle, Handle::new(128));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Create a handle for a logical offset.
    #[inline]
    pub fn new(offset: u64) -> Self {
        Handle(offset)
    }

    /// The logical offset this handle refers to.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_offset() {
        assert_eq!(Handle::new(10).offset(), 10);
    }

    #[test]
    fn test_handle_equality_is_by_offset() {
        assert_eq!(Handle::new(5), Handle::new(5));
        assert_ne!(Handle::new(5), Handle::new(6));
        assert!(Handle::new(1) < Handle::new(2));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(format!("{}", Handle::new(42)), "Handle(42)");
    }
}
