//! Binary search tree over handles.
//!
//! The node graph is native (`Box`ed children), but keys are handles into
//! the storage pool. Every comparison dereferences the node's key through the
//! [`MemoryManager`], and so through the buffer pool; decoded keys are never
//! cached, so repeated traversals keep exercising the pool.

use std::cmp::Ordering;
use std::sync::Arc;

use log::trace;

use crate::buffer::{BufferPool, LruBufferPool};
use crate::common::{Handle, Result};
use crate::memory::{disk_string, MemoryManager};

type Link = Option<Box<Node>>;

/// A tree node. Key and value never change after construction.
#[derive(Debug)]
struct Node {
    key: Handle,
    value: Handle,
    left: Link,
    right: Link,
}

impl Node {
    fn new(key: Handle, value: Handle) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
        }
    }
}

/// An unbalanced binary search tree keyed by dereferenced strings.
///
/// # Ordering
/// Keys in a node's left subtree are strictly less than the node's key;
/// keys in its right subtree are greater or equal. Duplicate keys therefore
/// form a chain down the right-hand side of the first occurrence.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use bindisk::common::config::PoolConfig;
/// use bindisk::index::BinarySearchTree;
/// use bindisk::memory::{disk_string, MemoryManager};
///
/// # fn main() -> bindisk::Result<()> {
/// let mem = Arc::new(MemoryManager::open(&PoolConfig::new("data.bin", 4, 64))?);
/// let mut tree = BinarySearchTree::new(Arc::clone(&mem));
///
/// let key = disk_string::store(&mem, "Blacksburg")?;
/// let value = disk_string::store(&mem, "37.2N 80.4W")?;
/// tree.insert(key, value)?;
///
/// assert_eq!(tree.find("Blacksburg")?, vec![value]);
/// # Ok(())
/// # }
/// ```
pub struct BinarySearchTree<P: BufferPool = LruBufferPool> {
    root: Link,
    mem: Arc<MemoryManager<P>>,
    len: usize,
}

impl<P: BufferPool> BinarySearchTree<P> {
    /// Create an empty tree that dereferences keys through `mem`.
    pub fn new(mem: Arc<MemoryManager<P>>) -> Self {
        Self {
            root: None,
            mem,
            len: 0,
        }
    }

    /// Insert a key/value pair.
    ///
    /// Descends left while the new key is smaller and right otherwise, so a
    /// duplicate lands below and to the right of its equals.
    ///
    /// # Errors
    /// Fails if any key on the path (or `key` itself) cannot be dereferenced.
    pub fn insert(&mut self, key: Handle, value: Handle) -> Result<()> {
        let mem = &self.mem;
        let key_str = disk_string::deref(mem, key)?;
        trace!("insert {:?} -> {}", key_str, value);

        let mut link = &mut self.root;
        loop {
            let go_left = match link.as_deref() {
                None => break,
                Some(node) => key_str < disk_string::deref(mem, node.key)?,
            };
            if let Some(node) = link {
                link = if go_left {
                    &mut node.left
                } else {
                    &mut node.right
                };
            }
        }

        *link = Some(Box::new(Node::new(key, value)));
        self.len += 1;
        Ok(())
    }

    /// Values of every node whose key equals `key`.
    ///
    /// Finds the first match by ordinary descent, then keeps searching the
    /// right subtree of the latest match. Results come in that order.
    pub fn find(&self, key: &str) -> Result<Vec<Handle>> {
        trace!("find {:?}", key);

        let mut found = Vec::new();
        let mut current = self.find_from(self.root.as_deref(), key)?;

        while let Some(node) = current {
            found.push(node.value);
            current = self.find_from(node.right.as_deref(), key)?;
        }
        Ok(found)
    }

    /// Key and value of the first node matching `key`.
    ///
    /// This is the node [`remove`](Self::remove) would take out.
    pub fn get(&self, key: &str) -> Result<Option<(Handle, Handle)>> {
        Ok(self
            .find_from(self.root.as_deref(), key)?
            .map(|node| (node.key, node.value)))
    }

    /// Remove the first node matching `key` and return its value.
    ///
    /// Returns `None` if nothing matches.
    pub fn remove(&mut self, key: &str) -> Result<Option<Handle>> {
        Ok(self.remove_entry(key)?.map(|(_, value)| value))
    }

    /// Remove the first node matching `key` and return its key and value.
    ///
    /// With two children, the node is replaced by a fresh node carrying the
    /// in-order predecessor's key and value, which is detached from the left
    /// subtree (its own left child takes its place).
    pub fn remove_entry(&mut self, key: &str) -> Result<Option<(Handle, Handle)>> {
        trace!("remove {:?}", key);

        let mem = &self.mem;
        let mut link = &mut self.root;
        loop {
            let go_left = match link.as_deref() {
                None => return Ok(None),
                Some(node) => match key.cmp(disk_string::deref(mem, node.key)?.as_str()) {
                    Ordering::Equal => break,
                    Ordering::Less => true,
                    Ordering::Greater => false,
                },
            };
            if let Some(node) = link {
                link = if go_left {
                    &mut node.left
                } else {
                    &mut node.right
                };
            }
        }

        let Some(mut target) = link.take() else {
            return Ok(None);
        };

        *link = match (target.left.take(), target.right.take()) {
            (None, None) => None,
            (Some(child), None) | (None, Some(child)) => Some(child),
            (Some(left), Some(right)) => {
                let mut left = Some(left);
                let pred = detach_max(&mut left);
                pred.map(|pred| {
                    Box::new(Node {
                        key: pred.key,
                        value: pred.value,
                        left,
                        right: Some(right),
                    })
                })
            }
        };

        self.len -= 1;
        Ok(Some((target.key, target.value)))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// All `(key, value)` pairs in order, keys dereferenced.
    pub fn entries(&self) -> Result<Vec<(String, Handle)>> {
        let mut entries = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = Vec::new();
        let mut current = self.root.as_deref();

        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                entries.push((disk_string::deref(&self.mem, node.key)?, node.value));
                current = node.right.as_deref();
            }
        }
        Ok(entries)
    }

    /// The memory manager keys are resolved through.
    pub fn memory(&self) -> &Arc<MemoryManager<P>> {
        &self.mem
    }

    /// First node matching `key` at or below `start`.
    fn find_from<'t>(&self, start: Option<&'t Node>, key: &str) -> Result<Option<&'t Node>> {
        let mut current = start;
        while let Some(node) = current {
            current = match key.cmp(disk_string::deref(&self.mem, node.key)?.as_str()) {
                Ordering::Equal => return Ok(Some(node)),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        Ok(None)
    }
}

/// Detach the rightmost node of a non-empty subtree, splicing its left child
/// into its place.
fn detach_max(link: &mut Link) -> Option<Box<Node>> {
    let mut link = link;
    while link.as_ref().map_or(false, |node| node.right.is_some()) {
        if let Some(node) = link {
            link = &mut node.right;
        }
    }

    let mut max = link.take()?;
    *link = max.left.take();
    Some(max)
}

impl<P: BufferPool> Drop for BinarySearchTree<P> {
    // Degenerate trees can be as deep as they are long; unlink iteratively
    // instead of letting `Box` drop recurse.
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}
