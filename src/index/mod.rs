//! Index structures.
//!
//! - [`BinarySearchTree`] - Unbalanced BST whose keys are string records

mod bst;

pub use bst::BinarySearchTree;
