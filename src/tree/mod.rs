//! Family taxonomy: the path-addressed container and the records it holds.
//!
//! - [`path_tree`] - arena-backed tree of families keyed by path segments
//! - [`types`] - items, family attributes, labels and ranks

pub mod path_tree;
pub mod types;

pub use path_tree::{NodeId, PathTree, TreeNode};
pub use types::*;
