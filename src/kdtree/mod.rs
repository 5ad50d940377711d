//! An implementation of a mutable K-D Tree with exact lookup and box range queries.

#![warn(missing_docs)]

mod builder;
mod index;
mod r#trait;
mod traversal;

pub use builder::{KDTreeBuilder, DEFAULT_DIMS};
pub use index::{Entry, KDTree};
pub use r#trait::KDTreeIndex;
pub use traversal::{Node, TraversalOrder};
