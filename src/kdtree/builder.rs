use std::cmp::Ordering;

use log::trace;

use crate::error::{check_dims, Result};
use crate::kdtree::index::{Entry, NodeId};
use crate::kdtree::KDTree;
use crate::r#type::IndexableNum;

/// The number of dimensions used by [`KDTreeBuilder::new`].
pub const DEFAULT_DIMS: usize = 2;

/// A builder to create a [`KDTree`].
///
/// ```
/// use kd_spatial::kdtree::{KDTreeBuilder, KDTreeIndex};
///
/// let mut builder = KDTreeBuilder::<f64, &str>::new();
/// builder.add([0., 0.], "origin");
/// builder.add([5., 5.], "far");
/// let tree = builder.finish().unwrap();
/// assert_eq!(tree.find(&[5., 5.]).unwrap().value, "far");
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: IndexableNum, V> {
    dims: usize,
    entries: Vec<Entry<N, V>>,
}

impl<N: IndexableNum, V> KDTreeBuilder<N, V> {
    /// Create a new builder for two-dimensional points.
    pub fn new() -> Self {
        Self::new_with_dims(DEFAULT_DIMS)
    }

    /// Create a new builder for points with `dims` coordinates.
    pub fn new_with_dims(dims: usize) -> Self {
        Self {
            dims,
            entries: Vec::new(),
        }
    }

    /// Create a new builder with room for `num_items` entries.
    pub fn with_capacity(dims: usize, num_items: usize) -> Self {
        Self {
            dims,
            entries: Vec::with_capacity(num_items),
        }
    }

    /// Add a point to the index, returning its insertion position.
    ///
    /// Points are validated in [`finish`][Self::finish].
    pub fn add(&mut self, point: impl Into<Vec<N>>, value: V) -> usize {
        let index = self.entries.len();
        self.entries.push(Entry::new(point, value));
        index
    }

    /// Add every entry yielded by `entries`.
    pub fn extend<E: Into<Entry<N, V>>>(&mut self, entries: impl IntoIterator<Item = E>) {
        self.entries.extend(entries.into_iter().map(Into::into));
    }

    /// Consume this builder, performing the median partition and generating a KDTree ready for
    /// queries.
    ///
    /// Fails if the builder was configured with zero dimensions or if any point does not have
    /// exactly that many coordinates.
    pub fn finish(self) -> Result<KDTree<N, V>> {
        let mut tree = KDTree::empty(self.dims)?;
        for entry in self.entries.iter() {
            check_dims(&entry.point, self.dims)?;
        }

        trace!(
            "building kd-tree over {} entries in {} dimensions",
            self.entries.len(),
            self.dims
        );
        tree.root = tree.build_subtree(self.entries, 0, None);
        Ok(tree)
    }
}

impl<N: IndexableNum, V> Default for KDTreeBuilder<N, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: IndexableNum, V> KDTree<N, V> {
    /// Recursively partition `entries` into a subtree whose root sits at `depth`, returning the
    /// id of that root.
    ///
    /// At each level the entries are stably sorted on the level's axis and the lower median
    /// becomes the node. Every other entry with exactly the same point is dropped. The rest is
    /// split into entries strictly below the median on the axis (left) and the remainder (right).
    pub(crate) fn build_subtree(
        &mut self,
        mut entries: Vec<Entry<N, V>>,
        depth: usize,
        parent: Option<NodeId>,
    ) -> Option<NodeId> {
        if entries.is_empty() {
            return None;
        }
        debug_assert!(self.dims > 0, "dimensions are validated on construction");

        let axis = depth % self.dims;
        entries.sort_by(|a, b| a.point[axis].axis_cmp(&b.point[axis]));

        let median = (entries.len() - 1) / 2;
        let pivot = entries.remove(median);
        entries.retain(|entry| entry.point != pivot.point);

        // still sorted on `axis`, so everything strictly below the split is a prefix
        let split = pivot.point[axis];
        let mid =
            entries.partition_point(|entry| entry.point[axis].axis_cmp(&split) == Ordering::Less);
        let right = entries.split_off(mid);
        let left = entries;

        let id = self.alloc(pivot, parent);
        let left = self.build_subtree(left, depth + 1, Some(id));
        let right = self.build_subtree(right, depth + 1, Some(id));

        let node = self.node_mut(id);
        node.left = left;
        node.right = right;
        Some(id)
    }
}

