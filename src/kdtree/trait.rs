use geo_traits::{CoordTrait, RectTrait};
use tinyvec::TinyVec;

use crate::error::{check_dims, KDTreeError, Result};
use crate::kdtree::{Entry, KDTree, Node, TraversalOrder};
use crate::r#type::IndexableNum;

/// A trait for searching and accessing data out of a KDTree.
pub trait KDTreeIndex<N: IndexableNum, V>: Sized {
    /// The number of coordinates of every point in this tree
    fn dims(&self) -> usize;

    /// The number of items in this KDTree
    fn num_items(&self) -> usize;

    /// Access the root node of the KDTree for manual traversal, or `None` if it is empty.
    fn root(&self) -> Option<Node<'_, N, V>>;

    /// Find the entry stored at exactly `point`.
    ///
    /// Fails with [`KDTreeError::NotFound`] if no stored point equals `point`, and with
    /// [`KDTreeError::EmptyIndex`] if the tree holds no points at all.
    fn find(&self, point: &[N]) -> Result<&Entry<N, V>> {
        check_dims(point, self.dims())?;
        let mut node = self.root().ok_or_else(|| KDTreeError::empty_index(point))?;

        loop {
            if node.point() == point {
                return Ok(node.entry());
            }
            let axis = node.axis();
            let next = if point[axis] < node.point()[axis] {
                node.left()
            } else {
                node.right()
            };
            node = next.ok_or_else(|| KDTreeError::not_found(point))?;
        }
    }

    /// Returns `true` if an entry is stored at exactly `point`.
    fn contains(&self, point: &[N]) -> bool {
        self.find(point).is_ok()
    }

    /// Search the index for items within a given bounding box.
    ///
    /// - min: the lower corner, one coordinate per dimension
    /// - max: the upper corner, one coordinate per dimension
    ///
    /// Bounds are inclusive. The order of the returned entries is unspecified.
    fn range(&self, min: &[N], max: &[N]) -> Result<Vec<&Entry<N, V>>> {
        check_dims(min, self.dims())?;
        check_dims(max, self.dims())?;

        let mut result = vec![];
        let Some(root) = self.root() else {
            return Ok(result);
        };
        let tree = root.tree;

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[usize; 64]> = TinyVec::new();
        stack.push(root.id);
        stack.push(root.depth());

        while let Some(depth) = stack.pop() {
            let id = stack.pop().unwrap_or_default();
            let node = Node::new(tree, id, depth);
            let point = node.point();

            if in_box(point, min, max) {
                result.push(node.entry());
            }

            // Everything right of this node is at or above it on the axis, everything left is
            // strictly below, so one side can be skipped when the node lies outside the box.
            let axis = node.axis();
            let search_left = point[axis] >= min[axis];
            let search_right = point[axis] <= max[axis];

            // Note: these are pushed in backwards order to what gets popped
            if let Some(right) = node.right().filter(|_| search_right) {
                stack.push(right.id);
                stack.push(right.depth());
            }
            if let Some(left) = node.left().filter(|_| search_left) {
                stack.push(left.id);
                stack.push(left.depth());
            }
        }

        Ok(result)
    }

    /// Search the index for items within a given rectangle.
    ///
    /// The rectangle must have as many dimensions as the tree.
    fn range_rect(&self, rect: &impl RectTrait<T = N>) -> Result<Vec<&Entry<N, V>>> {
        self.range(&coord_to_vec(&rect.min()), &coord_to_vec(&rect.max()))
    }

    /// Search the index for items within `distance` of `point` on every axis.
    ///
    /// This is a bounding box scan, not a radius query: corners of the box are included. See
    /// [`within`][Self::within] for a Euclidean radius. On integer coordinate types the box is
    /// clamped to the bounds of the type.
    fn scan(&self, point: &[N], distance: N) -> Result<Vec<&Entry<N, V>>> {
        check_dims(point, self.dims())?;
        let min: Vec<N> = point.iter().map(|c| c.saturating_sub(distance)).collect();
        let max: Vec<N> = point.iter().map(|c| c.saturating_add(distance)).collect();
        self.range(&min, &max)
    }

    /// Search the index for items within a given radius.
    ///
    /// - point: the query point
    /// - radius: radius
    ///
    /// Distances are computed in `f64`.
    fn within(&self, point: &[N], radius: N) -> Result<Vec<&Entry<N, V>>> {
        let r = radius.to_f64().unwrap_or(f64::NAN);
        let r2 = r * r;
        let mut result = self.scan(point, radius)?;
        result.retain(|entry| sq_dist(&entry.point, point) <= r2);
        Ok(result)
    }

    /// Search the index for items within a given radius.
    ///
    /// - coord: coordinate of query point
    /// - r: radius
    fn within_coord(&self, coord: &impl CoordTrait<T = N>, r: N) -> Result<Vec<&Entry<N, V>>> {
        self.within(&coord_to_vec(coord), r)
    }

    /// Every stored entry in the given order.
    fn all(&self, order: TraversalOrder) -> Vec<&Entry<N, V>> {
        self.root()
            .map(|root| root.all(order))
            .unwrap_or_default()
    }

    /// The leftmost entry of the tree. See [`Node::min`] for what this does and does not mean.
    fn min(&self) -> Option<&Entry<N, V>> {
        self.root().map(|root| root.min().entry())
    }

    /// The rightmost entry of the tree. See [`Node::max`] for what this does and does not mean.
    fn max(&self) -> Option<&Entry<N, V>> {
        self.root().map(|root| root.max().entry())
    }
}

impl<N: IndexableNum, V> KDTreeIndex<N, V> for KDTree<N, V> {
    fn dims(&self) -> usize {
        self.dims
    }

    fn num_items(&self) -> usize {
        self.num_items
    }

    fn root(&self) -> Option<Node<'_, N, V>> {
        Node::from_root(self)
    }
}

#[inline]
fn in_box<N: IndexableNum>(point: &[N], min: &[N], max: &[N]) -> bool {
    point
        .iter()
        .zip(min.iter().zip(max))
        .all(|(c, (lo, hi))| c >= lo && c <= hi)
}

#[inline]
pub(crate) fn sq_dist<N: IndexableNum>(a: &[N], b: &[N]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(a, b)| {
            let d = a.to_f64().unwrap_or(f64::NAN) - b.to_f64().unwrap_or(f64::NAN);
            d * d
        })
        .sum()
}

fn coord_to_vec<N: IndexableNum>(coord: &impl CoordTrait<T = N>) -> Vec<N> {
    (0..coord.dim().size())
        .map(|n| coord.nth_or_panic(n))
        .collect()
}
