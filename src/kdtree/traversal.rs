//! Utilities to traverse the KDTree structure.

use std::fmt;

use geo_traits::{CoordTrait, Dimensions};

use crate::kdtree::index::{Entry, NodeId, TreeNode};
use crate::kdtree::KDTree;
use crate::r#type::IndexableNum;

/// The order in which [`Node::all`] and
/// [`KDTreeIndex::all`][crate::kdtree::KDTreeIndex::all] yield entries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Left subtree, then the node, then the right subtree.
    #[default]
    Ascending,
    /// Right subtree, then the node, then the left subtree.
    Descending,
}

/// A node in the KDTree.
///
/// This is a borrowed view: it knows its depth in the tree, and therefore the axis that its
/// children are split over.
pub struct Node<'a, N: IndexableNum, V> {
    /// The tree that this node is a reference onto
    pub(crate) tree: &'a KDTree<N, V>,
    pub(crate) id: NodeId,
    depth: usize,
}

impl<'a, N: IndexableNum, V> Node<'a, N, V> {
    pub(crate) fn new(tree: &'a KDTree<N, V>, id: NodeId, depth: usize) -> Self {
        Self { tree, id, depth }
    }

    pub(crate) fn from_root(tree: &'a KDTree<N, V>) -> Option<Self> {
        tree.root.map(|id| Self::new(tree, id, 0))
    }

    #[inline]
    fn data(&self) -> &'a TreeNode<N, V> {
        self.tree.node(self.id)
    }

    /// The entry stored at this node.
    #[inline]
    pub fn entry(&self) -> &'a Entry<N, V> {
        &self.data().entry
    }

    /// The point stored at this node.
    #[inline]
    pub fn point(&self) -> &'a [N] {
        &self.data().entry.point
    }

    /// The value stored at this node.
    #[inline]
    pub fn value(&self) -> &'a V {
        &self.data().entry.value
    }

    /// The distance from the root. The root has depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The coordinate index this node splits its children on.
    #[inline]
    pub fn axis(&self) -> usize {
        self.depth % self.tree.dims
    }

    /// The child holding points strictly below this node on [`axis`][Self::axis].
    pub fn left(&self) -> Option<Self> {
        self.data()
            .left
            .map(|id| Self::new(self.tree, id, self.depth + 1))
    }

    /// The child holding points at or above this node on [`axis`][Self::axis].
    pub fn right(&self) -> Option<Self> {
        self.data()
            .right
            .map(|id| Self::new(self.tree, id, self.depth + 1))
    }

    /// The node this one hangs from, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.data()
            .parent
            .map(|id| Self::new(self.tree, id, self.depth - 1))
    }

    /// Returns `true` if this node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        let data = self.data();
        data.left.is_none() && data.right.is_none()
    }

    /// Returns `true` if this is the root of the tree.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.data().parent.is_none()
    }

    /// Every entry in the subtree rooted at this node, in the given order.
    pub fn all(&self, order: TraversalOrder) -> Vec<&'a Entry<N, V>> {
        let (first, second): (fn(&Self) -> Option<Self>, fn(&Self) -> Option<Self>) = match order
        {
            TraversalOrder::Ascending => (Self::left, Self::right),
            TraversalOrder::Descending => (Self::right, Self::left),
        };

        let mut entries = Vec::new();
        let mut stack = Vec::new();
        let mut current = Some(*self);
        loop {
            while let Some(node) = current {
                current = first(&node);
                stack.push(node);
            }
            let Some(node) = stack.pop() else {
                break;
            };
            entries.push(node.entry());
            current = second(&node);
        }
        entries
    }

    /// The leftmost node of this subtree, reached by following left children only.
    ///
    /// This is a structural extreme, not the smallest coordinate on any particular axis.
    pub fn min(&self) -> Self {
        let mut node = *self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// The rightmost node of this subtree, reached by following right children only.
    ///
    /// Like [`min`][Self::min], this is a structural extreme rather than a per-axis maximum.
    pub fn max(&self) -> Self {
        let mut node = *self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }
}

impl<N: IndexableNum, V> Clone for Node<'_, N, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N: IndexableNum, V> Copy for Node<'_, N, V> {}

impl<N: IndexableNum, V> fmt::Debug for Node<'_, N, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("point", &self.point())
            .field("depth", &self.depth)
            .finish()
    }
}

impl<N: IndexableNum, V> CoordTrait for Node<'_, N, V> {
    type T = N;

    fn dim(&self) -> Dimensions {
        match self.tree.dims {
            2 => Dimensions::Xy,
            3 => Dimensions::Xyz,
            n => Dimensions::Unknown(n),
        }
    }

    fn x(&self) -> Self::T {
        self.nth_or_panic(0)
    }

    fn y(&self) -> Self::T {
        self.nth_or_panic(1)
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match self.point().get(n) {
            Some(coord) => *coord,
            None => panic!("Invalid index of coord"),
        }
    }
}
