use log::debug;

use crate::error::{check_dims, KDTreeError, Result};
use crate::kdtree::{KDTreeBuilder, TraversalOrder};
use crate::r#type::IndexableNum;

/// The position of a node in the tree's arena.
pub(crate) type NodeId = usize;

/// A point with an attached value, as stored in a [`KDTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<N: IndexableNum, V> {
    /// The coordinates of this entry. Always has as many elements as the tree has dimensions.
    pub point: Vec<N>,
    /// The caller-defined payload.
    pub value: V,
}

impl<N: IndexableNum, V> Entry<N, V> {
    /// Create a new entry.
    pub fn new(point: impl Into<Vec<N>>, value: V) -> Self {
        Self {
            point: point.into(),
            value,
        }
    }
}

impl<N: IndexableNum, V, P: Into<Vec<N>>> From<(P, V)> for Entry<N, V> {
    fn from((point, value): (P, V)) -> Self {
        Self::new(point, value)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TreeNode<N: IndexableNum, V> {
    pub(crate) entry: Entry<N, V>,
    /// Back-reference for navigation only. Children are owned through `left` and `right`.
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

/// A mutable K-D tree over points of `dims` coordinates, each carrying a value of type `V`.
///
/// Usually this will be created via [`KDTreeBuilder`] or [`KDTree::new`]. Queries live on the
/// [`KDTreeIndex`][crate::kdtree::KDTreeIndex] trait.
///
/// Nodes are kept in an arena and address each other by position. Slots released when a subtree
/// is rebuilt are recycled by later allocations.
#[derive(Debug, Clone)]
pub struct KDTree<N: IndexableNum, V> {
    pub(crate) dims: usize,
    pub(crate) slots: Vec<Option<TreeNode<N, V>>>,
    pub(crate) free: Vec<NodeId>,
    pub(crate) root: Option<NodeId>,
    pub(crate) num_items: usize,
}

impl<N: IndexableNum, V> KDTree<N, V> {
    /// Build a tree from `entries` with the given number of dimensions.
    ///
    /// Entries whose points are identical collapse into a single stored entry.
    pub fn new<E: Into<Entry<N, V>>>(
        entries: impl IntoIterator<Item = E>,
        dims: usize,
    ) -> Result<Self> {
        let mut builder = KDTreeBuilder::new_with_dims(dims);
        builder.extend(entries);
        builder.finish()
    }

    /// Create a tree holding no points.
    pub fn empty(dims: usize) -> Result<Self> {
        if dims == 0 {
            return Err(KDTreeError::InvalidDimensions(dims));
        }
        Ok(Self {
            dims,
            slots: Vec::new(),
            free: Vec::new(),
            root: None,
            num_items: 0,
        })
    }

    /// The number of coordinates of every point in this tree.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The number of entries stored.
    pub fn len(&self) -> usize {
        self.num_items
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The number of levels in the tree. An empty tree has height 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, level)) = stack.pop() {
            height = height.max(level);
            let node = self.node(id);
            stack.extend(node.left.map(|child| (child, level + 1)));
            stack.extend(node.right.map(|child| (child, level + 1)));
        }
        height
    }

    /// Insert an entry.
    ///
    /// The entry is attached as a new leaf when an empty child slot is reached on the way down.
    /// When the entry falls on the far side of an existing child's split on the next axis, the
    /// subtree rooted at the current node is rebuilt with the entry included instead. This keeps
    /// the partitioning invariant but gives no balance guarantee; call
    /// [`rebalance`][Self::rebalance] after many insertions.
    ///
    /// If a point with the same coordinates is already stored, its value is replaced.
    pub fn add(&mut self, point: impl Into<Vec<N>>, value: V) -> Result<()> {
        let entry = Entry::new(point, value);
        check_dims(&entry.point, self.dims)?;

        let Some(mut current) = self.root else {
            self.root = Some(self.alloc(entry, None));
            return Ok(());
        };

        let mut depth = 0;
        loop {
            let axis = depth % self.dims;
            let next_axis = (depth + 1) % self.dims;

            let node = self.node(current);
            if node.entry.point == entry.point {
                self.node_mut(current).entry.value = entry.value;
                return Ok(());
            }
            let (split, left, right) = (node.entry.point[axis], node.left, node.right);

            if entry.point[axis] < split {
                match left {
                    None => {
                        let id = self.alloc(entry, Some(current));
                        self.node_mut(current).left = Some(id);
                        return Ok(());
                    }
                    Some(left)
                        if entry.point[next_axis] >= self.node(left).entry.point[next_axis] =>
                    {
                        self.rebuild_with(current, depth, entry);
                        return Ok(());
                    }
                    Some(left) => current = left,
                }
            } else {
                match right {
                    None => {
                        let id = self.alloc(entry, Some(current));
                        self.node_mut(current).right = Some(id);
                        return Ok(());
                    }
                    Some(right)
                        if entry.point[next_axis] < self.node(right).entry.point[next_axis] =>
                    {
                        self.rebuild_with(current, depth, entry);
                        return Ok(());
                    }
                    Some(right) => current = right,
                }
            }

            depth += 1;
        }
    }

    /// Rebuild the whole tree from its entries, restoring a median-split shape.
    pub fn rebalance(&mut self) {
        let height = self.height();
        let entries = match self.root.take() {
            Some(root) => self.take_subtree(root),
            None => return,
        };
        debug!(
            "rebalancing kd-tree of {} entries, height was {}",
            entries.len(),
            height
        );

        self.slots.clear();
        self.free.clear();
        self.num_items = 0;
        self.root = self.build_subtree(entries, 0, None);
    }

    /// Consume the tree, returning its entries in the given traversal order.
    pub fn into_entries(mut self, order: TraversalOrder) -> Vec<Entry<N, V>> {
        let mut entries = match self.root.take() {
            Some(root) => self.take_subtree(root),
            None => Vec::new(),
        };
        if order == TraversalOrder::Descending {
            entries.reverse();
        }
        entries
    }

    /// Replace the subtree rooted at `id` with a fresh one built from its entries plus `entry`.
    fn rebuild_with(&mut self, id: NodeId, depth: usize, entry: Entry<N, V>) {
        let parent = self.node(id).parent;
        // Resolve the slot before `id` is released and possibly reused.
        let is_left = parent.is_some_and(|parent| self.node(parent).left == Some(id));

        let mut entries = self.take_subtree(id);
        entries.retain(|old| old.point != entry.point);
        entries.insert(0, entry);
        debug!(
            "rebuilding subtree of {} entries at depth {}",
            entries.len(),
            depth
        );

        let rebuilt = self.build_subtree(entries, depth, parent);
        match parent {
            None => self.root = rebuilt,
            Some(parent) if is_left => self.node_mut(parent).left = rebuilt,
            Some(parent) => self.node_mut(parent).right = rebuilt,
        }
    }

    /// Detach the subtree rooted at `id`, releasing its slots and returning its entries in
    /// ascending order.
    pub(crate) fn take_subtree(&mut self, id: NodeId) -> Vec<Entry<N, V>> {
        let mut entries = Vec::new();
        let mut stack = Vec::new();
        let mut current = Some(id);
        loop {
            while let Some(id) = current {
                current = self.node(id).left;
                stack.push(id);
            }
            let Some(id) = stack.pop() else {
                break;
            };
            let node = self.release(id);
            entries.push(node.entry);
            current = node.right;
        }
        entries
    }

    pub(crate) fn alloc(&mut self, entry: Entry<N, V>, parent: Option<NodeId>) -> NodeId {
        let node = TreeNode {
            entry,
            parent,
            left: None,
            right: None,
        };
        self.num_items += 1;
        match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) -> TreeNode<N, V> {
        let node = self.slots[id].take().expect("released a vacant node slot");
        self.free.push(id);
        self.num_items -= 1;
        node
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &TreeNode<N, V> {
        self.slots[id].as_ref().expect("node id refers to a live node")
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut TreeNode<N, V> {
        self.slots[id].as_mut().expect("node id refers to a live node")
    }
}
