//! Self-adjusting binary search tree.
//!
//! Every successful access (insert, peek, extract, minimum, maximum) rotates
//! the touched node to the root, so the tree shape doubles as a rolling
//! popularity cache: recently used keys sit near the top.

use crate::error::{Error, Result};
use crate::node::{NodeArena, NodeId, ParentLink, Side};
use crate::tracing_helpers::{debug_log, trace_log};

/// Rotation pattern for one splay step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SplayStep {
    /// Parent is the root: one rotation.
    Zig,
    /// Node and parent are children on the same side: rotate grandparent,
    /// then parent.
    ZigZig,
    /// Node and parent are children on opposite sides: rotate parent, then
    /// grandparent.
    ZigZag,
}

impl SplayStep {
    /// Pick the step from the node's side under its parent and the parent's
    /// side under the grandparent (`None` when the parent is the root).
    #[inline]
    pub(crate) fn classify(node_side: Side, parent_side: Option<Side>) -> SplayStep {
        match parent_side {
            None => SplayStep::Zig,
            Some(side) if side == node_side => SplayStep::ZigZig,
            Some(_) => SplayStep::ZigZag,
        }
    }
}

/// Outcome of a BST descent.
enum Search {
    Found(NodeId),
    /// Key absent; a new node would hang off `parent` on `side`.
    Vacant { parent: Option<NodeId>, side: Side },
}

/// A splay tree keyed by a totally ordered `K`.
///
/// Keys are unique. Lookups take `&mut self` because they restructure the
/// tree.
///
/// ```rust
/// use splay_map::{Error, SplayTree};
///
/// let mut tree = SplayTree::new();
/// tree.insert(5, "five").unwrap();
/// tree.insert(3, "three").unwrap();
///
/// assert_eq!(tree.peek(&5), Ok(&"five"));
/// assert_eq!(tree.root(), Some((&5, &"five")));
/// assert_eq!(tree.insert(3, "again"), Err(Error::DuplicateKey));
/// assert_eq!(tree.extract(&3), Ok("three"));
/// assert_eq!(tree.peek(&3), Err(Error::NonexistentKey));
/// ```
#[derive(Clone)]
pub struct SplayTree<K, V> {
    nodes: NodeArena<K, V>,
    root: Option<NodeId>,
    count: usize,
}

impl<K, V> SplayTree<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Key and value currently at the root. Does not splay.
    pub fn root(&self) -> Option<(&K, &V)> {
        self.root.map(|id| {
            let node = &self.nodes[id];
            (&node.key, &node.value)
        })
    }

    /// Number of nodes on the longest root-to-leaf path. Does not splay.
    pub fn height(&self) -> usize {
        let mut max = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.left.map(|c| (c, depth + 1)));
            stack.extend(node.right.map(|c| (c, depth + 1)));
        }
        max
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.count = 0;
    }

    /// In-order iterator over `(key, value)`. Does not splay.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
            remaining: self.count,
        };
        iter.push_left_spine(self.root);
        iter
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    // =========================================================================
    // Link maintenance
    // =========================================================================

    /// Hang `child` in `parent`'s `side` slot and point it back at `parent`.
    #[inline]
    fn link(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        *self.nodes[parent].child_mut(side) = child;
        if let Some(child) = child {
            self.nodes[child].parent = Some(ParentLink { id: parent, side });
        }
    }

    /// Put `node` into the slot described by `slot`, or at the root when
    /// `slot` is `None`.
    #[inline]
    fn attach(&mut self, slot: Option<ParentLink>, node: NodeId) {
        match slot {
            Some(ParentLink { id, side }) => self.link(id, side, Some(node)),
            None => self.set_root(node),
        }
    }

    #[inline]
    fn set_root(&mut self, node: NodeId) {
        self.nodes[node].parent = None;
        self.root = Some(node);
    }

    // =========================================================================
    // Rotation and splay
    // =========================================================================

    /// Single rotation at `pivot` toward `dir`.
    ///
    /// `rotate(y, Side::Right)` is the classic right rotation: `y`'s left
    /// child `x` takes `y`'s place and `y` becomes `x`'s right child, with
    /// `x`'s former right subtree moving across to `y`'s left. Touches only
    /// `pivot`, the promoted child, the crossing subtree root, and the slot
    /// that held `pivot`.
    fn rotate(&mut self, pivot: NodeId, dir: Side) {
        let up_side = dir.opposite();
        let Some(up) = self.nodes[pivot].child(up_side) else {
            unreachable!("rotation at {pivot:?} toward {dir} has no {up_side} child");
        };
        let slot = self.nodes[pivot].parent;
        let crossing = self.nodes[up].child(dir);

        self.link(pivot, up_side, crossing);
        self.attach(slot, up);
        self.link(up, dir, Some(pivot));
    }

    /// Rotate `node` up until it is the root.
    fn splay(&mut self, node: NodeId) {
        while let Some(parent) = self.nodes[node].parent {
            let grand = self.nodes[parent.id].parent;
            let step = SplayStep::classify(parent.side, grand.map(|g| g.side));
            trace_log!(?node, ?step, "splay step");

            // Rotating a parent "away" from the side the child hangs on lifts
            // the child into the parent's place.
            match (step, grand) {
                (SplayStep::Zig, _) => {
                    self.rotate(parent.id, parent.side.opposite());
                }
                (SplayStep::ZigZig, Some(grand)) => {
                    self.rotate(grand.id, grand.side.opposite());
                    self.rotate(parent.id, parent.side.opposite());
                }
                (SplayStep::ZigZag, Some(grand)) => {
                    self.rotate(parent.id, parent.side.opposite());
                    self.rotate(grand.id, grand.side.opposite());
                }
                (_, None) => unreachable!("double rotation without a grandparent"),
            }
        }
        debug_assert_eq!(self.root, Some(node));
    }

    fn extreme(&self, side: Side) -> Option<NodeId> {
        let mut current = self.root?;
        while let Some(next) = self.nodes[current].child(side) {
            current = next;
        }
        Some(current)
    }

    fn leftmost_from(&self, mut current: NodeId) -> NodeId {
        while let Some(next) = self.nodes[current].left {
            current = next;
        }
        current
    }

    /// Unlink the root and join its subtrees. The detached node keeps no
    /// links into the tree.
    fn remove_root(&mut self, root: NodeId) {
        debug_assert_eq!(self.root, Some(root));
        let left = self.nodes[root].left.take();
        let right = self.nodes[root].right.take();

        match (left, right) {
            (None, None) => {
                trace_log!("removing leaf root");
                self.root = None;
            }
            (Some(left), None) => {
                trace_log!("promoting left subtree");
                self.set_root(left);
            }
            (None, Some(right)) => {
                trace_log!("promoting right subtree");
                self.set_root(right);
            }
            (Some(left), Some(right)) => {
                let successor = self.leftmost_from(right);
                trace_log!(?successor, "splicing successor into root");
                if successor != right {
                    // The successor is a left child with no left subtree of
                    // its own; its right subtree takes over its slot.
                    let slot = self.nodes[successor].parent;
                    let orphan = self.nodes[successor].right;
                    if let Some(ParentLink { id, side }) = slot {
                        self.link(id, side, orphan);
                    }
                    self.link(successor, Side::Right, Some(right));
                }
                self.link(successor, Side::Left, Some(left));
                self.set_root(successor);
            }
        }
    }
}

impl<K: Ord, V> SplayTree<K, V> {
    fn search(&self, key: &K) -> Search {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            side = match key.cmp(&node.key) {
                std::cmp::Ordering::Equal => return Search::Found(id),
                std::cmp::Ordering::Less => Side::Left,
                std::cmp::Ordering::Greater => Side::Right,
            };
            parent = Some(id);
            current = node.child(side);
        }
        Search::Vacant { parent, side }
    }

    /// Locate `key` and splay it to the root.
    fn access(&mut self, key: &K) -> Result<NodeId> {
        match self.search(key) {
            Search::Found(id) => {
                self.splay(id);
                Ok(id)
            }
            Search::Vacant { .. } => Err(Error::NonexistentKey),
        }
    }

    /// Insert a new key. The new node becomes the root.
    ///
    /// Fails with [`Error::DuplicateKey`] if the key is present; the tree is
    /// left untouched and `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let (parent, side) = match self.search(&key) {
            Search::Found(_) => {
                debug_log!("rejected duplicate insert");
                return Err(Error::DuplicateKey);
            }
            Search::Vacant { parent, side } => (parent, side),
        };

        let id = self.nodes.alloc(key, value);
        match parent {
            Some(parent) => self.link(parent, side, Some(id)),
            None => self.set_root(id),
        }
        self.count += 1;
        self.splay(id);
        Ok(())
    }

    /// Value for `key`, after splaying it to the root.
    pub fn peek(&mut self, key: &K) -> Result<&V> {
        let id = self.access(key)?;
        Ok(&self.nodes[id].value)
    }

    /// Mutable value for `key`, after splaying it to the root.
    pub fn peek_mut(&mut self, key: &K) -> Result<&mut V> {
        let id = self.access(key)?;
        Ok(&mut self.nodes[id].value)
    }

    /// Remove `key` and return its value.
    pub fn extract(&mut self, key: &K) -> Result<V> {
        let id = self.access(key)?;
        self.remove_root(id);
        self.count -= 1;
        Ok(self.nodes.free(id).value)
    }
}

impl<K: Ord + Clone, V> SplayTree<K, V> {
    /// Smallest key, splayed to the root.
    pub fn minimum_key(&mut self) -> Result<K> {
        let id = self.extreme(Side::Left).ok_or(Error::EmptyTree)?;
        self.splay(id);
        Ok(self.nodes[id].key.clone())
    }

    /// Largest key, splayed to the root.
    pub fn maximum_key(&mut self) -> Result<K> {
        let id = self.extreme(Side::Right).ok_or(Error::EmptyTree)?;
        self.splay(id);
        Ok(self.nodes[id].key.clone())
    }
}

impl<K: Ord, V> SplayTree<K, V> {
    /// Panic unless every structural invariant holds: strict BST order,
    /// parent links mirroring child links, an unparented root, and `len`
    /// matching both the reachable nodes and the live arena slots.
    #[track_caller]
    pub fn assert_valid(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.count, 0, "empty tree must have len 0");
            assert_eq!(self.nodes.live(), 0, "empty tree must hold no nodes");
            return;
        };
        assert!(
            self.nodes[root].parent.is_none(),
            "root must not have a parent link"
        );

        let mut reachable = 0usize;
        let mut stack: Vec<(NodeId, Option<&K>, Option<&K>)> = vec![(root, None, None)];
        while let Some((id, lower, upper)) = stack.pop() {
            reachable += 1;
            assert!(reachable <= self.count, "cycle or stray node reachable");
            let node = &self.nodes[id];
            if let Some(lower) = lower {
                assert!(node.key > *lower, "BST order violated: left-bound key");
            }
            if let Some(upper) = upper {
                assert!(node.key < *upper, "BST order violated: right-bound key");
            }

            for side in [Side::Left, Side::Right] {
                let Some(child) = node.child(side) else {
                    continue;
                };
                assert_eq!(
                    self.nodes[child].parent,
                    Some(ParentLink { id, side }),
                    "parent link of {child:?} does not match its {side} slot under {id:?}"
                );
                let bounds = match side {
                    Side::Left => (lower, Some(&node.key)),
                    Side::Right => (Some(&node.key), upper),
                };
                stack.push((child, bounds.0, bounds.1));
            }
        }

        assert_eq!(reachable, self.count, "len must match reachable nodes");
        assert_eq!(
            self.nodes.live(),
            self.count,
            "detached nodes must release their slot"
        );
    }
}

impl<K, V> Default for SplayTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: std::fmt::Debug, V: std::fmt::Debug> std::fmt::Debug for SplayTree<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a SplayTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator returned by [`SplayTree::iter`].
pub struct Iter<'a, K, V> {
    tree: &'a SplayTree<K, V>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<K, V> Iter<'_, K, V> {
    fn push_left_spine(&mut self, mut current: Option<NodeId>) {
        while let Some(id) = current {
            self.stack.push(id);
            current = self.tree.nodes[id].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id];
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
