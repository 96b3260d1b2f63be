//! Node storage for [`SplayTree`](crate::SplayTree).
//!
//! Every node of one tree lives in that tree's [`NodeArena`]. Links between
//! nodes are [`NodeId`] indices rather than pointers:
//!
//! - `left` / `right` are the owning direction. A node's slot is released
//!   only when the tree detaches it, never because some link went away.
//! - `parent` is a back-reference used for upward traversal while splaying.
//!   It records which child slot of the parent holds this node, so rotations
//!   branch on a [`Side`] tag instead of comparing child links.

use std::num::NonZeroU32;
use std::ops::{Index, IndexMut};

#[cold]
#[inline(never)]
fn assert_free() -> ! {
    panic!("attempted to access a freed node slot");
}

#[cold]
#[inline(never)]
fn capacity_overflow() -> ! {
    panic!("node arena capacity overflow");
}

// =============================================================================
// Handles
// =============================================================================

/// Index of a node inside its tree's arena.
///
/// Stored off-by-one in a `NonZeroU32` so that `Option<NodeId>` is 4 bytes.
/// Handles are not generational: a freed slot is reused by a later insert.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct NodeId(NonZeroU32);

impl NodeId {
    fn from_index(index: usize) -> Self {
        match u32::try_from(index + 1).ok().and_then(NonZeroU32::new) {
            Some(raw) => NodeId(raw),
            None => capacity_overflow(),
        }
    }

    #[inline]
    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.index())
    }
}

/// Which child slot of a parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Non-owning link from a node up to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParentLink {
    pub(crate) id: NodeId,
    /// The child slot of `id` that holds the linked node.
    pub(crate) side: Side,
}

// =============================================================================
// Node
// =============================================================================

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) parent: Option<ParentLink>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Node {
            key,
            value,
            left: None,
            right: None,
            parent: None,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Option<NodeId> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

// =============================================================================
// Node Arena
// =============================================================================

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Free { next: Option<NodeId> },
}

/// Slot arena with an intrusive free list.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Option<NodeId>,
    live: usize,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn new() -> Self {
        NodeArena {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.live = 0;
    }

    /// Allocate a detached node (no parent, no children).
    pub(crate) fn alloc(&mut self, key: K, value: V) -> NodeId {
        let node = Slot::Occupied(Node::new(key, value));
        self.live += 1;
        match self.free_head {
            Some(id) => {
                let old = std::mem::replace(&mut self.slots[id.index()], node);
                self.free_head = match old {
                    Slot::Free { next } => next,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                id
            }
            None => {
                let id = NodeId::from_index(self.slots.len());
                self.slots.push(node);
                id
            }
        }
    }

    /// Release a slot and hand back the node it held.
    ///
    /// The caller must already have unlinked the node from the tree.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
        let old = std::mem::replace(
            &mut self.slots[id.index()],
            Slot::Free {
                next: self.free_head,
            },
        );
        match old {
            Slot::Occupied(node) => {
                self.free_head = Some(id);
                self.live -= 1;
                node
            }
            Slot::Free { next } => {
                // Restore the free list before reporting the bug.
                self.slots[id.index()] = Slot::Free { next };
                assert_free()
            }
        }
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => assert_free(),
        }
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Free { .. } => assert_free(),
        }
    }
}
