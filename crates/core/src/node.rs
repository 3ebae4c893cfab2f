//! Tree vertices and the arena that owns them.
//!
//! Nodes refer to each other through [`NodeIndex`] handles into a single
//! [`Arena`]. A handle is the node's identity and never changes. The node's
//! *id* (its rank in the sibling ordering) and its position in the tree
//! change when nodes are swapped.

use crate::bits::Bit;
use crate::symbol::Symbol;

/// Stable handle to a node in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(usize);

/// A vertex of the adaptive Huffman tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Rank in the sibling ordering; higher ids sit closer to the root
    pub(crate) id: i128,
    /// Number of observations below this node
    pub(crate) weight: u64,
    /// Present only on leaves that stand for an observed symbol
    pub(crate) symbol: Option<Symbol>,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) left: Option<NodeIndex>,
    pub(crate) right: Option<NodeIndex>,
}

impl Node {
    fn new(id: i128, weight: u64, symbol: Option<Symbol>, parent: Option<NodeIndex>) -> Self {
        Self {
            id,
            weight,
            symbol,
            parent,
            left: None,
            right: None,
        }
    }

    pub fn id(&self) -> i128 {
        self.id
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn left(&self) -> Option<NodeIndex> {
        self.left
    }

    pub fn right(&self) -> Option<NodeIndex> {
        self.right
    }

    /// True iff the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// True iff this is the not-yet-transmitted node.
    ///
    /// Only the current NYT has weight zero once the tree has seen a symbol.
    pub fn is_nyt(&self) -> bool {
        self.weight == 0
    }

    /// Child reached by following `bit` (`false` = left).
    pub fn child(&self, bit: Bit) -> Option<NodeIndex> {
        if bit {
            self.right
        } else {
            self.left
        }
    }
}

/// Owner of every node in one tree.
///
/// Nodes are only ever appended; the tree never shrinks during a job.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add a detached-from-children node and return its handle.
    pub(crate) fn alloc(
        &mut self,
        id: i128,
        weight: u64,
        symbol: Option<Symbol>,
        parent: Option<NodeIndex>,
    ) -> NodeIndex {
        self.nodes.push(Node::new(id, weight, symbol, parent));
        NodeIndex(self.nodes.len() - 1)
    }

    pub fn get(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0]
    }

    pub(crate) fn get_mut(&mut self, idx: NodeIndex) -> &mut Node {
        &mut self.nodes[idx.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }

    /// Branch decisions from the root down to `idx`. The root's path is empty.
    pub fn path_from_root(&self, idx: NodeIndex) -> Vec<Bit> {
        let mut path = Vec::new();
        let mut child = idx;
        while let Some(parent) = self.get(child).parent {
            path.push(self.get(parent).right == Some(child));
            child = parent;
        }
        path.reverse();
        path
    }

    /// Exchange the tree positions and ids of `a` and `b`.
    ///
    /// Weights, symbols and children stay with their nodes, so whole
    /// subtrees move. Does nothing if either node is the root or if they
    /// are the same node.
    pub(crate) fn swap(&mut self, a: NodeIndex, b: NodeIndex) {
        if a == b {
            return;
        }
        let (Some(pa), Some(pb)) = (self.get(a).parent, self.get(b).parent) else {
            return;
        };

        let a_is_left = self.get(pa).left == Some(a);
        let b_is_left = self.get(pb).left == Some(b);

        // Siblings under one parent must not clobber each other's slot
        if pa == pb {
            let parent = self.get_mut(pa);
            std::mem::swap(&mut parent.left, &mut parent.right);
        } else {
            if a_is_left {
                self.get_mut(pa).left = Some(b);
            } else {
                self.get_mut(pa).right = Some(b);
            }
            if b_is_left {
                self.get_mut(pb).left = Some(a);
            } else {
                self.get_mut(pb).right = Some(a);
            }
            self.get_mut(a).parent = Some(pb);
            self.get_mut(b).parent = Some(pa);
        }

        let id_a = self.get(a).id;
        let id_b = self.get(b).id;
        self.get_mut(a).id = id_b;
        self.get_mut(b).id = id_a;
    }
}
