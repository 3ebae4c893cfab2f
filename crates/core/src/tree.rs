//! The adaptive Huffman tree and its update procedure.
//!
//! The tree starts as a single NYT node and grows by two nodes for each
//! distinct symbol. After every observation the tree is rebalanced so that
//! the sibling property holds: ordered by id, node weights never decrease.
//!
//! # Block index
//!
//! Rebalancing needs the *block leader*: the highest-id node among all
//! nodes of a given weight. The tree keeps one ordered map per weight
//! (`weight -> id -> node`), updated on every weight change and swap, so the
//! leader is the last entry of one map. Ids come from a counter that starts
//! at `2 * symbol_count - 1` and can be astronomically large for wide
//! symbols, so nothing is ever indexed by id directly.

use crate::bits::Bit;
use crate::node::{Arena, Node, NodeIndex};
use crate::symbol::Symbol;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

/// Adaptive Huffman tree shared in lockstep by encoder and decoder.
#[derive(Debug, Clone)]
pub struct AdaptiveTree {
    arena: Arena,
    root: NodeIndex,
    /// Current not-yet-transmitted leaf
    nyt: NodeIndex,
    leaves: HashMap<Symbol, NodeIndex>,
    /// Id handed to the next node created
    next_id: i128,
    /// weight -> (id -> node), one entry per node
    blocks: BTreeMap<u64, BTreeMap<i128, NodeIndex>>,
}

impl AdaptiveTree {
    /// Create a tree for an alphabet of `symbol_count` symbols.
    ///
    /// The root starts out as the NYT node with id `2 * symbol_count - 1`.
    pub fn new(symbol_count: u128) -> Self {
        let first_id = i128::try_from(symbol_count.saturating_mul(2))
            .unwrap_or(i128::MAX)
            .saturating_sub(1);

        let mut arena = Arena::new();
        let root = arena.alloc(first_id, 0, None, None);

        let mut tree = Self {
            arena,
            root,
            nyt: root,
            leaves: HashMap::new(),
            next_id: first_id - 1,
            blocks: BTreeMap::new(),
        };
        tree.index_insert(root);
        tree
    }

    /// Create a tree sized for symbols of `symbol_size` bytes.
    pub fn for_symbol_size(symbol_size: usize) -> Self {
        Self::new(symbol_count(symbol_size))
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// The live NYT node.
    pub fn current_nyt(&self) -> NodeIndex {
        self.nyt
    }

    pub fn node(&self, idx: NodeIndex) -> &Node {
        self.arena.get(idx)
    }

    /// Total number of nodes, NYT included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Number of distinct symbols seen so far.
    pub fn distinct_symbols(&self) -> usize {
        self.leaves.len()
    }

    /// The leaf holding `symbol`, if it has been seen.
    pub fn lookup(&self, symbol: &Symbol) -> Option<NodeIndex> {
        self.leaves.get(symbol).copied()
    }

    /// Current code for `idx`.
    pub fn path_from_root(&self, idx: NodeIndex) -> Vec<Bit> {
        self.arena.path_from_root(idx)
    }

    /// Split the NYT node to make room for a never-seen symbol.
    ///
    /// The old NYT becomes an internal node whose left child is the new NYT
    /// and whose right child is a weight-1 leaf for `symbol`. The old NYT
    /// and all its ancestors then gain one unit of weight.
    pub fn add_new_symbol(&mut self, symbol: Symbol) -> NodeIndex {
        let old_nyt = self.nyt;

        let leaf_id = self.take_id();
        let nyt_id = self.take_id();
        let leaf = self
            .arena
            .alloc(leaf_id, 1, Some(symbol.clone()), Some(old_nyt));
        let new_nyt = self.arena.alloc(nyt_id, 0, None, Some(old_nyt));

        let parent = self.arena.get_mut(old_nyt);
        parent.left = Some(new_nyt);
        parent.right = Some(leaf);

        self.index_insert(leaf);
        self.index_insert(new_nyt);
        trace!(?symbol, leaf_id, "split NYT for new symbol");

        self.leaves.insert(symbol, leaf);
        self.nyt = new_nyt;

        self.update(old_nyt);
        leaf
    }

    /// Rebalance after one more observation below `start`.
    ///
    /// Walking up from `start`, each node is first swapped with the leader
    /// of its block (never with its own parent), then has its weight
    /// incremented. The walk continues from the node's parent in its new
    /// position and ends after the root has been incremented.
    pub fn update(&mut self, start: NodeIndex) {
        let mut cursor = Some(start);
        while let Some(node) = cursor {
            if node == self.root {
                self.increment(node);
                return;
            }

            let leader = self.block_leader(node);
            if leader != node {
                self.swap(node, leader);
            }
            self.increment(node);

            cursor = self.arena.get(node).parent;
        }
    }

    /// Highest-id node sharing `node`'s weight, excluding `node`'s parent.
    ///
    /// Returns `node` itself when nothing outranks it.
    pub fn block_leader(&self, node: NodeIndex) -> NodeIndex {
        let n = self.arena.get(node);
        let parent = n.parent;
        self.blocks
            .get(&n.weight)
            .and_then(|block| {
                block
                    .values()
                    .rev()
                    .copied()
                    .find(|&candidate| Some(candidate) != parent)
            })
            .unwrap_or(node)
    }

    /// True iff node weights are non-decreasing when nodes are ordered by id.
    pub fn sibling_property_holds(&self) -> bool {
        let mut by_id: Vec<&Node> = self.arena.iter().map(|(_, n)| n).collect();
        by_id.sort_by_key(|n| n.id);
        by_id.windows(2).all(|w| w[0].weight <= w[1].weight)
    }

    /// True iff every internal node weighs exactly the sum of its children.
    pub fn weights_consistent(&self) -> bool {
        self.arena.iter().all(|(_, n)| match (n.left, n.right) {
            (Some(l), Some(r)) => n.weight == self.arena.get(l).weight + self.arena.get(r).weight,
            (None, None) => true,
            _ => false,
        })
    }

    /// Number of nodes currently at weight zero.
    pub fn zero_weight_nodes(&self) -> usize {
        self.blocks.get(&0).map_or(0, |block| block.len())
    }

    fn take_id(&mut self) -> i128 {
        let id = self.next_id;
        self.next_id -= 1;
        id
    }

    fn swap(&mut self, a: NodeIndex, b: NodeIndex) {
        // Leaders always share a's weight, so both stay in one block
        let weight = self.arena.get(a).weight;
        debug_assert_eq!(weight, self.arena.get(b).weight);

        self.arena.swap(a, b);

        if let Some(block) = self.blocks.get_mut(&weight) {
            block.insert(self.arena.get(a).id, a);
            block.insert(self.arena.get(b).id, b);
        }
    }

    fn increment(&mut self, idx: NodeIndex) {
        self.index_remove(idx);
        self.arena.get_mut(idx).weight += 1;
        self.index_insert(idx);
    }

    fn index_insert(&mut self, idx: NodeIndex) {
        let node = self.arena.get(idx);
        self.blocks
            .entry(node.weight)
            .or_default()
            .insert(node.id, idx);
    }

    fn index_remove(&mut self, idx: NodeIndex) {
        let node = self.arena.get(idx);
        let (weight, id) = (node.weight, node.id);
        if let Some(block) = self.blocks.get_mut(&weight) {
            block.remove(&id);
            if block.is_empty() {
                self.blocks.remove(&weight);
            }
        }
    }
}

/// Alphabet size for `symbol_size`-byte symbols: `2^(8 * symbol_size)`.
///
/// Saturates for sizes beyond what fits in 128 bits.
pub fn symbol_count(symbol_size: usize) -> u128 {
    let bits = symbol_size.saturating_mul(8);
    if bits >= 128 {
        u128::MAX
    } else {
        1u128 << bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::to_bit_string;

    fn observe(tree: &mut AdaptiveTree, bytes: &[u8]) {
        for &b in bytes {
            let symbol = Symbol::new(&[b]);
            match tree.lookup(&symbol) {
                Some(leaf) => tree.update(leaf),
                None => {
                    tree.add_new_symbol(symbol);
                }
            }
            assert!(tree.sibling_property_holds());
            assert!(tree.weights_consistent());
            assert_eq!(tree.zero_weight_nodes(), 1);
        }
    }

    fn code(tree: &AdaptiveTree, byte: u8) -> String {
        let leaf = tree.lookup(&Symbol::new(&[byte])).unwrap();
        to_bit_string(&tree.path_from_root(leaf))
    }

    #[test]
    fn test_new_tree() {
        let tree = AdaptiveTree::new(256);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), tree.current_nyt());

        let root = tree.node(tree.root());
        assert_eq!(root.id(), 511);
        assert_eq!(root.weight(), 0);
        assert!(root.symbol().is_none());
        assert!(root.is_leaf());
        assert!(tree.path_from_root(tree.root()).is_empty());
    }

    #[test]
    fn test_first_symbol_split() {
        let mut tree = AdaptiveTree::new(256);
        let leaf = tree.add_new_symbol(Symbol::new(b"A"));

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(tree.root()).weight(), 1);
        assert_eq!(tree.node(leaf).id(), 510);
        assert_eq!(tree.node(tree.current_nyt()).id(), 509);
        assert_eq!(tree.node(tree.root()).right(), Some(leaf));
        assert_eq!(to_bit_string(&tree.path_from_root(tree.current_nyt())), "0");
        assert_eq!(tree.lookup(&Symbol::new(b"A")), Some(leaf));
        assert!(tree.lookup(&Symbol::new(b"B")).is_none());
    }

    #[test]
    fn test_repeat_does_not_swap_with_parent() {
        let mut tree = AdaptiveTree::new(256);
        observe(&mut tree, b"AA");
        // Root shares the leaf's weight before the increment but is its parent
        assert_eq!(code(&tree, b'A'), "1");
        assert_eq!(tree.node(tree.root()).weight(), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_swap_promotes_frequent_symbol() {
        let mut tree = AdaptiveTree::new(256);
        observe(&mut tree, b"AB");
        assert_eq!(code(&tree, b'A'), "1");
        assert_eq!(code(&tree, b'B'), "01");

        observe(&mut tree, b"B");
        assert_eq!(code(&tree, b'A'), "01");
        assert_eq!(code(&tree, b'B'), "1");
        assert_eq!(to_bit_string(&tree.path_from_root(tree.current_nyt())), "00");
        assert_eq!(tree.node(tree.root()).weight(), 3);
    }

    #[test]
    fn test_subtree_swap() {
        let mut tree = AdaptiveTree::new(256);
        observe(&mut tree, b"ABC");
        assert_eq!(code(&tree, b'A'), "0");
        assert_eq!(code(&tree, b'B'), "11");
        assert_eq!(code(&tree, b'C'), "101");

        observe(&mut tree, b"C");
        assert_eq!(code(&tree, b'A'), "101");
        assert_eq!(code(&tree, b'B'), "11");
        assert_eq!(code(&tree, b'C'), "0");
        assert_eq!(to_bit_string(&tree.path_from_root(tree.current_nyt())), "100");
    }

    #[test]
    fn test_abracadabra_codes() {
        let mut tree = AdaptiveTree::new(256);
        observe(&mut tree, b"abracadabra");

        assert_eq!(tree.len(), 11);
        assert_eq!(tree.distinct_symbols(), 5);
        assert_eq!(tree.node(tree.root()).weight(), 11);
        assert_eq!(code(&tree, b'a'), "0");
        assert_eq!(code(&tree, b'b'), "111");
        assert_eq!(code(&tree, b'r'), "110");
        assert_eq!(code(&tree, b'c'), "101");
        assert_eq!(code(&tree, b'd'), "1001");
        assert_eq!(to_bit_string(&tree.path_from_root(tree.current_nyt())), "1000");
    }

    #[test]
    fn test_block_leader_excludes_parent() {
        let mut tree = AdaptiveTree::new(256);
        let leaf = tree.add_new_symbol(Symbol::new(b"A"));
        // Root and leaf both weigh 1 and the root has the higher id
        assert_eq!(tree.node(tree.root()).weight(), tree.node(leaf).weight());
        assert_eq!(tree.block_leader(leaf), leaf);
    }

    #[test]
    fn test_wide_symbols_do_not_preallocate() {
        let mut tree = AdaptiveTree::for_symbol_size(15);
        assert_eq!(tree.node(tree.root()).id(), (1i128 << 121) - 1);

        tree.add_new_symbol(Symbol::new(&[7u8; 15]));
        tree.add_new_symbol(Symbol::new(&[9u8; 15]));
        assert_eq!(tree.len(), 5);
        assert!(tree.sibling_property_holds());
    }

    #[test]
    fn test_symbol_count() {
        assert_eq!(symbol_count(1), 256);
        assert_eq!(symbol_count(2), 65536);
        assert_eq!(symbol_count(15), 1u128 << 120);
        assert_eq!(symbol_count(16), u128::MAX);
    }
}
