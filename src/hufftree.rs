use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::frequency::{FrequencyTable, SYMBOLS};
use crate::min_heap::MinHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    pub fn from_bytes(bytes: &[u8]) -> Result<Option<Self>> {
        HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(bytes))
    }

    /// Builds the tree for every non-zero symbol, or `None` when the table is
    /// all zeros.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Option<Self>> {
        // merged weights never exceed the total, so a valid total rules out overflow
        frequencies.total()?;

        let mut heap = MinHeap::with_capacity(SYMBOLS)?;
        for (byte, count) in frequencies.symbols() {
            heap.push(HuffNode::new(byte, count), count)?;
        }

        let tree = HuffmanTree::build_from_heap(heap)?;
        if let Some(tree) = &tree {
            debug!(
                leaves = tree.leaf_count(),
                depth = tree.depth(),
                "built huffman tree"
            );
        }
        Ok(tree)
    }

    fn build_from_heap(mut heap: MinHeap<HuffNode>) -> Result<Option<Self>> {
        loop {
            let Some(x) = heap.pop() else {
                return Ok(None);
            };
            let Some(y) = heap.pop() else {
                return Ok(Some(HuffmanTree { root: x }));
            };
            let z = HuffNode::merge(x, y);
            let weight = z.weight();
            heap.push(z, weight)?;
        }
    }

    pub fn is_single_leaf(&self) -> bool {
        matches!(self.root, HuffNode::Leaf { .. })
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Depth of the deepest leaf; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Sum over leaves of weight × depth.
    pub fn weighted_path_length(&self) -> u128 {
        self.root.weighted_path_length(0)
    }

    /// Recovers the frequency table from the leaf weights.
    pub fn frequencies(&self) -> FrequencyTable {
        let mut counts = [0u64; SYMBOLS];
        self.extract_node_frequencies(&self.root, &mut counts);
        FrequencyTable::from_counts(counts)
    }

    fn extract_node_frequencies(&self, node: &HuffNode, counts: &mut [u64; SYMBOLS]) {
        match node {
            HuffNode::Leaf { byte, weight } => {
                counts[*byte as usize] = *weight;
            }
            HuffNode::Internal { left, right, .. } => {
                self.extract_node_frequencies(left, counts);
                self.extract_node_frequencies(right, counts);
            }
        }
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &HuffNode,
        depth: usize,
        label: &str,
    ) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match node {
            HuffNode::Leaf { byte, weight } => writeln!(
                f,
                "{}{}-> Leaf: {:?} ({}) [weight: {}]",
                indent, label, *byte as char, byte, weight
            ),
            HuffNode::Internal { weight, left, right } => {
                writeln!(f, "{}{}-> Internal [weight: {}]", indent, label, weight)?;
                self.fmt_node(f, left, depth + 1, "L")?;
                self.fmt_node(f, right, depth + 1, "R")
            }
        }
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Huffman Tree Structure:")?;
        self.fmt_node(f, &self.root, 0, "root")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn new(b: u8, f: u64) -> Self {
        HuffNode::Leaf { weight: f, byte: b }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    /// Joins two popped subtrees. The first goes right when it is at least as
    /// heavy as the second, otherwise left.
    pub fn merge(first: Self, second: Self) -> Self {
        let weight = first.weight() + second.weight();
        let (left, right) = if first.weight() >= second.weight() {
            (second, first)
        } else {
            (first, second)
        };
        HuffNode::Internal {
            weight,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Child selected by one code bit: `false` is left, `true` is right.
    /// Leaves have no children.
    pub fn child(&self, bit: bool) -> Option<&HuffNode> {
        match self {
            HuffNode::Leaf { .. } => None,
            HuffNode::Internal { left, right, .. } => Some(if bit { right } else { left }),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            HuffNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn weighted_path_length(&self, depth: u128) -> u128 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight as u128 * depth,
            HuffNode::Internal { left, right, .. } => {
                left.weighted_path_length(depth + 1) + right.weighted_path_length(depth + 1)
            }
        }
    }
}
