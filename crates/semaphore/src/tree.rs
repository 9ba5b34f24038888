//! The incremental Merkle tree holding the identity commitments of a group.

use std::sync::LazyLock;

use semaphore_primitives::{
    Branch, FieldElement, MAX_TREE_DEPTH, MIN_TREE_DEPTH, MerkleProof,
};

use crate::SemaphoreError;

/// The value of an empty leaf.
pub const ZERO_LEAF: FieldElement = FieldElement::ZERO;

/// `ZEROS[l]` is the root of an empty subtree of height `l`.
static ZEROS: LazyLock<[FieldElement; MAX_TREE_DEPTH + 1]> = LazyLock::new(|| {
    let mut zeros = [ZERO_LEAF; MAX_TREE_DEPTH + 1];
    for level in 1..=MAX_TREE_DEPTH {
        zeros[level] = hash(zeros[level - 1], zeros[level - 1]);
    }
    zeros
});

fn hash(left: FieldElement, right: FieldElement) -> FieldElement {
    semaphore_poseidon::hash2(*left, *right).into()
}

/// The fill state of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeState {
    /// No leaf has been inserted.
    Empty,
    /// Some but not all leaves have been inserted.
    PartiallyFilled,
    /// Every leaf has been inserted; further inserts fail.
    Full,
}

/// An append-only Merkle tree of fixed depth over Poseidon.
///
/// Leaves that have not been inserted hold [`ZERO_LEAF`]. Insertion costs `depth` hashes. All
/// inserted nodes are kept per level so that a path can be produced for any inserted leaf.
#[derive(Clone, Debug)]
pub struct IncrementalMerkleTree {
    depth: usize,
    next_index: u64,
    /// The last left child seen at each level.
    frontier: Vec<FieldElement>,
    /// `levels[l]` holds all non-empty nodes at height `l`, left to right.
    levels: Vec<Vec<FieldElement>>,
    root: FieldElement,
}

impl IncrementalMerkleTree {
    /// Creates an empty tree.
    ///
    /// # Errors
    /// Returns [`SemaphoreError::InvalidDepth`] unless `MIN_TREE_DEPTH <= depth <= MAX_TREE_DEPTH`.
    pub fn new(depth: usize) -> Result<Self, SemaphoreError> {
        if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
            return Err(SemaphoreError::InvalidDepth {
                depth,
                min: MIN_TREE_DEPTH,
                max: MAX_TREE_DEPTH,
            });
        }
        let zeros = &*ZEROS;
        Ok(Self {
            depth,
            next_index: 0,
            frontier: zeros[..depth].to_vec(),
            levels: vec![Vec::new(); depth],
            root: zeros[depth],
        })
    }

    /// The depth of the tree.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The number of leaves of the tree, `2^depth`.
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        1 << self.depth
    }

    /// The number of inserted leaves, which is also the index of the next insertion.
    #[must_use]
    pub const fn next_index(&self) -> u64 {
        self.next_index
    }

    /// The current root.
    #[must_use]
    pub const fn root(&self) -> FieldElement {
        self.root
    }

    /// The zero subtree roots `zeros[0..=depth]` of this tree.
    #[must_use]
    pub fn zeros(&self) -> &[FieldElement] {
        &ZEROS[..=self.depth]
    }

    /// Whether the tree is empty, partially filled or full.
    #[must_use]
    pub const fn state(&self) -> TreeState {
        if self.next_index == 0 {
            TreeState::Empty
        } else if self.next_index == self.capacity() {
            TreeState::Full
        } else {
            TreeState::PartiallyFilled
        }
    }

    /// The leaf at `index`, if it has been inserted.
    #[must_use]
    pub fn leaf(&self, index: u64) -> Option<FieldElement> {
        let index = usize::try_from(index).ok()?;
        self.levels[0].get(index).copied()
    }

    /// Appends `leaf` and returns its index.
    ///
    /// # Errors
    /// Returns [`SemaphoreError::TreeFull`] if every leaf is taken. The tree is left unchanged.
    pub fn insert(&mut self, leaf: FieldElement) -> Result<u64, SemaphoreError> {
        let index = self.next_index;
        if index == self.capacity() {
            return Err(SemaphoreError::TreeFull {
                capacity: self.capacity(),
            });
        }
        let zeros = &*ZEROS;
        let mut node = leaf;
        for level in 0..self.depth {
            self.store(level, index >> level, node);
            node = if (index >> level) & 1 == 0 {
                self.frontier[level] = node;
                hash(node, zeros[level])
            } else {
                hash(self.frontier[level], node)
            };
        }
        self.root = node;
        self.next_index += 1;
        tracing::trace!(index, "inserted leaf");
        Ok(index)
    }

    /// Writes the node at `position` of `level`; it is either new or replaces the rightmost node.
    fn store(&mut self, level: usize, position: u64, node: FieldElement) {
        let nodes = &mut self.levels[level];
        // positions are below `next_index`, so they index allocated memory
        let position = position as usize;
        if position == nodes.len() {
            nodes.push(node);
        } else {
            nodes[position] = node;
        }
    }

    /// The inclusion proof of the leaf at `index`.
    ///
    /// # Errors
    /// Returns [`SemaphoreError::LeafNotInserted`] if `index >= next_index()`.
    pub fn proof(&self, index: u64) -> Result<MerkleProof, SemaphoreError> {
        if index >= self.next_index {
            return Err(SemaphoreError::LeafNotInserted {
                index,
                len: self.next_index,
            });
        }
        let zeros = &*ZEROS;
        let path = (0..self.depth)
            .map(|level| {
                let position = (index >> level) as usize;
                let nodes = &self.levels[level];
                if position & 1 == 0 {
                    Branch::Left(nodes.get(position + 1).copied().unwrap_or(zeros[level]))
                } else {
                    Branch::Right(nodes[position - 1])
                }
            })
            .collect();
        Ok(MerkleProof::new(index, path))
    }
}
