use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{FieldElement, MAX_TREE_DEPTH, serde_utils::hex_u64};

/// One step of a Merkle path.
///
/// The variant tells on which side the node on the path sits; the payload is the hash of its
/// sibling. `Left(s)` means the node is a left child (path index 0) and `s` is the right
/// sibling, `Right(s)` means the node is a right child (path index 1) and `s` is the left
/// sibling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    /// The node is a left child.
    Left(FieldElement),
    /// The node is a right child.
    Right(FieldElement),
}

impl Branch {
    /// The sibling hash at this level.
    #[must_use]
    pub const fn sibling(&self) -> FieldElement {
        match self {
            Self::Left(sibling) | Self::Right(sibling) => *sibling,
        }
    }

    /// The side bit used by the circuit: 0 for a left child, 1 for a right child.
    #[must_use]
    pub const fn path_index(&self) -> u64 {
        match self {
            Self::Left(_) => 0,
            Self::Right(_) => 1,
        }
    }

    /// Hashes `node` together with its sibling in the right order.
    #[must_use]
    pub fn fold(&self, node: FieldElement) -> FieldElement {
        match self {
            Self::Left(sibling) => semaphore_poseidon::hash2(*node, **sibling).into(),
            Self::Right(sibling) => semaphore_poseidon::hash2(**sibling, *node).into(),
        }
    }
}

impl Zeroize for Branch {
    fn zeroize(&mut self) {
        match self {
            Self::Left(sibling) | Self::Right(sibling) => sibling.zeroize(),
        }
    }
}

/// A Merkle inclusion proof: the leaf position and the sibling path from the leaf up to (but
/// excluding) the root.
///
/// Until the proof is published its path reveals the member's position, so holders should
/// [`zeroize`](Zeroize::zeroize) it when done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct MerkleProof {
    /// Index of the proven leaf.
    #[serde(with = "hex_u64")]
    pub leaf_index: u64,
    /// The path, bottom to top. Its length is the tree depth.
    pub path: Vec<Branch>,
}

impl MerkleProof {
    /// Creates a new Merkle proof.
    #[must_use]
    pub const fn new(leaf_index: u64, path: Vec<Branch>) -> Self {
        Self { leaf_index, path }
    }

    /// The depth of the tree this proof was taken from.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Folds the path upwards from `leaf` and returns the resulting root.
    #[must_use]
    pub fn root(&self, leaf: FieldElement) -> FieldElement {
        self.path
            .iter()
            .fold(leaf, |node, branch| branch.fold(node))
    }

    /// Checks that `leaf` sits at this path under `root`.
    #[must_use]
    pub fn is_valid(&self, leaf: FieldElement, root: FieldElement) -> bool {
        self.is_consistent() && self.root(leaf) == root
    }

    /// Checks that the side bits of the path spell out `leaf_index`.
    ///
    /// Paths longer than [`MAX_TREE_DEPTH`] are never consistent.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let depth = self.path.len();
        if depth > MAX_TREE_DEPTH {
            return false;
        }
        if self.leaf_index >> depth != 0 {
            return false;
        }
        self.path
            .iter()
            .enumerate()
            .all(|(level, branch)| (self.leaf_index >> level) & 1 == branch.path_index())
    }

    /// The side bits of the path, bottom to top.
    #[must_use]
    pub fn path_indices(&self) -> Vec<u64> {
        self.path.iter().map(Branch::path_index).collect()
    }

    /// The sibling hashes of the path, bottom to top.
    #[must_use]
    pub fn siblings(&self) -> Vec<FieldElement> {
        self.path.iter().map(Branch::sibling).collect()
    }
}
