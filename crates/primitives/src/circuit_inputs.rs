use std::{collections::HashMap, fmt};

use groth16_material::circom::ProofInput;
use ruint::aliases::U256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{FieldElement, merkle::MerkleProof};

#[inline]
fn fe_to_u256_vec(f: FieldElement) -> Vec<U256> {
    vec![f.into()]
}

#[inline]
fn fe_seq_to_u256_vec(fs: &[FieldElement]) -> Vec<U256> {
    fs.iter().copied().map(Into::into).collect()
}

/// The input for the Semaphore circuit.
///
/// The circuit proves that `hash2(identity_nullifier, identity_trapdoor)` is a leaf under the
/// root reached by the path, and exposes `[root, nullifier_hash, signal_hash, external_nullifier]`
/// as its public signals. The identity secrets and the path are private and wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SemaphoreCircuitInput {
    /// The identity nullifier (secret).
    pub identity_nullifier: FieldElement,
    /// The identity trapdoor (secret).
    pub identity_trapdoor: FieldElement,
    /// The side bits of the Merkle path, bottom to top.
    pub tree_path_indices: Vec<FieldElement>,
    /// The sibling hashes of the Merkle path, bottom to top.
    pub tree_siblings: Vec<FieldElement>,
    /// The external nullifier, already hashed into the field.
    #[zeroize(skip)]
    pub external_nullifier: FieldElement,
    /// The signal, already hashed into the field.
    #[zeroize(skip)]
    pub signal_hash: FieldElement,
}

impl SemaphoreCircuitInput {
    /// Assembles the circuit input from the identity secrets, a Merkle proof and the public
    /// context of the proof.
    #[must_use]
    pub fn new(
        identity_nullifier: FieldElement,
        identity_trapdoor: FieldElement,
        merkle_proof: &MerkleProof,
        external_nullifier: FieldElement,
        signal_hash: FieldElement,
    ) -> Self {
        Self {
            identity_nullifier,
            identity_trapdoor,
            tree_path_indices: merkle_proof
                .path_indices()
                .into_iter()
                .map(FieldElement::from)
                .collect(),
            tree_siblings: merkle_proof.siblings(),
            external_nullifier,
            signal_hash,
        }
    }

    /// The depth of the Merkle path in this input.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tree_siblings.len()
    }
}

impl fmt::Debug for SemaphoreCircuitInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemaphoreCircuitInput")
            .field("identity_nullifier", &"<redacted>")
            .field("identity_trapdoor", &"<redacted>")
            .field("depth", &self.depth())
            .field("external_nullifier", &self.external_nullifier)
            .field("signal_hash", &self.signal_hash)
            .finish_non_exhaustive()
    }
}

impl ProofInput for SemaphoreCircuitInput {
    fn prepare_input(&self) -> HashMap<String, Vec<U256>> {
        let mut map = HashMap::new();
        map.insert(
            "identityNullifier".to_owned(),
            fe_to_u256_vec(self.identity_nullifier),
        );
        map.insert(
            "identityTrapdoor".to_owned(),
            fe_to_u256_vec(self.identity_trapdoor),
        );
        map.insert(
            "treePathIndices".to_owned(),
            fe_seq_to_u256_vec(&self.tree_path_indices),
        );
        map.insert(
            "treeSiblings".to_owned(),
            fe_seq_to_u256_vec(&self.tree_siblings),
        );
        map.insert(
            "externalNullifier".to_owned(),
            fe_to_u256_vec(self.external_nullifier),
        );
        map.insert("signalHash".to_owned(), fe_to_u256_vec(self.signal_hash));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::Branch;

    fn sample_input() -> SemaphoreCircuitInput {
        let proof = MerkleProof::new(
            2,
            vec![
                Branch::Left(FieldElement::from(10u64)),
                Branch::Right(FieldElement::from(11u64)),
            ],
        );
        SemaphoreCircuitInput::new(
            FieldElement::from(1u64),
            FieldElement::from(2u64),
            &proof,
            FieldElement::from(3u64),
            FieldElement::from(4u64),
        )
    }

    #[test]
    fn test_prepare_input_layout() {
        let map = sample_input().prepare_input();
        assert_eq!(map.len(), 6);
        assert_eq!(map["identityNullifier"], vec![U256::from(1u64)]);
        assert_eq!(map["identityTrapdoor"], vec![U256::from(2u64)]);
        assert_eq!(
            map["treePathIndices"],
            vec![U256::from(0u64), U256::from(1u64)]
        );
        assert_eq!(
            map["treeSiblings"],
            vec![U256::from(10u64), U256::from(11u64)]
        );
        assert_eq!(map["externalNullifier"], vec![U256::from(3u64)]);
        assert_eq!(map["signalHash"], vec![U256::from(4u64)]);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let input = sample_input();
        let debug = format!("{input:?}");
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("depth: 2"));
        assert!(!debug.contains("identity_trapdoor: FieldElement"));
    }

    #[test]
    fn test_zeroize_wipes_secrets_and_path() {
        let mut input = sample_input();
        input.zeroize();
        assert_eq!(input.identity_nullifier, FieldElement::ZERO);
        assert_eq!(input.identity_trapdoor, FieldElement::ZERO);
        assert!(input.tree_siblings.is_empty());
        assert_eq!(input.signal_hash, FieldElement::from(4u64));
    }
}
