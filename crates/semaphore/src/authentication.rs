//! Proving control of an identity without a group.
//!
//! The identity is placed alone at leaf 0 of an otherwise empty tree, so the verifier only needs
//! the identity commitment to recompute the root.

use rand::{CryptoRng, Rng};
use semaphore_primitives::{FieldElement, Groth16Proof};
use semaphore_proof::{Prover, Verifier};

use crate::{Identity, IncrementalMerkleTree, SemaphoreError, SemaphoreProof, protocol};

fn single_leaf_tree(
    depth: usize,
    commitment: FieldElement,
) -> Result<IncrementalMerkleTree, SemaphoreError> {
    let mut tree = IncrementalMerkleTree::new(depth)?;
    tree.insert(commitment)?;
    Ok(tree)
}

/// Proves that the caller holds `identity`, for a circuit of the given `depth`.
///
/// # Errors
/// Returns an error if `depth` is not supported or proving fails; see
/// [`protocol::generate_proof`].
pub fn generate_proof<R: Rng + CryptoRng>(
    depth: usize,
    identity: &Identity,
    external_nullifier: FieldElement,
    signal_hash: FieldElement,
    prover: &impl Prover,
    rng: &mut R,
) -> Result<SemaphoreProof, SemaphoreError> {
    let merkle_proof = single_leaf_tree(depth, identity.commitment())?.proof(0)?;
    protocol::generate_proof(
        identity,
        external_nullifier,
        signal_hash,
        &merkle_proof,
        prover,
        rng,
    )
}

/// Verifies a proof made with [`generate_proof`] for the identity with `commitment`.
///
/// # Errors
/// Returns an error if `depth` is not supported or the verifier fails; see
/// [`protocol::verify_proof`].
pub fn verify_proof(
    depth: usize,
    commitment: FieldElement,
    nullifier_hash: FieldElement,
    signal_hash: FieldElement,
    external_nullifier: FieldElement,
    proof: &Groth16Proof,
    verifier: &impl Verifier,
) -> Result<bool, SemaphoreError> {
    let root = single_leaf_tree(depth, commitment)?.root();
    protocol::verify_proof(
        root,
        nullifier_hash,
        signal_hash,
        external_nullifier,
        proof,
        verifier,
    )
}
