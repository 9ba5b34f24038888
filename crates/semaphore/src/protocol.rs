//! Proving and verifying Semaphore signals.
//!
//! A proof shows that the prover knows the secrets behind one of the commitments under a tree
//! root, and binds the proof to a signal and an external nullifier. The public signals of the
//! circuit are, in order, `[root, nullifier_hash, signal_hash, external_nullifier]`.

use ark_bn254::Fr;
use rand::{CryptoRng, Rng};
use semaphore_primitives::{
    FieldElement, Groth16Proof, MAX_TREE_DEPTH, MIN_TREE_DEPTH, MerkleProof,
    SemaphoreCircuitInput, hash_to_field,
};
use semaphore_proof::{Prover, Verifier};
use serde::{Deserialize, Serialize};

use crate::{Identity, SemaphoreError};

/// A proof together with the public signals it was generated for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemaphoreProof {
    /// The root of the tree the identity was proven to be a member of.
    pub root: FieldElement,
    /// The nullifier hash of the identity for `external_nullifier`.
    pub nullifier_hash: FieldElement,
    /// The signal, hashed into the field.
    pub signal_hash: FieldElement,
    /// The external nullifier, hashed into the field.
    pub external_nullifier: FieldElement,
    /// The Groth16 proof.
    pub proof: Groth16Proof,
}

impl SemaphoreProof {
    /// The public signals in circuit order.
    #[must_use]
    pub fn public_inputs(&self) -> [FieldElement; 4] {
        public_inputs(
            self.root,
            self.nullifier_hash,
            self.signal_hash,
            self.external_nullifier,
        )
    }

    /// Checks this proof with `verifier`.
    ///
    /// # Errors
    /// See [`verify_proof`].
    pub fn verify(&self, verifier: &impl Verifier) -> Result<bool, SemaphoreError> {
        verify_proof(
            self.root,
            self.nullifier_hash,
            self.signal_hash,
            self.external_nullifier,
            &self.proof,
            verifier,
        )
    }
}

const fn public_inputs(
    root: FieldElement,
    nullifier_hash: FieldElement,
    signal_hash: FieldElement,
    external_nullifier: FieldElement,
) -> [FieldElement; 4] {
    [root, nullifier_hash, signal_hash, external_nullifier]
}

/// Generates a Semaphore proof for `identity`.
///
/// `external_nullifier` and `signal_hash` must already be field elements; see
/// [`generate_proof_for_signal`] for the variant that hashes raw bytes.
///
/// # Errors
/// Returns [`SemaphoreError::InvalidDepth`] or [`SemaphoreError::InvalidMerkleProof`] if the
/// Merkle proof cannot be fed to a circuit, [`SemaphoreError::Proof`] if the backend fails and
/// [`SemaphoreError::PublicSignalsMismatch`] if the backend computed other public signals than
/// expected.
pub fn generate_proof<R: Rng + CryptoRng>(
    identity: &Identity,
    external_nullifier: FieldElement,
    signal_hash: FieldElement,
    merkle_proof: &MerkleProof,
    prover: &impl Prover,
    rng: &mut R,
) -> Result<SemaphoreProof, SemaphoreError> {
    let depth = merkle_proof.depth();
    if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
        return Err(SemaphoreError::InvalidDepth {
            depth,
            min: MIN_TREE_DEPTH,
            max: MAX_TREE_DEPTH,
        });
    }
    if !merkle_proof.is_consistent() {
        return Err(SemaphoreError::InvalidMerkleProof(format!(
            "path does not lead to leaf {}",
            merkle_proof.leaf_index
        )));
    }

    let root = merkle_proof.root(identity.commitment());
    let nullifier_hash = identity.nullifier_hash(external_nullifier);
    let input = SemaphoreCircuitInput::new(
        identity.nullifier(),
        identity.trapdoor(),
        merkle_proof,
        external_nullifier,
        signal_hash,
    );

    tracing::debug!(depth, leaf_index = merkle_proof.leaf_index, "generating semaphore proof");
    let (proof, public) = prover.prove(&input, rng)?;
    drop(input);

    let expected = public_inputs(root, nullifier_hash, signal_hash, external_nullifier);
    if public.len() != expected.len() || public.iter().zip(&expected).any(|(a, b)| a != &**b) {
        tracing::warn!(
            returned = public.len(),
            "prover returned unexpected public signals, the proving key does not belong to the semaphore circuit"
        );
        return Err(SemaphoreError::PublicSignalsMismatch);
    }

    Ok(SemaphoreProof {
        root,
        nullifier_hash,
        signal_hash,
        external_nullifier,
        proof: proof.into(),
    })
}

/// Verifies a Semaphore proof against its public signals.
///
/// A proof that is well formed but does not verify yields `Ok(false)`.
///
/// # Errors
/// Returns [`SemaphoreError::Proof`] if the verifier cannot process the inputs, e.g. because
/// its key was generated for another circuit.
pub fn verify_proof(
    root: FieldElement,
    nullifier_hash: FieldElement,
    signal_hash: FieldElement,
    external_nullifier: FieldElement,
    proof: &Groth16Proof,
    verifier: &impl Verifier,
) -> Result<bool, SemaphoreError> {
    let public: Vec<Fr> = public_inputs(root, nullifier_hash, signal_hash, external_nullifier)
        .into_iter()
        .map(FieldElement::into_inner)
        .collect();
    let valid = verifier.verify(proof.inner(), &public)?;
    tracing::debug!(valid, %root, %nullifier_hash, "verified semaphore proof");
    Ok(valid)
}

/// Like [`generate_proof`], but hashes the raw `external_nullifier` and `signal` with
/// [`hash_to_field`] first.
///
/// # Errors
/// See [`generate_proof`].
pub fn generate_proof_for_signal<R: Rng + CryptoRng>(
    identity: &Identity,
    external_nullifier: &[u8],
    signal: &[u8],
    merkle_proof: &MerkleProof,
    prover: &impl Prover,
    rng: &mut R,
) -> Result<SemaphoreProof, SemaphoreError> {
    generate_proof(
        identity,
        hash_to_field(external_nullifier),
        hash_to_field(signal),
        merkle_proof,
        prover,
        rng,
    )
}

/// Like [`verify_proof`], but hashes the raw `signal` and `external_nullifier` with
/// [`hash_to_field`] first.
///
/// # Errors
/// See [`verify_proof`].
pub fn verify_proof_for_signal(
    root: FieldElement,
    nullifier_hash: FieldElement,
    signal: &[u8],
    external_nullifier: &[u8],
    proof: &Groth16Proof,
    verifier: &impl Verifier,
) -> Result<bool, SemaphoreError> {
    verify_proof(
        root,
        nullifier_hash,
        hash_to_field(signal),
        hash_to_field(external_nullifier),
        proof,
        verifier,
    )
}
