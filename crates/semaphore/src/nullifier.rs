//! Nullifier hashes.
//!
//! A nullifier hash is unique per identity and external nullifier (the "topic" of a signal). A
//! verifier that records seen nullifier hashes can therefore reject a second signal of the same
//! member on the same topic without learning who the member is.

use semaphore_primitives::{FieldElement, hash_to_field};

/// Computes `hash2(external_nullifier, identity_nullifier)`.
#[must_use]
pub fn nullifier_hash(
    external_nullifier: FieldElement,
    identity_nullifier: FieldElement,
) -> FieldElement {
    semaphore_poseidon::hash2(*external_nullifier, *identity_nullifier).into()
}

/// Maps a topic given as raw bytes to its external nullifier with [`hash_to_field`].
#[must_use]
pub fn external_nullifier(topic: &[u8]) -> FieldElement {
    hash_to_field(topic)
}
