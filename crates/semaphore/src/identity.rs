//! Semaphore identities.
//!
//! An identity is a pair of secret field elements, the trapdoor and the nullifier. Its public
//! face is the commitment `hash2(nullifier, trapdoor)`, which is the leaf inserted into group
//! trees.

use std::fmt;

use semaphore_primitives::FieldElement;
use sha3::{Digest, Keccak256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{SemaphoreError, nullifier::nullifier_hash};

const TRAPDOOR_LABEL: &[u8] = b"identity_trapdoor";
const NULLIFIER_LABEL: &[u8] = b"identity_nullifier";

/// A Semaphore identity.
///
/// The secrets are wiped when the identity is dropped. `Debug` only prints the commitment.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Identity {
    trapdoor: FieldElement,
    nullifier: FieldElement,
}

impl Identity {
    /// Deterministically derives an identity from a seed.
    ///
    /// The seed is hashed once with Keccak-256 and hex encoded; each secret is then the
    /// 512-bit big-endian value `keccak256(hex || label || 0x00) || keccak256(hex || label || 0x01)`
    /// reduced modulo the field order, so both secrets are uniform in the field.
    ///
    /// # Errors
    /// Returns [`SemaphoreError::EmptySeed`] if `seed` is empty.
    pub fn from_seed(seed: &[u8]) -> Result<Self, SemaphoreError> {
        if seed.is_empty() {
            return Err(SemaphoreError::EmptySeed);
        }
        let mut digest: [u8; 32] = Keccak256::digest(seed).into();
        let seed_hex = Zeroizing::new(hex::encode(digest));
        digest.zeroize();

        Ok(Self {
            trapdoor: derive_secret(seed_hex.as_bytes(), TRAPDOOR_LABEL),
            nullifier: derive_secret(seed_hex.as_bytes(), NULLIFIER_LABEL),
        })
    }

    /// Builds an identity from existing secrets.
    #[must_use]
    pub const fn from_secrets(trapdoor: FieldElement, nullifier: FieldElement) -> Self {
        Self {
            trapdoor,
            nullifier,
        }
    }

    /// The secret trapdoor.
    #[must_use]
    pub const fn trapdoor(&self) -> FieldElement {
        self.trapdoor
    }

    /// The secret nullifier.
    #[must_use]
    pub const fn nullifier(&self) -> FieldElement {
        self.nullifier
    }

    /// The public identity commitment, `hash2(nullifier, trapdoor)`.
    #[must_use]
    pub fn commitment(&self) -> FieldElement {
        semaphore_poseidon::hash2(*self.nullifier, *self.trapdoor).into()
    }

    /// The nullifier hash of this identity for an external nullifier that is already in the
    /// field.
    #[must_use]
    pub fn nullifier_hash(&self, external_nullifier: FieldElement) -> FieldElement {
        nullifier_hash(external_nullifier, self.nullifier)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("commitment", &self.commitment())
            .finish_non_exhaustive()
    }
}

fn derive_secret(seed_hex: &[u8], label: &[u8]) -> FieldElement {
    let mut wide = Zeroizing::new([0u8; 64]);
    for (half, counter) in wide.chunks_exact_mut(32).zip([0u8, 1u8]) {
        let mut hasher = Keccak256::new();
        hasher.update(seed_hex);
        hasher.update(label);
        hasher.update([counter]);
        half.copy_from_slice(&hasher.finalize());
    }
    FieldElement::from_be_bytes_mod_order(wide.as_slice())
}
