//! The Semaphore protocol: anonymous group membership with per-topic nullifiers.
//!
//! Members create an [`Identity`] from a seed and publish its commitment. A group is an
//! [`IncrementalMerkleTree`] of commitments. To signal, a member proves in zero knowledge that
//! their commitment is in the tree and reveals a nullifier hash that is unique per identity and
//! topic, see [`protocol`].
//!
//! Proving and verifying go through the [`Prover`] and [`Verifier`] traits, implemented for the
//! circom Groth16 material of the Semaphore circuit in `semaphore-proof`.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(clippy::all, clippy::nursery, missing_docs, dead_code)]

pub mod authentication;
mod error;
pub mod identity;
pub mod nullifier;
pub mod protocol;
pub mod tree;

pub use error::{ErrorKind, SemaphoreError};
pub use identity::Identity;
pub use protocol::{SemaphoreProof, generate_proof, verify_proof};
pub use tree::{IncrementalMerkleTree, TreeState};

pub use semaphore_primitives::{
    CompressedProof, Config, FieldElement, Groth16Proof, MerkleProof, PackedProof, hash_to_field,
};
pub use semaphore_proof::{Prover, Verifier};
