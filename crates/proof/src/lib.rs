//! Groth16 backend for the Semaphore circuit.
//!
//! The protocol layer talks to the proof system through two traits: [`Prover`] turns a
//! [`SemaphoreCircuitInput`](semaphore_primitives::SemaphoreCircuitInput) into a proof plus the
//! public signals the circuit computed, and [`Verifier`] checks a proof against a public input
//! vector. Both are implemented for the circom material (proving key and witness graph) and
//! the verifier alone for a snarkjs verifying key.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(missing_docs)]

pub mod backend;
pub mod material;
pub mod verifying_key;

pub use backend::{Prover, Verifier};
pub use material::{
    load_material_from_bytes, load_material_from_paths, load_material_from_reader,
};
pub use verifying_key::SemaphoreVerifyingKey;

pub use groth16_material::circom::{
    CircomGroth16Material, CircomGroth16MaterialBuilder, ZkeyError,
};

use std::path::PathBuf;

/// The number of public signals of the Semaphore circuit:
/// `[root, nullifier_hash, signal_hash, external_nullifier]`.
pub const NUM_PUBLIC_INPUTS: usize = 4;

/// Error type for loading circuit artifacts, proving and verifying.
#[derive(Debug, thiserror::Error)]
pub enum ProofError {
    /// A circuit artifact could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The proving key or the witness graph could not be loaded.
    #[error(transparent)]
    Zkey(#[from] ZkeyError),
    /// A circuit artifact is so malformed that the loader could not process it.
    #[error("malformed circuit artifact: {0}")]
    MalformedArtifact(String),
    /// The verifying key is malformed.
    #[error("invalid verifying key: {0}")]
    VerifyingKey(String),
    /// Errors originating from Groth16 proof generation.
    #[error(transparent)]
    Groth16(#[from] groth16_material::Groth16Error),
    /// A prover other than the circom material failed.
    #[error("prover failure: {0}")]
    Prover(String),
    /// The verifier could not process the proof at all (as opposed to rejecting it).
    #[error("verifier failure: {0}")]
    Verifier(String),
    /// The number of public inputs does not match the key.
    #[error("expected {expected} public inputs, got {actual}")]
    PublicInputCount {
        /// Public inputs the key was generated for.
        expected: usize,
        /// Public inputs supplied.
        actual: usize,
    },
}
