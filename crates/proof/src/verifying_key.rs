//! Verifying keys in the snarkjs `verification_key.json` format.

use std::{path::Path, sync::Arc};

use ark_bn254::{Bn254, Fr};
use ark_groth16::{PreparedVerifyingKey, Proof, VerifyingKey};
use circom_types::groth16::VerificationKey;

use crate::{NUM_PUBLIC_INPUTS, ProofError, Verifier};

/// A prepared verifying key for the Semaphore circuit.
///
/// Cheap to clone; the prepared key is shared.
#[derive(Clone)]
pub struct SemaphoreVerifyingKey {
    pvk: Arc<PreparedVerifyingKey<Bn254>>,
}

impl SemaphoreVerifyingKey {
    /// Prepares an arkworks verifying key.
    ///
    /// # Errors
    /// Returns an error if the key was not generated for the four public signals of the
    /// Semaphore circuit.
    pub fn new(vk: VerifyingKey<Bn254>) -> Result<Self, ProofError> {
        let public_inputs = vk.gamma_abc_g1.len().saturating_sub(1);
        if public_inputs != NUM_PUBLIC_INPUTS {
            return Err(ProofError::VerifyingKey(format!(
                "key has {public_inputs} public inputs, the circuit has {NUM_PUBLIC_INPUTS}"
            )));
        }
        Ok(Self {
            pvk: Arc::new(ark_groth16::prepare_verifying_key(&vk)),
        })
    }

    /// Parses a snarkjs `verification_key.json`.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed, a point is invalid or the key does not fit the
    /// circuit.
    pub fn from_json(json: &str) -> Result<Self, ProofError> {
        let vk: VerificationKey<Bn254> =
            serde_json::from_str(json).map_err(|e| ProofError::VerifyingKey(e.to_string()))?;
        Self::new(vk.into())
    }

    /// Reads and parses a snarkjs `verification_key.json` from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid key.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProofError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading verifying key");
        let json = std::fs::read_to_string(path).map_err(|source| ProofError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The underlying arkworks verifying key.
    #[must_use]
    pub fn vk(&self) -> &VerifyingKey<Bn254> {
        &self.pvk.vk
    }
}

impl From<&SemaphoreVerifyingKey> for VerifyingKey<Bn254> {
    fn from(value: &SemaphoreVerifyingKey) -> Self {
        value.pvk.vk.clone()
    }
}

impl Verifier for SemaphoreVerifyingKey {
    fn verify(&self, proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Result<bool, ProofError> {
        self.pvk.as_ref().verify(proof, public_inputs)
    }
}

impl std::fmt::Debug for SemaphoreVerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemaphoreVerifyingKey")
            .field("public_inputs", &self.pvk.vk.gamma_abc_g1.len().saturating_sub(1))
            .finish()
    }
}
