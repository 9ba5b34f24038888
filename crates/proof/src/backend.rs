//! Seams between the protocol and the Groth16 proof system.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof};
use groth16_material::circom::CircomGroth16Material;
use rand::{CryptoRng, Rng};
use semaphore_primitives::SemaphoreCircuitInput;

use crate::ProofError;

/// Something that can produce Groth16 proofs for the Semaphore circuit.
pub trait Prover {
    /// Computes the witness for `input` and proves it.
    ///
    /// Returns the proof together with the public signals the circuit computed, in circuit
    /// order.
    ///
    /// # Errors
    /// Returns [`ProofError`] if witness generation or proving fails.
    fn prove<R: Rng + CryptoRng>(
        &self,
        input: &SemaphoreCircuitInput,
        rng: &mut R,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), ProofError>;
}

/// Something that can check Groth16 proofs for the Semaphore circuit.
pub trait Verifier {
    /// Checks `proof` against `public_inputs`.
    ///
    /// A well-formed proof that does not verify is `Ok(false)`.
    ///
    /// # Errors
    /// Returns [`ProofError`] if the inputs do not fit the key.
    fn verify(&self, proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Result<bool, ProofError>;
}

impl<T: Prover + ?Sized> Prover for &T {
    fn prove<R: Rng + CryptoRng>(
        &self,
        input: &SemaphoreCircuitInput,
        rng: &mut R,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), ProofError> {
        (**self).prove(input, rng)
    }
}

impl<T: Verifier + ?Sized> Verifier for &T {
    fn verify(&self, proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Result<bool, ProofError> {
        (**self).verify(proof, public_inputs)
    }
}

impl Prover for CircomGroth16Material {
    fn prove<R: Rng + CryptoRng>(
        &self,
        input: &SemaphoreCircuitInput,
        rng: &mut R,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), ProofError> {
        tracing::debug!(depth = input.depth(), "generate semaphore proof");
        let (proof, public) = self.generate_proof(input, rng).inspect_err(|err| {
            tracing::error!(%err, "semaphore proof generation failed");
        })?;
        Ok((proof, public))
    }
}

impl Verifier for CircomGroth16Material {
    fn verify(&self, proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Result<bool, ProofError> {
        match self.verify_proof(proof, public_inputs) {
            Ok(()) => Ok(true),
            Err(err) => {
                tracing::debug!(%err, "semaphore proof rejected");
                Ok(false)
            }
        }
    }
}

impl Verifier for PreparedVerifyingKey<Bn254> {
    fn verify(&self, proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Result<bool, ProofError> {
        let expected = self.vk.gamma_abc_g1.len().saturating_sub(1);
        if public_inputs.len() != expected {
            return Err(ProofError::PublicInputCount {
                expected,
                actual: public_inputs.len(),
            });
        }
        let valid = Groth16::<Bn254>::verify_proof(self, proof, public_inputs)
            .map_err(|e| ProofError::Verifier(e.to_string()))?;
        if !valid {
            tracing::debug!("semaphore proof rejected");
        }
        Ok(valid)
    }
}
