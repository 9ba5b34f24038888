use ark_bn254::{Bn254, Fr};
use ark_ff::Field;
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey};
use ark_snark::SNARK;
use rand::{CryptoRng, Rng};
use semaphore_primitives::{FieldElement, SemaphoreCircuitInput};
use semaphore_proof::{ProofError, Prover, SemaphoreVerifyingKey, Verifier};

use crate::circuit::ToyCircuit;

/// Computes the public signals the Semaphore circuit derives from `input`.
#[must_use]
pub fn expected_public_signals(input: &SemaphoreCircuitInput) -> [Fr; 4] {
    let leaf = semaphore_poseidon::hash2(*input.identity_nullifier, *input.identity_trapdoor);
    let root = input
        .tree_siblings
        .iter()
        .zip(&input.tree_path_indices)
        .fold(leaf, |node, (sibling, index)| {
            if *index == FieldElement::ZERO {
                semaphore_poseidon::hash2(node, **sibling)
            } else {
                semaphore_poseidon::hash2(**sibling, node)
            }
        });
    let nullifier_hash =
        semaphore_poseidon::hash2(*input.external_nullifier, *input.identity_nullifier);
    [
        root,
        nullifier_hash,
        *input.signal_hash,
        *input.external_nullifier,
    ]
}

/// An in-process Groth16 backend over [`ToyCircuit`] that computes the same public signals as
/// the Semaphore circuit.
#[derive(Clone)]
pub struct ToyBackend {
    pk: ProvingKey<Bn254>,
    pvk: PreparedVerifyingKey<Bn254>,
}

impl ToyBackend {
    /// Runs a circuit specific setup.
    ///
    /// # Panics
    /// If the setup fails, which does not happen for [`ToyCircuit`].
    pub fn setup<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(ToyCircuit::blank(), rng)
            .expect("toy circuit setup succeeds");
        let pvk = Groth16::<Bn254>::process_vk(&vk).expect("toy verifying key is valid");
        Self { pk, pvk }
    }

    /// The verifying key of the toy circuit.
    ///
    /// # Panics
    /// Never; the toy circuit has the four public inputs of the Semaphore circuit.
    #[must_use]
    pub fn verifying_key(&self) -> SemaphoreVerifyingKey {
        SemaphoreVerifyingKey::new(self.pvk.vk.clone()).expect("toy circuit has four public inputs")
    }
}

impl Prover for ToyBackend {
    fn prove<R: Rng + CryptoRng>(
        &self,
        input: &SemaphoreCircuitInput,
        rng: &mut R,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), ProofError> {
        let public = expected_public_signals(input);
        let circuit = ToyCircuit {
            public,
            identity_nullifier: *input.identity_nullifier,
        };
        let proof = Groth16::<Bn254>::prove(&self.pk, circuit, rng)
            .map_err(|e| ProofError::Prover(e.to_string()))?;
        Ok((proof, public.to_vec()))
    }
}

impl Verifier for ToyBackend {
    fn verify(&self, proof: &Proof<Bn254>, public_inputs: &[Fr]) -> Result<bool, ProofError> {
        self.pvk.verify(proof, public_inputs)
    }
}

/// A prover whose proving key belongs to another circuit: it proves fine but reports a
/// different signal hash than it was given.
pub struct MismatchedBackend(pub ToyBackend);

impl Prover for MismatchedBackend {
    fn prove<R: Rng + CryptoRng>(
        &self,
        input: &SemaphoreCircuitInput,
        rng: &mut R,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), ProofError> {
        let (proof, mut public) = self.0.prove(input, rng)?;
        public[2] += Fr::ONE;
        Ok((proof, public))
    }
}

/// A prover that always fails.
pub struct FailingBackend;

impl Prover for FailingBackend {
    fn prove<R: Rng + CryptoRng>(
        &self,
        _input: &SemaphoreCircuitInput,
        _rng: &mut R,
    ) -> Result<(Proof<Bn254>, Vec<Fr>), ProofError> {
        Err(ProofError::Prover("witness generation failed".to_owned()))
    }
}

impl std::fmt::Debug for ToyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToyBackend").finish_non_exhaustive()
    }
}
