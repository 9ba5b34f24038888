use ark_bn254::Fr;
use ark_ff::AdditiveGroup;
use ark_relations::{
    lc,
    r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError},
};

/// A small R1CS circuit with the public input layout of the Semaphore circuit.
///
/// It does not check membership. It enforces
/// `(signal_hash + external_nullifier) * identity_nullifier = binding` for a private `binding`,
/// which is enough for Groth16 to bind every public input to the proof.
#[derive(Clone, Debug)]
pub struct ToyCircuit {
    /// `[root, nullifier_hash, signal_hash, external_nullifier]`.
    pub public: [Fr; 4],
    /// The private identity nullifier.
    pub identity_nullifier: Fr,
}

impl ToyCircuit {
    /// An all-zero instance, used for the setup.
    #[must_use]
    pub const fn blank() -> Self {
        Self {
            public: [Fr::ZERO; 4],
            identity_nullifier: Fr::ZERO,
        }
    }
}

impl ConstraintSynthesizer<Fr> for ToyCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let mut public = Vec::with_capacity(self.public.len());
        for value in self.public {
            public.push(cs.new_input_variable(|| Ok(value))?);
        }
        let nullifier = cs.new_witness_variable(|| Ok(self.identity_nullifier))?;
        let binding = (self.public[2] + self.public[3]) * self.identity_nullifier;
        let binding = cs.new_witness_variable(|| Ok(binding))?;

        cs.enforce_constraint(
            lc!() + public[2] + public[3],
            lc!() + nullifier,
            lc!() + binding,
        )?;
        Ok(())
    }
}
