use std::sync::Arc;

use ark_ff::PrimeField;

use crate::{POSEIDON_BN254_T2_PARAMS, POSEIDON_BN254_T3_PARAMS, PoseidonParams};

/// The Poseidon permutation with state width `T` and S-box `x^5`.
///
/// This is the original Poseidon construction (not Poseidon2) with the round structure used by
/// circomlib: every round adds its constants to the full state, full rounds apply the S-box to
/// every element, partial rounds only to the first element, and every round ends with the MDS
/// multiplication.
#[derive(Clone, Debug)]
pub struct Poseidon<F: PrimeField, const T: usize> {
    params: Arc<PoseidonParams<F, T>>,
}

impl<F: PrimeField, const T: usize> Poseidon<F, T> {
    /// Creates a new instance of the permutation with the given parameters.
    pub const fn new(params: Arc<PoseidonParams<F, T>>) -> Self {
        Self { params }
    }

    /// The parameters of this instance.
    pub fn params(&self) -> &PoseidonParams<F, T> {
        &self.params
    }

    /// Applies the permutation to `input` and returns the new state.
    pub fn permutation(&self, input: &[F; T]) -> [F; T] {
        let mut state = *input;
        self.permutation_in_place(&mut state);
        state
    }

    /// Applies the permutation in place.
    pub fn permutation_in_place(&self, state: &mut [F; T]) {
        let half_f = self.params.rounds_f / 2;
        let partial_end = half_f + self.params.rounds_p;

        for (round, constants) in self.params.round_constants.iter().enumerate() {
            for (s, c) in state.iter_mut().zip(constants) {
                *s += c;
            }
            if round < half_f || round >= partial_end {
                state.iter_mut().for_each(Self::sbox);
            } else {
                Self::sbox(&mut state[0]);
            }
            self.matmul_mds(state);
        }
    }

    #[inline(always)]
    fn sbox(x: &mut F) {
        let x2 = x.square();
        let x4 = x2.square();
        *x *= x4;
    }

    fn matmul_mds(&self, state: &mut [F; T]) {
        let mut result = [F::ZERO; T];
        for (out, row) in result.iter_mut().zip(&self.params.mds) {
            for (m, s) in row.iter().zip(state.iter()) {
                *out += *m * s;
            }
        }
        *state = result;
    }
}

impl Default for Poseidon<ark_bn254::Fr, 2> {
    fn default() -> Self {
        Self::new(Arc::clone(&POSEIDON_BN254_T2_PARAMS))
    }
}

impl Default for Poseidon<ark_bn254::Fr, 3> {
    fn default() -> Self {
        Self::new(Arc::clone(&POSEIDON_BN254_T3_PARAMS))
    }
}
