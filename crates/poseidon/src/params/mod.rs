use ark_ff::PrimeField;

use crate::field_from_hex_string;

pub mod bn254_t2;
pub mod bn254_t3;

/// The parameters of a Poseidon permutation with state width `T`.
#[derive(Clone, Debug)]
pub struct PoseidonParams<F: PrimeField, const T: usize> {
    /// Number of full rounds, split evenly before and after the partial rounds.
    pub rounds_f: usize,
    /// Number of partial rounds.
    pub rounds_p: usize,
    /// The MDS matrix, row major.
    pub mds: [[F; T]; T],
    /// One row of round constants per round (`rounds_f + rounds_p` rows).
    pub round_constants: Vec<[F; T]>,
}

impl<F: PrimeField, const T: usize> PoseidonParams<F, T> {
    /// Creates a new parameter set.
    ///
    /// # Panics
    /// Panics if `rounds_f` is odd or if the number of round constant rows does not match the
    /// number of rounds.
    pub fn new(rounds_f: usize, rounds_p: usize, mds: [[F; T]; T], round_constants: Vec<[F; T]>) -> Self {
        assert!(rounds_f % 2 == 0, "full rounds must be even");
        assert_eq!(round_constants.len(), rounds_f + rounds_p);
        Self {
            rounds_f,
            rounds_p,
            mds,
            round_constants,
        }
    }

    /// Builds a parameter set from hard-coded hex constants.
    ///
    /// Only used for the constant tables in this crate, which are known to be valid field elements.
    pub(crate) fn from_hex(
        rounds_f: usize,
        rounds_p: usize,
        mds: &[[&str; T]; T],
        round_constants: &[[&str; T]],
    ) -> Self {
        let parse = |s: &str| -> F {
            field_from_hex_string(s).expect("constant tables contain valid hex field elements")
        };
        let mds = mds.map(|row| row.map(parse));
        let round_constants = round_constants
            .iter()
            .map(|row| row.map(parse))
            .collect();
        Self::new(rounds_f, rounds_p, mds, round_constants)
    }

    /// Total number of rounds.
    pub const fn rounds(&self) -> usize {
        self.rounds_f + self.rounds_p
    }
}
