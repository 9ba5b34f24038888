//! The circom-compatible Poseidon permutation over the BN254 scalar field.
//!
//! The width-3 instance backs [`hash2`], the 2-to-1 compression used for identity commitments,
//! nullifier hashes and Merkle tree nodes. The width-2 instance backs [`hash1`].
#![deny(missing_docs)]

mod params;
mod poseidon;

pub use params::PoseidonParams;
pub use params::{bn254_t2::POSEIDON_BN254_T2_PARAMS, bn254_t3::POSEIDON_BN254_T3_PARAMS};
pub use poseidon::Poseidon;

use ark_bn254::Fr;
use ark_ff::{AdditiveGroup, PrimeField};
use num_bigint::{BigUint, ParseBigIntError};
use num_traits::Num;

/// Reads a field element from a hexadecimal string, with or without the `0x` prefix.
///
/// Values are reduced modulo the field order.
pub fn field_from_hex_string<F: PrimeField>(str: &str) -> Result<F, ParseBigIntError> {
    let tmp = match str.strip_prefix("0x") {
        Some(t) => BigUint::from_str_radix(t, 16),
        None => BigUint::from_str_radix(str, 16),
    };

    Ok(tmp?.into())
}

/// Compresses two field elements into one: the first element of the width-3 permutation of
/// `(0, left, right)`.
pub fn hash2(left: Fr, right: Fr) -> Fr {
    let poseidon = Poseidon::<Fr, 3>::default();
    poseidon.permutation(&[Fr::ZERO, left, right])[0]
}

/// Hashes a single field element: the first element of the width-2 permutation of `(0, input)`.
pub fn hash1(input: Fr) -> Fr {
    let poseidon = Poseidon::<Fr, 2>::default();
    poseidon.permutation(&[Fr::ZERO, input])[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fr(hex: &str) -> Fr {
        field_from_hex_string(hex).unwrap()
    }

    #[test]
    fn hash2_matches_circomlib() {
        assert_eq!(
            hash2(Fr::ZERO, Fr::ZERO),
            fr("0x2098f5fb9e239eab3ceac3f27b81e481dc3124d55ffed523a839ee8446b64864")
        );
        assert_eq!(
            hash2(Fr::from(31213u64), Fr::from(132u64)),
            fr("0x303f59cd0831b5633bcda50514521b33776b5d4280eb5868ba1dbbe2e4d76ab5")
        );
        assert_eq!(
            hash2(Fr::from(1u64), Fr::from(2u64)),
            fr("0x115cc0f5e7d690413df64c6b9662e9cf2a3617f2743245519e19607a4417189a")
        );
        assert_eq!(
            hash2(Fr::from(123u64), Fr::from(456u64)),
            fr("0x2b60bf8caa91452f000be587c441f6495f36def6fc4c36f5cc7b5d673f59fd0f")
        );
    }

    #[test]
    fn hash2_is_not_symmetric() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);
        assert_ne!(hash2(a, b), hash2(b, a));
    }

    #[test]
    fn hash1_matches_circomlib() {
        assert_eq!(
            hash1(Fr::ZERO),
            fr("0x2a09a9fd93c590c26b91effbb2499f07e8f7aa12e2b4940a3aed2411cb65e11c")
        );
        assert_eq!(
            hash1(Fr::from(1u64)),
            fr("0x29176100eaa962bdc1fe6c654d6a3c130e96a4d1168b33848b897dc502820133")
        );
    }

    #[test]
    fn hex_prefix_is_optional() {
        let with: Fr = field_from_hex_string("0x2a").unwrap();
        let without: Fr = field_from_hex_string("2a").unwrap();
        assert_eq!(with, without);
        assert_eq!(with, Fr::from(42u64));
        assert!(field_from_hex_string::<Fr>("0xzz").is_err());
    }
}
