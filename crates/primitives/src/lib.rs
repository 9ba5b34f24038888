//! This crate contains the base types for the Semaphore protocol.
//!
//! It implements the field element wrapper and its canonical text encoding, the hash-to-field
//! rule for caller supplied bytes, Merkle proofs, the proof encodings and the raw circuit
//! inputs. Proving, trees and identities live in the crates built on top of this one.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(clippy::all, clippy::nursery, missing_docs, dead_code)]
#![allow(clippy::option_if_let_else)]

use ark_bn254::Fr;
use ark_ff::{AdditiveGroup, BigInt, Field, PrimeField, UniformRand};
use ruint::aliases::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;
use std::{
    fmt,
    ops::{Add, Deref, Mul, Neg, Sub},
    str::FromStr,
};

/// Contains the configuration for provers and verifiers.
mod config;
pub use config::{Config, DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH, MIN_TREE_DEPTH};

/// Contains the raw circuit input type for the Semaphore circuit.
///
/// This type is used to prepare the inputs for the Groth16 prover.
pub mod circuit_inputs;
pub use circuit_inputs::SemaphoreCircuitInput;

/// Contains base types for operations with Merkle trees.
pub mod merkle;
pub use merkle::{Branch, MerkleProof};

/// Contains the Groth16 proof type and its text and packed encodings.
pub mod proof;
pub use proof::{CompressedProof, Groth16Proof, PackedProof};

pub mod serde_utils;

/// The scalar field of BN254, used by the hash, the tree and the public inputs of the circuit.
pub type ScalarField = ark_bn254::Fr;

/// Represents an element of the BN254 scalar field (`Fr`).
///
/// Values are always reduced. The string encoding is canonical: `Display` renders `0x`-prefixed
/// lowercase hex without leading zeros, and `FromStr` accepts decimal or `0x`-prefixed hex and
/// rejects anything that is not the unique shortest spelling of a value in the field.
/// Binary serde formats use the 32-byte big-endian encoding.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldElement(Fr);

impl FieldElement {
    /// The additive identity of the field.
    pub const ZERO: Self = Self(Fr::ZERO);
    /// The multiplicative identity of the field.
    pub const ONE: Self = Self(Fr::ONE);

    /// Returns the 32-byte big-endian representation of this field element.
    #[must_use]
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let num: U256 = (*self).into();
        num.to_be_bytes()
    }

    /// Constructs a field element from a 32-byte big-endian representation.
    ///
    /// Unlike `from_be_bytes_mod_order`, this rejects values >= the field modulus.
    ///
    /// # Errors
    /// Returns [`PrimitiveError::NotInField`] if the value is >= the field modulus.
    pub fn from_be_bytes(be_bytes: &[u8; 32]) -> Result<Self, PrimitiveError> {
        U256::from_be_bytes(*be_bytes).try_into()
    }

    /// Deserializes a field element from a big-endian byte slice of any length.
    ///
    /// # Warning
    /// This performs modulo reduction on the input. Only use it where reduction is intended,
    /// e.g. wide reduction of hash output into the field.
    #[must_use]
    pub fn from_be_bytes_mod_order(bytes: &[u8]) -> Self {
        Self(Fr::from_be_bytes_mod_order(bytes))
    }

    /// Takes arbitrary raw bytes, hashes them with Keccak-256 and drops the lowest byte so
    /// that the result fits in the field.
    ///
    /// This is the rule the Semaphore circuits expect for signals and external nullifiers.
    #[must_use]
    pub fn from_arbitrary_raw_bytes(bytes: &[u8]) -> Self {
        let output: [u8; 32] = Keccak256::digest(bytes).into();

        // Shift right one byte to make it fit in the field
        let n: U256 = U256::from_be_bytes(output) >> 8;

        // n < 2^248 < r, so the reduction is the identity.
        Self::from_be_bytes_mod_order(&n.to_be_bytes::<32>())
    }

    /// Generates a random field element.
    #[must_use]
    pub fn random<R: rand::CryptoRng + rand::RngCore>(rng: &mut R) -> Self {
        Self(Fr::rand(rng))
    }

    /// Computes the multiplicative inverse.
    ///
    /// # Errors
    /// Returns [`PrimitiveError::DivisionByZero`] for zero.
    pub fn inverse(&self) -> Result<Self, PrimitiveError> {
        self.0.inverse().map(Self).ok_or(PrimitiveError::DivisionByZero)
    }

    /// Computes the square.
    #[must_use]
    pub fn square(&self) -> Self {
        Self(self.0.square())
    }

    /// Returns the inner field element.
    #[must_use]
    pub const fn into_inner(self) -> Fr {
        self.0
    }
}

/// Hashes caller supplied bytes (a signal or an external nullifier) into the field.
///
/// See [`FieldElement::from_arbitrary_raw_bytes`].
#[must_use]
pub fn hash_to_field(bytes: &[u8]) -> FieldElement {
    FieldElement::from_arbitrary_raw_bytes(bytes)
}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Deref for FieldElement {
    type Target = Fr;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

macro_rules! impl_field_op {
    ($trait:ident, $method:ident) => {
        impl $trait for FieldElement {
            type Output = Self;
            fn $method(self, rhs: Self) -> Self {
                Self(self.0.$method(rhs.0))
            }
        }
    };
}

impl_field_op!(Add, add);
impl_field_op!(Sub, sub);
impl_field_op!(Mul, mul);

impl Neg for FieldElement {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl FromStr for FieldElement {
    type Err = PrimitiveError;

    /// Parses a field element from its canonical decimal or `0x`-prefixed hex spelling.
    ///
    /// Signs, whitespace and leading zeros are rejected, as are values >= the field modulus.
    /// This keeps the text form of every value unique.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(parse_canonical_uint(s)?)
    }
}

/// Parses the canonical decimal or `0x`-prefixed hex spelling of a 256-bit unsigned integer.
pub(crate) fn parse_canonical_uint(s: &str) -> Result<U256, PrimitiveError> {
    let (digits, radix) = match s.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    if digits.is_empty() {
        return Err(PrimitiveError::InvalidFieldElement(format!(
            "no digits in {s:?}"
        )));
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(PrimitiveError::InvalidFieldElement(format!(
            "invalid base-{radix} digits in {s:?}"
        )));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(PrimitiveError::NonCanonical(s.to_string()));
    }
    // Only fails on overflow once the digits are known to be valid.
    U256::from_str_radix(digits, u64::from(radix)).map_err(|_| PrimitiveError::NotInField)
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num: U256 = (*self).into();
        write!(f, "{num:#x}")
    }
}

impl fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<Fr> for FieldElement {
    fn from(value: Fr) -> Self {
        Self(value)
    }
}

impl From<FieldElement> for Fr {
    fn from(value: FieldElement) -> Self {
        value.0
    }
}

impl TryFrom<U256> for FieldElement {
    type Error = PrimitiveError;
    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Fr::from_bigint(BigInt(value.into_limbs()))
            .map(Self)
            .ok_or(PrimitiveError::NotInField)
    }
}

impl From<FieldElement> for U256 {
    fn from(value: FieldElement) -> Self {
        Self::from_limbs(value.0.into_bigint().0)
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self(Fr::from(value))
    }
}

impl From<u128> for FieldElement {
    fn from(value: u128) -> Self {
        Self(Fr::from(value))
    }
}

impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.to_be_bytes())
        }
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_str(&s).map_err(D::Error::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            let bytes: [u8; 32] = bytes
                .try_into()
                .map_err(|_| D::Error::custom("expected 32 bytes"))?;
            Self::from_be_bytes(&bytes).map_err(D::Error::custom)
        }
    }
}

/// Generic errors that may occur with basic parsing, serialization and deserialization.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Error that occurs when serializing a value. Generally not expected.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error that occurs when deserializing a value.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// The text is not a decimal or `0x` hex number.
    #[error("Invalid field element: {0}")]
    InvalidFieldElement(String),
    /// The text is a valid number but not its canonical spelling.
    #[error("Non-canonical field element encoding: {0:?}")]
    NonCanonical(String),
    /// Number is equal or larger than the target field modulus.
    #[error("Provided value is not in the field")]
    NotInField,
    /// Inversion of zero.
    #[error("Division by zero")]
    DivisionByZero,
    /// A curve point is malformed, not on the curve or not in the prime order subgroup.
    #[error("Invalid curve point: {0}")]
    InvalidCurvePoint(String),
    /// Invalid input provided (e.g., incorrect length, format, etc.)
    #[error("Invalid input at {attribute}: {reason}")]
    InvalidInput {
        /// The attribute that is invalid
        attribute: String,
        /// The reason the input is invalid
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruint::uint;

    const MODULUS_DEC: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";

    #[test]
    fn test_field_element_encoding() {
        let root = FieldElement::try_from(uint!(
            0x11d223ce7b91ac212f42cf50f0a3439ae3fcdba4ea32acb7f194d1051ed324c2_U256
        ))
        .unwrap();

        assert_eq!(
            serde_json::to_string(&root).unwrap(),
            "\"0x11d223ce7b91ac212f42cf50f0a3439ae3fcdba4ea32acb7f194d1051ed324c2\""
        );
        assert_eq!(serde_json::to_string(&FieldElement::ONE).unwrap(), "\"0x1\"");
        assert_eq!(FieldElement::ZERO.to_string(), "0x0");
        assert_eq!(FieldElement::from(42u64).to_string(), "0x2a");
        assert_eq!(*FieldElement::ONE, Fr::ONE);
    }

    #[test]
    fn test_parses_decimal_and_hex() {
        assert_eq!(FieldElement::from_str("0").unwrap(), FieldElement::ZERO);
        assert_eq!(FieldElement::from_str("0x0").unwrap(), FieldElement::ZERO);
        assert_eq!(
            FieldElement::from_str("42").unwrap(),
            FieldElement::from(42u64)
        );
        assert_eq!(
            FieldElement::from_str("0x2a").unwrap(),
            FieldElement::from(42u64)
        );
        assert_eq!(
            FieldElement::from_str("0x2A").unwrap(),
            FieldElement::from(42u64)
        );
    }

    #[test]
    fn test_rejects_non_canonical_text() {
        for input in ["007", "0x007", "00", "0x00"] {
            assert!(
                matches!(
                    FieldElement::from_str(input),
                    Err(PrimitiveError::NonCanonical(_))
                ),
                "{input} must be rejected"
            );
        }
        for input in ["", "0x", "+1", "-1", " 1", "1 ", "0X1", "1e3", "0xg"] {
            assert!(
                matches!(
                    FieldElement::from_str(input),
                    Err(PrimitiveError::InvalidFieldElement(_))
                ),
                "{input:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_debug_uses_canonical_text() {
        let value = FieldElement::from(0x2au64);
        assert_eq!(format!("{value:?}"), "0x2a");
        assert_eq!(format!("{:?}", [FieldElement::ZERO]), "[0x0]");
    }

    #[test]
    fn test_rejects_values_outside_the_field() {
        assert_eq!(
            FieldElement::from_str(MODULUS_DEC),
            Err(PrimitiveError::NotInField)
        );
        // 2^256 does not even fit the intermediate integer.
        assert_eq!(
            FieldElement::from_str(
                "0x10000000000000000000000000000000000000000000000000000000000000000"
            ),
            Err(PrimitiveError::NotInField)
        );
        let max = FieldElement::from_str(
            "21888242871839275222246405745257275088548364400416034343698204186575808495616",
        )
        .unwrap();
        assert_eq!(max, -FieldElement::ONE);
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        let fe = FieldElement::try_from(uint!(
            0x011d223ce7b91ac212f42cf50f0a3439ae3fcdba4ea32acb7f194d1051ed324c_U256
        ))
        .unwrap();
        let s = fe.to_string();
        assert!(s.starts_with("0x11d2"));
        assert_eq!(FieldElement::from_str(&s).unwrap(), fe);
    }

    #[test]
    fn test_field_element_cbor_encoding_roundtrip() {
        let root = FieldElement::try_from(uint!(
            0x11d223ce7b91ac212f42cf50f0a3439ae3fcdba4ea32acb7f194d1051ed324c2_U256
        ))
        .unwrap();

        let mut buffer = Vec::new();
        ciborium::into_writer(&root, &mut buffer).unwrap();
        assert_eq!(buffer.len(), 34); // CBOR header (2 bytes) + field element (32 bytes)

        let decoded: FieldElement = ciborium::from_reader(&buffer[..]).unwrap();
        assert_eq!(root, decoded);
    }

    #[test]
    fn test_from_be_bytes_rejects_value_above_modulus() {
        let bytes = [0xFF; 32];
        assert_eq!(
            FieldElement::from_be_bytes(&bytes),
            Err(PrimitiveError::NotInField)
        );
    }

    #[test]
    fn test_to_be_bytes_is_big_endian() {
        let bytes = FieldElement::from(256u64).to_be_bytes();
        assert_eq!(bytes[30], 1);
        assert_eq!(bytes[31], 0);
        assert_eq!(
            FieldElement::from_be_bytes(&bytes).unwrap(),
            FieldElement::from(256u64)
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = FieldElement::from(7u64);
        let b = FieldElement::from(5u64);
        assert_eq!(a + b, FieldElement::from(12u64));
        assert_eq!(a - b, FieldElement::from(2u64));
        assert_eq!(b - a, -FieldElement::from(2u64));
        assert_eq!(a * b, FieldElement::from(35u64));
        assert_eq!(a.square(), FieldElement::from(49u64));
        assert_eq!(a * a.inverse().unwrap(), FieldElement::ONE);
        assert_eq!(
            FieldElement::ZERO.inverse(),
            Err(PrimitiveError::DivisionByZero)
        );
    }

    #[test]
    fn test_hash_to_field() {
        // keccak256("hello") >> 8
        assert_eq!(
            hash_to_field(b"hello").to_string(),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36dea"
        );
        assert_eq!(
            hash_to_field(b"vote-42").to_string(),
            "0x9d8ee69f8104fc502f5729ac3c7c246da488a4659fda49053a222d1be2f4fb"
        );
        assert_eq!(hash_to_field(b"hello").to_be_bytes()[0], 0);
    }
}
