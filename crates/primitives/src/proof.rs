use std::{fmt, str::FromStr, sync::LazyLock};

use ark_bn254::{Bn254, Fq, Fq2, G1Affine, G2Affine};
use ark_ec::short_weierstrass::SWCurveConfig;
use ark_ff::{BigInt, Field, PrimeField, Zero};
use ark_groth16::Proof;
use ruint::aliases::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

use crate::{PrimitiveError, parse_canonical_uint, serde_utils::hex_bytes};

/// The byte length of a [`PackedProof`].
pub const PACKED_PROOF_LEN: usize = 256;

/// The byte length of a [`CompressedProof`].
pub const COMPRESSED_PROOF_LEN: usize = 128;

type G1Text = [String; 2];
type G2Text = [[String; 2]; 2];

/// A Groth16 proof over BN254.
///
/// The text form is the JSON array
/// `[[a.x, a.y], [[b.x.c1, b.x.c0], [b.y.c1, b.y.c0]], [c.x, c.y]]` with every coordinate in
/// canonical `0x` hex (decimal is accepted when parsing). `G2` coordinates use the Ethereum
/// order, imaginary part first, and `[0x0, 0x0]` is the point at infinity. Parsing checks that
/// every point is on its curve and in the prime order subgroup.
#[derive(Clone, Debug, PartialEq)]
pub struct Groth16Proof(Proof<Bn254>);

impl Groth16Proof {
    /// The wrapped arkworks proof.
    #[must_use]
    pub const fn inner(&self) -> &Proof<Bn254> {
        &self.0
    }

    /// Packs the proof into the 8-word layout used by the Solidity verifier.
    #[must_use]
    pub fn pack(&self) -> PackedProof {
        PackedProof::from(self)
    }

    /// Compresses the proof into the 4-word layout accepted by the compressed Solidity verifier.
    ///
    /// # Errors
    /// Returns an error if a point has no square root representation, which does not happen for
    /// points on the curve.
    pub fn compress(&self) -> Result<CompressedProof, PrimitiveError> {
        let no_root = || PrimitiveError::InvalidCurvePoint("point cannot be compressed".to_string());
        let a = compress_g1(&self.0.a).ok_or_else(no_root)?;
        let (b0, b1) = compress_g2(&self.0.b).ok_or_else(no_root)?;
        let c = compress_g1(&self.0.c).ok_or_else(no_root)?;
        Ok(CompressedProof::from_words([a, b0, b1, c]))
    }

    fn to_text(&self) -> (G1Text, G2Text, G1Text) {
        let (bx, by) = g2_coordinates(&self.0.b);
        (
            g1_coordinates(&self.0.a).map(|c| fq_to_text(&c)),
            [
                [fq_to_text(&bx.c1), fq_to_text(&bx.c0)],
                [fq_to_text(&by.c1), fq_to_text(&by.c0)],
            ],
            g1_coordinates(&self.0.c).map(|c| fq_to_text(&c)),
        )
    }

    fn from_text((a, b, c): &(G1Text, G2Text, G1Text)) -> Result<Self, PrimitiveError> {
        let a = g1_from_coordinates(fq_from_text(&a[0])?, fq_from_text(&a[1])?)?;
        let bx = Fq2::new(fq_from_text(&b[0][1])?, fq_from_text(&b[0][0])?);
        let by = Fq2::new(fq_from_text(&b[1][1])?, fq_from_text(&b[1][0])?);
        let b = g2_from_coordinates(bx, by)?;
        let c = g1_from_coordinates(fq_from_text(&c[0])?, fq_from_text(&c[1])?)?;
        Ok(Self(Proof { a, b, c }))
    }
}

impl From<Proof<Bn254>> for Groth16Proof {
    fn from(value: Proof<Bn254>) -> Self {
        Self(value)
    }
}

impl From<Groth16Proof> for Proof<Bn254> {
    fn from(value: Groth16Proof) -> Self {
        value.0
    }
}

impl fmt::Display for Groth16Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&self.to_text()).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Groth16Proof {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: (G1Text, G2Text, G1Text) = serde_json::from_str(s)
            .map_err(|e| PrimitiveError::Deserialization(format!("invalid proof: {e}")))?;
        Self::from_text(&text)
    }
}

impl Serialize for Groth16Proof {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_text().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Groth16Proof {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = <(G1Text, G2Text, G1Text)>::deserialize(deserializer)?;
        Self::from_text(&text).map_err(D::Error::custom)
    }
}

/// A Groth16 proof packed as eight 32-byte big-endian words:
/// `a.x, a.y, b.x.c1, b.x.c0, b.y.c1, b.y.c0, c.x, c.y`.
///
/// This is the calldata layout of the Solidity verifier. The text form is `0x` followed by 512
/// hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedProof(pub [u8; PACKED_PROOF_LEN]);

impl PackedProof {
    /// Builds a packed proof from exactly [`PACKED_PROOF_LEN`] bytes.
    ///
    /// # Errors
    /// Returns an error if the slice has the wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        let bytes: [u8; PACKED_PROOF_LEN] =
            bytes
                .try_into()
                .map_err(|_| PrimitiveError::InvalidInput {
                    attribute: "packed_proof".to_string(),
                    reason: format!("expected {PACKED_PROOF_LEN} bytes, got {}", bytes.len()),
                })?;
        Ok(Self(bytes))
    }

    /// The eight words of the packed proof.
    #[must_use]
    pub fn words(&self) -> [U256; 8] {
        std::array::from_fn(|i| {
            let mut word = [0u8; 32];
            word.copy_from_slice(&self.0[i * 32..(i + 1) * 32]);
            U256::from_be_bytes(word)
        })
    }

    /// Unpacks and validates the proof points.
    ///
    /// # Errors
    /// Returns an error if a coordinate is not a canonical base field element or a point is not
    /// on its curve or not in the prime order subgroup.
    pub fn unpack(&self) -> Result<Groth16Proof, PrimitiveError> {
        let [ax, ay, bx1, bx0, by1, by0, cx, cy] = self.words().map(fq_from_u256);
        let a = g1_from_coordinates(ax?, ay?)?;
        let b = g2_from_coordinates(Fq2::new(bx0?, bx1?), Fq2::new(by0?, by1?))?;
        let c = g1_from_coordinates(cx?, cy?)?;
        Ok(Groth16Proof(Proof { a, b, c }))
    }
}

impl From<&Groth16Proof> for PackedProof {
    fn from(proof: &Groth16Proof) -> Self {
        let [ax, ay] = g1_coordinates(&proof.0.a);
        let (bx, by) = g2_coordinates(&proof.0.b);
        let [cx, cy] = g1_coordinates(&proof.0.c);
        let mut bytes = [0u8; PACKED_PROOF_LEN];
        for (chunk, coordinate) in bytes
            .chunks_exact_mut(32)
            .zip([ax, ay, bx.c1, bx.c0, by.c1, by.c0, cx, cy])
        {
            chunk.copy_from_slice(&fq_to_u256(&coordinate).to_be_bytes::<32>());
        }
        Self(bytes)
    }
}

impl fmt::Display for PackedProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for PackedProof {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_str = s
            .strip_prefix("0x")
            .ok_or_else(|| PrimitiveError::Deserialization("expected 0x prefix".to_string()))?;
        let bytes = hex::decode(hex_str)
            .map_err(|e| PrimitiveError::Deserialization(format!("Invalid hex encoding: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for PackedProof {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex_bytes::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for PackedProof {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = hex_bytes::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(D::Error::custom)
    }
}

/// A Groth16 proof compressed into four 32-byte big-endian words: `a`, the two words of `b`
/// and `c`.
///
/// A `G1` point is stored as `x << 1 | sign` and a `G2` point as
/// `(x.c0 << 2 | hint << 1 | sign, x.c1)`, where `sign` selects between the two square roots
/// and `hint` tells the decompressor which root of the norm to use. Zero words encode the point
/// at infinity. The text form is `0x` followed by 256 hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressedProof(pub [u8; COMPRESSED_PROOF_LEN]);

impl CompressedProof {
    /// Builds a compressed proof from exactly [`COMPRESSED_PROOF_LEN`] bytes.
    ///
    /// # Errors
    /// Returns an error if the slice has the wrong length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        let bytes: [u8; COMPRESSED_PROOF_LEN] =
            bytes
                .try_into()
                .map_err(|_| PrimitiveError::InvalidInput {
                    attribute: "compressed_proof".to_string(),
                    reason: format!("expected {COMPRESSED_PROOF_LEN} bytes, got {}", bytes.len()),
                })?;
        Ok(Self(bytes))
    }

    /// Builds a compressed proof from its four words.
    #[must_use]
    pub fn from_words(words: [U256; 4]) -> Self {
        let mut bytes = [0u8; COMPRESSED_PROOF_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(32).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes::<32>());
        }
        Self(bytes)
    }

    /// The four words of the compressed proof.
    #[must_use]
    pub fn words(&self) -> [U256; 4] {
        std::array::from_fn(|i| {
            let mut word = [0u8; 32];
            word.copy_from_slice(&self.0[i * 32..(i + 1) * 32]);
            U256::from_be_bytes(word)
        })
    }

    /// Recovers the proof points.
    ///
    /// # Errors
    /// Returns an error if a word does not encode a point of the right group.
    pub fn decompress(&self) -> Result<Groth16Proof, PrimitiveError> {
        let [a, b0, b1, c] = self.words();
        Ok(Groth16Proof(Proof {
            a: decompress_g1(a)?,
            b: decompress_g2(b0, b1)?,
            c: decompress_g1(c)?,
        }))
    }
}

impl fmt::Display for CompressedProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for CompressedProof {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex_str = s
            .strip_prefix("0x")
            .ok_or_else(|| PrimitiveError::Deserialization("expected 0x prefix".to_string()))?;
        let bytes = hex::decode(hex_str)
            .map_err(|e| PrimitiveError::Deserialization(format!("Invalid hex encoding: {e}")))?;
        Self::from_bytes(&bytes)
    }
}

impl Serialize for CompressedProof {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        hex_bytes::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for CompressedProof {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = hex_bytes::deserialize(deserializer)?;
        Self::from_bytes(&bytes).map_err(D::Error::custom)
    }
}

/// `(p + 1) / 4` for the base field modulus `p`.
static SQRT_EXPONENT: LazyLock<[u64; 4]> = LazyLock::new(|| {
    let modulus = U256::from_limbs(Fq::MODULUS.0);
    let exponent: U256 = (modulus + U256::from(1u64)).wrapping_shr(2);
    exponent.into_limbs()
});

/// The square root `a^((p + 1) / 4)`, the root the verifier contract recomputes. `p = 3 mod 4`.
fn sqrt_fq(a: Fq) -> Option<Fq> {
    let root = a.pow(*SQRT_EXPONENT);
    (root.square() == a).then_some(root)
}

/// The square root in `Fq2` picked by the verifier contract for the given hint.
fn sqrt_fq2(a: Fq2, hint: bool) -> Option<Fq2> {
    let mut norm_root = sqrt_fq(a.c0.square() + a.c1.square())?;
    if hint {
        norm_root = -norm_root;
    }
    let half = Fq::from(2u64).inverse()?;
    let x0 = sqrt_fq((a.c0 + norm_root) * half)?;
    let x1 = a.c1 * (x0 + x0).inverse()?;
    let root = Fq2::new(x0, x1);
    (root.square() == a).then_some(root)
}

fn g1_y_squared(x: Fq) -> Fq {
    x.square() * x + ark_bn254::g1::Config::COEFF_B
}

fn g2_y_squared(x: Fq2) -> Fq2 {
    x.square() * x + ark_bn254::g2::Config::COEFF_B
}

fn compress_g1(point: &G1Affine) -> Option<U256> {
    if point.infinity {
        return Some(U256::ZERO);
    }
    let root = sqrt_fq(g1_y_squared(point.x))?;
    let x: U256 = fq_to_u256(&point.x).wrapping_shl(1);
    if point.y == root {
        Some(x)
    } else if point.y == -root {
        Some(x | U256::from(1u64))
    } else {
        None
    }
}

fn decompress_g1(word: U256) -> Result<G1Affine, PrimitiveError> {
    if word.is_zero() {
        return Ok(G1Affine::identity());
    }
    let x = fq_from_u256(word.wrapping_shr(1))?;
    let mut y = sqrt_fq(g1_y_squared(x)).ok_or_else(|| {
        PrimitiveError::InvalidCurvePoint("compressed G1 point is not on the curve".to_string())
    })?;
    if word.bit(0) {
        y = -y;
    }
    g1_from_coordinates(x, y)
}

fn compress_g2(point: &G2Affine) -> Option<(U256, U256)> {
    if point.infinity {
        return Some((U256::ZERO, U256::ZERO));
    }
    let y_squared = g2_y_squared(point.x);
    let norm_root = sqrt_fq(y_squared.c0.square() + y_squared.c1.square())?;
    let half = Fq::from(2u64).inverse()?;
    let hint = sqrt_fq((y_squared.c0 + norm_root) * half).is_none();
    let root = sqrt_fq2(y_squared, hint)?;

    let mut head: U256 = fq_to_u256(&point.x.c0).wrapping_shl(2);
    if hint {
        head |= U256::from(2u64);
    }
    if point.y == root {
        Some((head, fq_to_u256(&point.x.c1)))
    } else if point.y == -root {
        Some((head | U256::from(1u64), fq_to_u256(&point.x.c1)))
    } else {
        None
    }
}

fn decompress_g2(head: U256, x1: U256) -> Result<G2Affine, PrimitiveError> {
    if head.is_zero() && x1.is_zero() {
        return Ok(G2Affine::identity());
    }
    let x = Fq2::new(fq_from_u256(head.wrapping_shr(2))?, fq_from_u256(x1)?);
    let mut y = sqrt_fq2(g2_y_squared(x), head.bit(1)).ok_or_else(|| {
        PrimitiveError::InvalidCurvePoint("compressed G2 point is not on the curve".to_string())
    })?;
    if head.bit(0) {
        y = -y;
    }
    g2_from_coordinates(x, y)
}

fn fq_to_u256(value: &Fq) -> U256 {
    U256::from_limbs(value.into_bigint().0)
}

fn fq_from_u256(value: U256) -> Result<Fq, PrimitiveError> {
    Fq::from_bigint(BigInt(value.into_limbs())).ok_or_else(|| {
        PrimitiveError::InvalidCurvePoint("coordinate is not in the base field".to_string())
    })
}

fn fq_to_text(value: &Fq) -> String {
    format!("{:#x}", fq_to_u256(value))
}

fn fq_from_text(value: &str) -> Result<Fq, PrimitiveError> {
    fq_from_u256(parse_canonical_uint(value)?)
}

/// Affine coordinates with the point at infinity mapped to `(0, 0)`.
fn g1_coordinates(point: &G1Affine) -> [Fq; 2] {
    if point.infinity {
        [Fq::zero(); 2]
    } else {
        [point.x, point.y]
    }
}

fn g2_coordinates(point: &G2Affine) -> (Fq2, Fq2) {
    if point.infinity {
        (Fq2::zero(), Fq2::zero())
    } else {
        (point.x, point.y)
    }
}

fn g1_from_coordinates(x: Fq, y: Fq) -> Result<G1Affine, PrimitiveError> {
    if x.is_zero() && y.is_zero() {
        return Ok(G1Affine::identity());
    }
    let point = G1Affine::new_unchecked(x, y);
    if !point.is_on_curve() {
        return Err(PrimitiveError::InvalidCurvePoint(
            "G1 point is not on the curve".to_string(),
        ));
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(PrimitiveError::InvalidCurvePoint(
            "G1 point is not in the prime order subgroup".to_string(),
        ));
    }
    Ok(point)
}

fn g2_from_coordinates(x: Fq2, y: Fq2) -> Result<G2Affine, PrimitiveError> {
    if x.is_zero() && y.is_zero() {
        return Ok(G2Affine::identity());
    }
    let point = G2Affine::new_unchecked(x, y);
    if !point.is_on_curve() {
        return Err(PrimitiveError::InvalidCurvePoint(
            "G2 point is not on the curve".to_string(),
        ));
    }
    if !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(PrimitiveError::InvalidCurvePoint(
            "G2 point is not in the prime order subgroup".to_string(),
        ));
    }
    Ok(point)
}
