//! Serialization helpers for numeric values that travel as `0x`-prefixed hex strings.

#![allow(clippy::missing_errors_doc)]

use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

/// Serialize/deserialize `u64` as a `0x`-prefixed hex string.
pub mod hex_u64 {
    use super::*;

    /// Serialize a `u64` as a `0x`-prefixed hex string.
    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    /// Deserialize a `u64` from a hex string (with or without `0x` prefix).
    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        u64::from_str_radix(s, 16).map_err(|e| D::Error::custom(format!("invalid hex u64: {e}")))
    }
}

/// Serialize/deserialize byte strings as `0x`-prefixed hex in human-readable formats and as raw
/// bytes otherwise.
pub mod hex_bytes {
    use super::*;

    /// Serialize bytes as a `0x`-prefixed hex string (or raw bytes for binary formats).
    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&format!("0x{}", hex::encode(value)))
        } else {
            serializer.serialize_bytes(value)
        }
    }

    /// Deserialize bytes from a `0x`-prefixed hex string (or raw bytes for binary formats).
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            let s = s
                .strip_prefix("0x")
                .ok_or_else(|| D::Error::custom("expected 0x prefix"))?;
            hex::decode(s).map_err(|e| D::Error::custom(format!("invalid hex bytes: {e}")))
        } else {
            Vec::<u8>::deserialize(deserializer)
        }
    }
}
