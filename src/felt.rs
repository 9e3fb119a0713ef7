//! Field element ("felt") word type
//!
//! Every key and data slot of a ledger event is one 256-bit word. Values are carried as
//! `U256` so that two 128-bit halves can be recombined without a second integer type.

use crate::error::DecodeError;
use alloy_primitives::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One opaque 256-bit event word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Felt(U256);

impl Felt {
    pub const ZERO: Felt = Felt(U256::ZERO);

    /// Wrap a raw integer
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Parse a hex string, with or without `0x`
    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 64 {
            return Err(DecodeError::InvalidFelt(s.to_string()));
        }

        U256::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| DecodeError::InvalidFelt(s.to_string()))
    }

    /// Build from up to 32 big-endian bytes
    pub fn from_bytes_be(bytes: &[u8]) -> Option<Self> {
        U256::try_from_be_slice(bytes).map(Self)
    }

    /// Pack an ASCII short string (at most 31 bytes) into a word
    pub fn from_short_string(s: &str) -> Option<Self> {
        if s.len() > 31 {
            return None;
        }
        Self::from_bytes_be(s.as_bytes())
    }

    /// Inner integer
    pub fn value(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Full 32-byte big-endian representation
    pub fn to_bytes_be(&self) -> [u8; 32] {
        self.0.to_be_bytes::<32>()
    }

    /// Number of significant bytes (0 for the zero word)
    pub fn byte_len(&self) -> usize {
        self.0.bit_len().div_ceil(8)
    }

    /// The value as `u64`, if it fits
    pub fn to_u64(&self) -> Option<u64> {
        let limbs = self.0.as_limbs();
        if limbs[1..].iter().all(|limb| *limb == 0) {
            Some(limbs[0])
        } else {
            None
        }
    }

    /// The value as `u128`, if it fits
    pub fn to_u128(&self) -> Option<u128> {
        let limbs = self.0.as_limbs();
        if limbs[2] == 0 && limbs[3] == 0 {
            Some(((limbs[1] as u128) << 64) | limbs[0] as u128)
        } else {
            None
        }
    }
}

impl From<u64> for Felt {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for Felt {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Felt {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for Felt {
    type Err = DecodeError;

    /// Accepts `0x`-prefixed hex or plain decimal
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            return Self::from_hex(trimmed);
        }
        U256::from_str_radix(trimmed, 10)
            .map(Self)
            .map_err(|_| DecodeError::InvalidFelt(s.to_string()))
    }
}

impl fmt::Display for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Felt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Serialize for Felt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Felt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Felt::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
