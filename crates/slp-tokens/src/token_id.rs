//! Token identifier type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TokenError;

/// A token identifier: the txid of the token's GENESIS transaction.
///
/// Stored in display order, the same byte order the SLP SEND and MINT
/// messages carry on chain and the order block explorers print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId([u8; 32]);

impl TokenId {
    /// Create a `TokenId` from display-order bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a `TokenId` from a byte slice, which must be 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TokenError> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TokenError::InvalidTokenId(format!("expected 32 bytes, got {}", bytes.len())))?;
        Ok(Self(arr))
    }

    /// Parse a 64-character hex token id.
    pub fn from_hex(hex_str: &str) -> Result<Self, TokenError> {
        let bytes = hex::decode(hex_str.trim())
            .map_err(|e| TokenError::InvalidTokenId(format!("{hex_str}: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Returns the display-order bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the id as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The genesis txid in internal (wire) byte order, as transaction
    /// inputs reference it.
    pub fn to_wire_txid(&self) -> [u8; 32] {
        let mut wire = self.0;
        wire.reverse();
        wire
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TokenId {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
