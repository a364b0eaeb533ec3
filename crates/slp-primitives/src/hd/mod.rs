//! BIP-32 hierarchical deterministic private key derivation.
//!
//! Only private derivation (CKDpriv) is provided; wallets here always hold
//! the seed. Paths use the usual text form:
//!
//! | Path | Meaning |
//! |------|---------|
//! | `m/44'/145'/0'` | BIP-44 account 0 for coin type 145 (Bitcoin Cash) |
//! | `0/0` | relative: external chain, first address |
//!
//! Hardened components may be written with `'`, `h` or `H`.

use std::fmt;
use std::str::FromStr;

use crate::ec::{PrivateKey, PublicKey};
use crate::hash::sha512_hmac;
use crate::PrimitivesError;

/// First hardened child index (2^31).
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// HMAC key used to derive the master node from a seed.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

// ---------------------------------------------------------------------------
// DerivationPath
// ---------------------------------------------------------------------------

/// A sequence of child indexes, either rooted at the master (`m/...`) or
/// relative to whatever node it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationPath {
    indices: Vec<u32>,
    absolute: bool,
}

impl DerivationPath {
    /// The child indexes, hardened ones already offset by 2^31.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether the path starts at the master node.
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }
}

impl FromStr for DerivationPath {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PrimitivesError::InvalidDerivationPath(s.to_string());
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = trimmed.split('/').peekable();
        let absolute = parts.peek() == Some(&"m") || parts.peek() == Some(&"M");
        if absolute {
            parts.next();
        }

        let mut indices = Vec::new();
        for part in parts {
            let (digits, hardened) = match part.strip_suffix(['\'', 'h', 'H']) {
                Some(d) => (d, true),
                None => (part, false),
            };
            let index: u32 = digits.parse().map_err(|_| invalid())?;
            if index >= HARDENED_OFFSET {
                return Err(invalid());
            }
            indices.push(if hardened { index + HARDENED_OFFSET } else { index });
        }

        if !absolute && indices.is_empty() {
            return Err(invalid());
        }
        Ok(DerivationPath { indices, absolute })
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .indices
            .iter()
            .map(|&i| {
                if i >= HARDENED_OFFSET {
                    format!("{}'", i - HARDENED_OFFSET)
                } else {
                    i.to_string()
                }
            })
            .collect();
        match (self.absolute, parts.is_empty()) {
            (true, true) => write!(f, "m"),
            (true, false) => write!(f, "m/{}", parts.join("/")),
            (false, _) => write!(f, "{}", parts.join("/")),
        }
    }
}

// ---------------------------------------------------------------------------
// ExtendedPrivateKey
// ---------------------------------------------------------------------------

/// A BIP-32 node: private key plus chain code.
#[derive(Clone, Debug)]
pub struct ExtendedPrivateKey {
    key: PrivateKey,
    chain_code: [u8; 32],
    depth: u8,
    child_number: u32,
}

impl ExtendedPrivateKey {
    /// Derive the master node from a 16 to 64 byte seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, PrimitivesError> {
        if !(16..=64).contains(&seed.len()) {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "seed must be 16 to 64 bytes, got {}",
                seed.len()
            )));
        }
        let i = sha512_hmac(MASTER_HMAC_KEY, seed);
        let key = PrivateKey::from_bytes(&i[..32])?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(ExtendedPrivateKey {
            key,
            chain_code,
            depth: 0,
            child_number: 0,
        })
    }

    /// CKDpriv: derive the child at `index` (hardened if >= 2^31).
    pub fn derive_child(&self, index: u32) -> Result<Self, PrimitivesError> {
        let mut data = Vec::with_capacity(37);
        if index >= HARDENED_OFFSET {
            data.push(0x00);
            data.extend_from_slice(&self.key.to_bytes());
        } else {
            data.extend_from_slice(&self.key.pub_key().to_compressed());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = sha512_hmac(&self.chain_code, &data);
        let mut tweak = [0u8; 32];
        tweak.copy_from_slice(&i[..32]);
        let key = self
            .key
            .tweak_add(&tweak)
            .ok_or(PrimitivesError::DerivationFailed(index))?;

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&i[32..]);
        Ok(ExtendedPrivateKey {
            key,
            chain_code,
            depth: self.depth.saturating_add(1),
            child_number: index,
        })
    }

    /// Apply every index of `path` in turn.
    ///
    /// An absolute path may only be applied to a master node.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, PrimitivesError> {
        if path.is_absolute() && self.depth != 0 {
            return Err(PrimitivesError::InvalidDerivationPath(format!(
                "{path} applied to a node at depth {}",
                self.depth
            )));
        }
        path.indices()
            .iter()
            .try_fold(self.clone(), |node, &index| node.derive_child(index))
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.pub_key()
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP-32 test vector 1.
    const SEED: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> ExtendedPrivateKey {
        ExtendedPrivateKey::from_seed(&hex::decode(SEED).unwrap()).unwrap()
    }

    #[test]
    fn test_master_from_seed() {
        let m = master();
        assert_eq!(
            m.private_key().to_hex(),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(m.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(m.depth(), 0);
    }

    #[test]
    fn test_hardened_child() {
        let child = master().derive_path(&"m/0'".parse().unwrap()).unwrap();
        assert_eq!(
            child.private_key().to_hex(),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(child.chain_code()),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
        assert_eq!(child.child_number(), HARDENED_OFFSET);
    }

    #[test]
    fn test_normal_child_after_hardened() {
        let node = master().derive_path(&"m/0H/1".parse().unwrap()).unwrap();
        assert_eq!(
            node.private_key().to_hex(),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn test_relative_path_continues_from_node() {
        let account = master().derive_path(&"m/0'".parse().unwrap()).unwrap();
        let relative = account.derive_path(&"1".parse().unwrap()).unwrap();
        let absolute = master().derive_path(&"m/0'/1".parse().unwrap()).unwrap();
        assert_eq!(relative.private_key(), absolute.private_key());
    }

    #[test]
    fn test_absolute_path_rejected_below_master() {
        let account = master().derive_path(&"m/0'".parse().unwrap()).unwrap();
        assert!(account.derive_path(&"m/1".parse().unwrap()).is_err());
    }

    #[test]
    fn test_path_parsing_and_display() {
        let path: DerivationPath = "m/44'/145'/0'".parse().unwrap();
        assert_eq!(
            path.indices(),
            &[44 + HARDENED_OFFSET, 145 + HARDENED_OFFSET, HARDENED_OFFSET]
        );
        assert_eq!(path.to_string(), "m/44'/145'/0'");

        let rel: DerivationPath = "0/0".parse().unwrap();
        assert!(!rel.is_absolute());
        assert_eq!(rel.to_string(), "0/0");

        assert_eq!("m".parse::<DerivationPath>().unwrap().to_string(), "m");
    }

    #[test]
    fn test_path_parsing_errors() {
        for bad in ["", "m/x", "m/44''", "0//1", "m/2147483648", "/"] {
            assert!(bad.parse::<DerivationPath>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_seed_length_bounds() {
        assert!(ExtendedPrivateKey::from_seed(&[1u8; 15]).is_err());
        assert!(ExtendedPrivateKey::from_seed(&[1u8; 65]).is_err());
        assert!(ExtendedPrivateKey::from_seed(&[1u8; 64]).is_ok());
    }
}
