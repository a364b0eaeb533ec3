//! secp256k1 private key with Wallet Import Format support.
//!
//! Wraps a k256 signing key. Adds WIF encoding for mainnet and testnet,
//! deterministic signing of 32-byte digests, and the scalar addition that
//! BIP-32 child derivation needs.

use k256::ecdsa::SigningKey;
use k256::elliptic_curve::PrimeField;
use k256::{NonZeroScalar, Scalar};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::base58;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::PrimitivesError;

/// WIF version byte for mainnet keys.
pub const MAINNET_WIF_PREFIX: u8 = 0x80;

/// WIF version byte for testnet keys.
pub const TESTNET_WIF_PREFIX: u8 = 0xef;

/// Suffix marking a WIF key whose public key is serialized compressed.
const COMPRESS_MAGIC: u8 = 0x01;

const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key used to sign transaction inputs.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a random key from the OS random number generator.
    pub fn new() -> Self {
        PrivateKey {
            inner: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a key from a 32-byte big-endian scalar.
    ///
    /// # Returns
    /// An error if the slice is not 32 bytes, or the scalar is zero or not
    /// below the curve order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTES_LEN,
                bytes.len()
            )));
        }
        let inner = SigningKey::from_bytes(bytes.into())
            .map_err(|e| PrimitivesError::InvalidPrivateKey(e.to_string()))?;
        Ok(PrivateKey { inner })
    }

    /// Create a key from a 64-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        Self::from_bytes(&hex::decode(hex_str)?)
    }

    /// Decode a WIF string, ignoring which network it was encoded for.
    pub fn from_wif(wif: &str) -> Result<Self, PrimitivesError> {
        Self::from_wif_with_prefix(wif).map(|(key, _)| key)
    }

    /// Decode a WIF string and return the key together with its version byte.
    ///
    /// Accepts both compressed (34-byte payload) and uncompressed (33-byte
    /// payload) encodings. Only the mainnet and testnet version bytes are
    /// recognized.
    pub fn from_wif_with_prefix(wif: &str) -> Result<(Self, u8), PrimitivesError> {
        let payload = base58::check_decode(wif).map_err(|e| match e {
            PrimitivesError::ChecksumMismatch => e,
            other => PrimitivesError::InvalidWif(other.to_string()),
        })?;

        match payload.len() {
            34 if payload[33] != COMPRESS_MAGIC => {
                return Err(PrimitivesError::InvalidWif(
                    "invalid compression flag".to_string(),
                ));
            }
            33 | 34 => {}
            n => {
                return Err(PrimitivesError::InvalidWif(format!(
                    "invalid payload length {}",
                    n
                )));
            }
        }

        let prefix = payload[0];
        if prefix != MAINNET_WIF_PREFIX && prefix != TESTNET_WIF_PREFIX {
            return Err(PrimitivesError::InvalidWif(format!(
                "unknown version byte 0x{:02x}",
                prefix
            )));
        }

        let key = Self::from_bytes(&payload[1..1 + PRIVATE_KEY_BYTES_LEN])?;
        Ok((key, prefix))
    }

    /// Encode as a compressed mainnet WIF string.
    pub fn to_wif(&self) -> String {
        self.to_wif_prefix(MAINNET_WIF_PREFIX)
    }

    /// Encode as a compressed WIF string with the given version byte.
    pub fn to_wif_prefix(&self, prefix: u8) -> String {
        let mut payload = Vec::with_capacity(1 + PRIVATE_KEY_BYTES_LEN + 1);
        payload.push(prefix);
        payload.extend_from_slice(&self.to_bytes());
        payload.push(COMPRESS_MAGIC);
        let wif = base58::check_encode(&payload);
        payload.zeroize();
        wif
    }

    /// The 32-byte big-endian scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.inner.to_bytes().into()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The matching public key.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte digest with an RFC6979 nonce; the result is low-S.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(digest, self)
    }

    /// Return `self + tweak (mod n)`.
    ///
    /// # Returns
    /// `None` when the tweak is not below the curve order or the sum is zero;
    /// BIP-32 treats both as an invalid child.
    pub(crate) fn tweak_add(&self, tweak: &[u8; 32]) -> Option<PrivateKey> {
        let tweak: Option<Scalar> = Scalar::from_repr((*tweak).into()).into();
        let sum = *self.inner.as_nonzero_scalar().as_ref() + tweak?;
        let sum: Option<NonZeroScalar> = NonZeroScalar::new(sum).into();
        Some(PrivateKey {
            inner: SigningKey::from(sum?),
        })
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("pub_key", &self.pub_key().to_hex())
            .finish_non_exhaustive()
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}
