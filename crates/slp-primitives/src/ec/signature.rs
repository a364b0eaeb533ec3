//! ECDSA signatures over secp256k1.
//!
//! Signing uses RFC6979 deterministic nonces and always yields a low-S
//! signature, which Bitcoin Cash relay policy requires. Serialization is
//! strict DER as carried in P2PKH unlocking scripts.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa;

use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// A low-S ECDSA signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    inner: ecdsa::Signature,
}

impl Signature {
    /// Sign a 32-byte digest.
    pub fn sign(digest: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let sig: ecdsa::Signature = priv_key
            .signing_key()
            .sign_prehash(digest)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        let inner = sig.normalize_s().unwrap_or(sig);
        Ok(Signature { inner })
    }

    /// Verify this signature over `digest` for `pub_key`.
    pub fn verify(&self, digest: &[u8; 32], pub_key: &PublicKey) -> bool {
        pub_key
            .verifying_key()
            .verify_prehash(digest, &self.inner)
            .is_ok()
    }

    /// Big-endian R and S, 32 bytes each.
    pub fn r_s(&self) -> ([u8; 32], [u8; 32]) {
        let bytes = self.inner.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        (r, s)
    }

    /// Strict DER: `0x30 len 0x02 rlen r 0x02 slen s`.
    pub fn to_der(&self) -> Vec<u8> {
        let (r, s) = self.r_s();
        let r = der_integer(&r);
        let s = der_integer(&s);

        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(0x30);
        out.push((4 + r.len() + s.len()) as u8);
        out.push(0x02);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(0x02);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }

    /// Parse a strict DER signature.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let malformed = |what: &str| PrimitivesError::InvalidSignature(format!("malformed DER: {what}"));

        if bytes.len() < 8 || bytes[0] != 0x30 {
            return Err(malformed("header"));
        }
        if bytes[1] as usize != bytes.len() - 2 {
            return Err(malformed("length"));
        }

        let (r, rest) = read_der_integer(&bytes[2..]).ok_or_else(|| malformed("R"))?;
        let (s, rest) = read_der_integer(rest).ok_or_else(|| malformed("S"))?;
        if !rest.is_empty() {
            return Err(malformed("trailing bytes"));
        }

        let inner = ecdsa::Signature::from_scalars(r, s)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;
        Ok(Signature { inner })
    }
}

/// Minimal big-endian integer with a 0x00 pad when the high bit is set.
fn der_integer(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

/// Read one `0x02 len value` element, left-padded into 32 bytes.
fn read_der_integer(bytes: &[u8]) -> Option<([u8; 32], &[u8])> {
    if bytes.len() < 2 || bytes[0] != 0x02 {
        return None;
    }
    let len = bytes[1] as usize;
    if len == 0 || bytes.len() < 2 + len {
        return None;
    }
    let mut value = &bytes[2..2 + len];
    while value.len() > 1 && value[0] == 0 {
        value = &value[1..];
    }
    if value.len() > 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out[32 - value.len()..].copy_from_slice(value);
    Some((out, &bytes[2 + len..]))
}
