/// SLP SDK - Cryptographic primitives, hashing, and key management.
///
/// This crate provides the foundational building blocks for the SLP SDK:
/// - Hash functions (SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC-SHA512)
/// - Variable-length integer encoding and little-endian readers/writers
/// - Base58 and Base58Check encoding
/// - secp256k1 private/public keys, WIF and ECDSA signatures
/// - BIP-32 hierarchical deterministic derivation
/// - BIP-39 mnemonic to seed conversion

pub mod hash;
pub mod util;
pub mod base58;
pub mod ec;
pub mod hd;
pub mod mnemonic;

mod error;
pub use error::PrimitivesError;
pub use ec::{PrivateKey, PublicKey, Signature};
pub use hd::{DerivationPath, ExtendedPrivateKey};
