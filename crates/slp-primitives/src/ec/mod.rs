/// Elliptic curve cryptography on secp256k1.
///
/// Private keys with WIF encoding, compressed public keys and
/// low-S ECDSA signatures with DER serialization.

pub mod private_key;
pub mod public_key;
pub mod signature;

pub use private_key::{PrivateKey, MAINNET_WIF_PREFIX, TESTNET_WIF_PREFIX};
pub use public_key::PublicKey;
pub use signature::Signature;
