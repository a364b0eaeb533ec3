/// Unified error type for all primitives operations.
///
/// Covers errors from EC operations, WIF and Base58 decoding, binary reads,
/// HD derivation and mnemonic handling.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid WIF format: {0}")]
    InvalidWif(String),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("key derivation failed at index {0}")]
    DerivationFailed(u32),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("unexpected end of data")]
    UnexpectedEof,
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}

impl From<bip39::Error> for PrimitivesError {
    fn from(e: bip39::Error) -> Self {
        PrimitivesError::InvalidMnemonic(e.to_string())
    }
}
