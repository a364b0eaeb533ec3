/// Error types for script and address operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid script: {0}")]
    InvalidScript(String),

    /// Attempted to append a push opcode as a bare opcode.
    #[error("use append_push_data for push opcodes: {0}")]
    InvalidOpcodeType(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Decoded Base58 payload is not version byte plus 20-byte hash.
    #[error("invalid address length for '{0}'")]
    InvalidAddressLength(String),

    /// Unknown prefix, version byte or address type.
    #[error("address not supported: {0}")]
    UnsupportedAddress(String),

    #[error("address checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("script is empty")]
    EmptyScript,

    #[error("not a P2PKH")]
    NotP2PKH,

    /// Not enough bytes in the script to complete a push.
    #[error("not enough data")]
    DataTooSmall,

    #[error("data too big")]
    DataTooBig,

    #[error("part too big '{0}'")]
    PartTooBig(usize),

    #[error("primitives error: {0}")]
    Primitives(#[from] slp_primitives::PrimitivesError),
}
