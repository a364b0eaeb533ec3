//! Token error types.

use slp_primitives::PrimitivesError;
use slp_script::ScriptError;
use slp_transaction::TransactionError;

/// Errors that can occur during token operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// An OP_RETURN output does not hold a well-formed SLP message.
    #[error("invalid SLP message: {0}")]
    InvalidSlpMessage(String),

    /// The message carries the SLP lokad id but a token type this crate
    /// does not understand.
    #[error("unsupported token type: {0:#x}")]
    UnsupportedTokenType(u16),

    /// A token id is not 32 bytes of hex.
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),

    /// A decimal amount cannot be expressed in base units.
    #[error("invalid amount '{amount}': {reason}")]
    InvalidAmount {
        /// The amount as given.
        amount: String,
        /// Why it was rejected.
        reason: String,
    },

    /// More outputs than a SEND message can describe, or none at all.
    #[error("invalid output count: {0}")]
    InvalidOutputCount(String),

    /// A receiver or change address is unusable.
    #[error("invalid receiver: {0}")]
    InvalidReceiver(String),

    /// An input cannot be spent by this send.
    #[error("invalid input {txid}:{vout}: {reason}")]
    InvalidInput {
        /// Txid of the offending output.
        txid: String,
        /// Index of the offending output.
        vout: u32,
        /// Why it was rejected.
        reason: String,
    },

    /// Token inputs do not cover the requested send.
    #[error("insufficient tokens: needed {needed}, available {available}")]
    InsufficientTokens {
        /// Base units requested.
        needed: u128,
        /// Base units held by the inputs.
        available: u128,
    },

    /// Insufficient funds for the operation.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Satoshis needed.
        needed: u64,
        /// Satoshis available.
        available: u64,
    },

    /// Transaction error.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Script error.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Primitives error.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),
}
