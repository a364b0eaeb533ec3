//! Error types for network operations.

use slp_rest::RestError;
use slp_script::ScriptError;
use slp_tokens::TokenError;
use slp_transaction::TransactionError;

/// Errors that can occur while querying or using the network.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// The REST API call failed.
    #[error(transparent)]
    Rest(#[from] RestError),

    /// Token parsing or send construction failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Transaction parsing or signing failed.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Address or script decoding failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The genesis transaction of a token does not look like one.
    #[error("{token_id} is not a token genesis: {reason}")]
    NotGenesis {
        /// The id that was looked up.
        token_id: String,
        /// What was found instead.
        reason: String,
    },

    /// An input offered for spending is not backed by a valid SLP parent.
    #[error("input {0} is not SLP-valid")]
    InvalidInput(String),
}
