use slp_primitives::PrimitivesError;

/// Errors from building, parsing and signing transactions.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Structurally wrong, e.g. an input index out of range.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    /// Usually a missing spent output or a key count mismatch.
    #[error("signing error: {0}")]
    SigningError(String),
    #[error("serialization error: {0}")]
    SerializationError(String),
    #[error("script error: {0}")]
    Script(#[from] slp_script::ScriptError),
    #[error("primitives error: {0}")]
    Primitives(#[from] PrimitivesError),
}

/// Map a short read of `field` to a `SerializationError` naming it.
pub(crate) fn truncated(field: &'static str) -> impl FnOnce(PrimitivesError) -> TransactionError {
    move |e| TransactionError::SerializationError(format!("reading {field}: {e}"))
}
