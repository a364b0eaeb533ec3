//! Error types for REST API operations.

/// Errors that can occur when talking to the REST API.
#[derive(Debug, thiserror::Error)]
pub enum RestError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Failed to serialize or deserialize data.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The API answered with an error status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the body, or the raw body.
        message: String,
    },

    /// The API answered successfully but not with what was asked for.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
