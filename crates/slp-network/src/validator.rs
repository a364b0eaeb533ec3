//! Pluggable SLP transaction validation.
//!
//! Full SLP validation walks the token DAG back to its genesis. This crate
//! does not do that itself; it asks a validator, and the default one asks
//! the REST API.

use std::future::Future;

use slp_rest::RestClient;
use tracing::debug;

use crate::error::NetworkError;

/// Decides whether transactions are SLP-valid.
pub trait SlpValidator {
    /// Whether a single transaction is SLP-valid.
    fn is_valid_slp_txid(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<bool, NetworkError>> + Send;

    /// The subset of `txids` that is SLP-valid, in input order.
    fn validate_slp_transactions(
        &self,
        txids: &[String],
    ) -> impl Future<Output = Result<Vec<String>, NetworkError>> + Send;
}

/// Validator delegating to the REST API's `slp/validateTxid`.
///
/// Results are not cached; every call goes to the API.
#[derive(Debug, Clone)]
pub struct RemoteValidator {
    client: RestClient,
}

impl RemoteValidator {
    /// Create a validator over `client`.
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

impl SlpValidator for RemoteValidator {
    async fn is_valid_slp_txid(&self, txid: &str) -> Result<bool, NetworkError> {
        let valid = self.validate_slp_transactions(&[txid.to_string()]).await?;
        Ok(!valid.is_empty())
    }

    async fn validate_slp_transactions(&self, txids: &[String]) -> Result<Vec<String>, NetworkError> {
        if txids.is_empty() {
            return Ok(Vec::new());
        }
        let results = self.client.validate_txids(txids).await?;
        for result in results.iter().filter(|r| !r.valid) {
            debug!(
                txid = %result.txid,
                reason = result.invalid_reason.as_deref().unwrap_or("unspecified"),
                "SLP-invalid"
            );
        }
        Ok(txids
            .iter()
            .filter(|txid| results.iter().any(|r| r.valid && &r.txid == *txid))
            .cloned()
            .collect())
    }
}
