//! HTTP client for the rest.bitcoin.com v2 API.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::RestError;
use crate::types::{
    AddressUtxos, ErrorBody, RawTransactionsRequest, RestConfig, SendRawRequest, TxidValidation,
    ValidateRequest, MAX_BATCH,
};

/// HTTP client for the REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    /// Client configuration.
    config: RestConfig,
    /// Underlying HTTP client.
    client: reqwest::Client,
}

impl RestClient {
    /// Create a new client with the given configuration.
    pub fn new(config: RestConfig) -> Result<Self, RestError> {
        let mut builder = reqwest::Client::builder().default_headers(build_headers(&config));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            config,
            client: builder.build()?,
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Unspent outputs of an address.
    ///
    /// # Arguments
    /// * `address` - Any address format the API accepts; CashAddr is safest.
    pub async fn utxos(&self, address: &str) -> Result<AddressUtxos, RestError> {
        self.get(&format!("address/utxo/{address}")).await
    }

    /// Raw transaction hex for each txid, in the order asked.
    ///
    /// Requests are split into batches the API accepts.
    pub async fn raw_transactions(&self, txids: &[String]) -> Result<Vec<String>, RestError> {
        let mut hexes = Vec::with_capacity(txids.len());
        for batch in txids.chunks(MAX_BATCH) {
            let body = RawTransactionsRequest {
                txids: batch,
                verbose: false,
            };
            let found: Vec<String> = self.post("rawtransactions/getRawTransaction", &body).await?;
            if found.len() != batch.len() {
                return Err(RestError::UnexpectedResponse(format!(
                    "asked for {} transactions, got {}",
                    batch.len(),
                    found.len()
                )));
            }
            hexes.extend(found);
        }
        Ok(hexes)
    }

    /// SLP validity of each txid, as judged by the API's validator.
    pub async fn validate_txids(&self, txids: &[String]) -> Result<Vec<TxidValidation>, RestError> {
        let mut results = Vec::with_capacity(txids.len());
        for batch in txids.chunks(MAX_BATCH) {
            let body = ValidateRequest { txids: batch };
            let found: Vec<TxidValidation> = self.post("slp/validateTxid", &body).await?;
            results.extend(found);
        }
        Ok(results)
    }

    /// Broadcast a signed transaction.
    ///
    /// # Returns
    /// The txid the node reports.
    pub async fn send_raw_transaction(&self, hex: &str) -> Result<String, RestError> {
        let body = SendRawRequest { hexes: [hex] };
        let txids: Vec<String> = self.post("rawtransactions/sendRawTransaction", &body).await?;
        txids
            .into_iter()
            .next()
            .ok_or_else(|| RestError::UnexpectedResponse("no txid returned".to_string()))
    }

    // -----------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RestError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await?;
        decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RestError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let resp = self.client.post(&url).json(body).send().await?;
        decode(resp).await
    }
}

/// Build common headers from config.
fn build_headers(config: &RestConfig) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(ref key) = config.api_key {
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {key}")) {
            headers.insert(AUTHORIZATION, val);
        }
    }
    headers
}

/// Turn an error status into `RestError::Api`, otherwise parse the body.
async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RestError> {
    let status = resp.status();
    let text = resp.text().await?;

    if status.is_client_error() || status.is_server_error() {
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or(text);
        debug!(status = status.as_u16(), %message, "API error");
        return Err(RestError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&text)?)
}
