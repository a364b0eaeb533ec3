//! REST API configuration and response types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mainnet endpoint of the rest.bitcoin.com v2 API.
pub const MAINNET_BASE_URL: &str = "https://rest.bitcoin.com/v2";

/// Testnet endpoint of the rest.bitcoin.com v2 API.
pub const TESTNET_BASE_URL: &str = "https://trest.bitcoin.com/v2";

/// Most items the API accepts in one array request.
pub const MAX_BATCH: usize = 20;

/// Configuration for a [`RestClient`](crate::RestClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// Base URL, without a trailing slash (e.g. `https://rest.bitcoin.com/v2`).
    pub base_url: String,
    /// Optional Bearer token for authentication.
    pub api_key: Option<String>,
    /// Per-request timeout; `None` leaves it to the HTTP client.
    pub timeout: Option<Duration>,
}

impl RestConfig {
    /// Mainnet preset.
    pub fn mainnet() -> Self {
        Self {
            base_url: MAINNET_BASE_URL.to_string(),
            api_key: None,
            timeout: Some(Duration::from_secs(30)),
        }
    }

    /// Testnet preset.
    pub fn testnet() -> Self {
        Self {
            base_url: TESTNET_BASE_URL.to_string(),
            ..Self::mainnet()
        }
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// One unspent output from `address/utxo`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestUtxo {
    /// Display-order hex txid.
    pub txid: String,
    /// Output index.
    pub vout: u32,
    /// Value in BCH.
    #[serde(default)]
    pub amount: f64,
    /// Value in satoshis.
    pub satoshis: u64,
    /// Block height; absent or null while unconfirmed.
    #[serde(default)]
    pub height: Option<u32>,
    /// Number of confirmations.
    #[serde(default)]
    pub confirmations: u32,
}

/// Response of `address/utxo/{address}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUtxos {
    /// The unspent outputs.
    pub utxos: Vec<RestUtxo>,
    /// The address in legacy format.
    #[serde(default)]
    pub legacy_address: Option<String>,
    /// The address in CashAddr format.
    #[serde(default)]
    pub cash_address: Option<String>,
    /// Hex locking script shared by every output of the address.
    pub script_pub_key: String,
}

/// One entry of the `slp/validateTxid` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxidValidation {
    /// The txid that was checked.
    pub txid: String,
    /// Whether the transaction is SLP-valid.
    pub valid: bool,
    /// Why it is not, when it is not.
    #[serde(default)]
    pub invalid_reason: Option<String>,
}

/// Request body of `rawtransactions/getRawTransaction`.
#[derive(Debug, Serialize)]
pub(crate) struct RawTransactionsRequest<'a> {
    pub txids: &'a [String],
    pub verbose: bool,
}

/// Request body of `slp/validateTxid`.
#[derive(Debug, Serialize)]
pub(crate) struct ValidateRequest<'a> {
    pub txids: &'a [String],
}

/// Request body of `rawtransactions/sendRawTransaction`.
#[derive(Debug, Serialize)]
pub(crate) struct SendRawRequest<'a> {
    pub hexes: [&'a str; 1],
}

/// Error body returned with 4xx and 5xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}
