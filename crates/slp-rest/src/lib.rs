#![deny(missing_docs)]

//! # slp-rest
//!
//! Async HTTP client for the rest.bitcoin.com v2 API: address UTXOs, raw
//! transactions, SLP validation and broadcasting.
//!
//! # Example
//!
//! ```no_run
//! use slp_rest::{RestClient, RestConfig};
//!
//! let client = RestClient::new(RestConfig {
//!     api_key: Some("my-key".to_string()),
//!     ..RestConfig::testnet()
//! })
//! .unwrap();
//! ```

pub mod client;
pub mod error;
pub mod types;


pub use client::RestClient;
pub use error::RestError;
pub use types::{AddressUtxos, RestConfig, RestUtxo, TxidValidation};
