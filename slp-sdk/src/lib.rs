#![deny(missing_docs)]

//! Simple Ledger Protocol SDK for Bitcoin Cash.
//!
//! Re-exports every SLP SDK crate for single-crate usage:
//!
//! ```no_run
//! use slp_sdk::network::SlpNetwork;
//! use slp_sdk::rest::RestConfig;
//! use slp_sdk::script::Network;
//! use slp_sdk::tokens::TokenId;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let network = SlpNetwork::remote(RestConfig::mainnet(), Network::Mainnet)?;
//! let token: TokenId = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98".parse()?;
//! let info = network.get_token_information(&token).await?;
//! println!("{} has {} decimals", info.ticker, info.decimals);
//! # Ok(())
//! # }
//! ```

pub use slp_primitives as primitives;
pub use slp_script as script;
pub use slp_transaction as transaction;
pub use slp_tokens as tokens;
pub use slp_rest as rest;
pub use slp_network as network;
