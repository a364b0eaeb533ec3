#![deny(missing_docs)]
//! Simple Ledger Protocol (SLP) token support for Bitcoin Cash.
//!
//! Parses and builds SLP OP_RETURN messages, judges which outputs carry
//! tokens, aggregates balances, and builds signed SEND transactions.

pub mod amount;
pub mod balances;
pub mod error;
pub mod message;
pub mod send;
pub mod token_id;
pub mod utxo;

pub use amount::{format_base_units, to_base_units};
pub use balances::{classify_utxo, ParentMessage, SlpBalancesResult};
pub use error::TokenError;
pub use message::{build_send_script, SlpMessage, TokenType};
pub use send::{build_send_transaction, BchOutput, SendRequest, DEFAULT_FEE_RATE, DUST_LIMIT};
pub use token_id::TokenId;
pub use utxo::{SlpUtxo, TokenData, Utxo, UtxoJudgement};
