//! SLP network client.
//!
//! Ties the REST API to the token layer: reads token metadata, judges an
//! address's outputs into token balances, and builds and broadcasts token
//! sends. Transaction validity is decided by a pluggable [`SlpValidator`].

pub mod error;
pub mod network;
pub mod validator;

pub use error::NetworkError;
pub use network::{SlpNetwork, TokenInfo};
pub use validator::{RemoteValidator, SlpValidator};
