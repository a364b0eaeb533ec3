/// SLP SDK - Bitcoin Cash transactions.
///
/// Provides the Transaction type with inputs and outputs, wire
/// serialization, FORKID signature hashes, size estimation and P2PKH signing.

pub mod transaction;
pub mod input;
pub mod output;
pub mod sighash;
pub mod template;

mod error;
pub use error::TransactionError;
pub use transaction::{parse_txid, txid_to_hex, Transaction};
pub use input::TransactionInput;
pub use output::TransactionOutput;

#[cfg(test)]
mod tests;
