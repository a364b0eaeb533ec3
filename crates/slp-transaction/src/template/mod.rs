//! Script templates for signing inputs.
//!
//! The `UnlockingScriptTemplate` trait is the seam between a transaction
//! and a signing strategy; P2PKH is the only one a plain wallet needs.

pub mod p2pkh;

use slp_script::Script;

use crate::transaction::Transaction;
use crate::TransactionError;

/// Produces unlocking scripts for transaction inputs.
pub trait UnlockingScriptTemplate {
    /// Produce the unlocking script for `input_index`.
    ///
    /// # Arguments
    /// * `tx` - The transaction being signed; the input must know its source output.
    /// * `input_index` - The index of the input to sign.
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError>;

    /// Upper estimate of the unlocking script length, for fee calculation
    /// before signing.
    fn estimate_length(&self, tx: &Transaction, input_index: u32) -> u32;
}
