//! Pay-to-Public-Key-Hash (P2PKH) template.
//!
//! Locking: `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`.
//! Unlocking: `<DER sig || hashtype> <compressed pubkey>`.

use slp_primitives::PrivateKey;
use slp_script::{Address, AddressKind, Script, ScriptError};

use crate::sighash::SIGHASH_ALL_FORKID;
use crate::template::UnlockingScriptTemplate;
use crate::transaction::Transaction;
use crate::TransactionError;

/// Unlocking script size used for fee estimates:
/// push(1) + DER sig up to 72 + hashtype(1) + push(1) + pubkey(33).
pub const ESTIMATED_UNLOCK_LEN: u32 = 107;

/// Locking script paying to a P2PKH address.
///
/// # Returns
/// `NotP2PKH` for a P2SH address.
pub fn lock(address: &Address) -> Result<Script, TransactionError> {
    match address.kind {
        AddressKind::P2pkh => Ok(Script::p2pkh(&address.hash)),
        AddressKind::P2sh => Err(ScriptError::NotP2PKH.into()),
    }
}

/// A P2PKH unlocker; `sighash_flag` defaults to `SIGHASH_ALL_FORKID` (0x41).
pub fn unlock(private_key: PrivateKey, sighash_flag: Option<u32>) -> P2PKH {
    P2PKH {
        private_key,
        sighash_flag: sighash_flag.unwrap_or(SIGHASH_ALL_FORKID),
    }
}

/// P2PKH signer holding a key and sighash flag.
pub struct P2PKH {
    private_key: PrivateKey,
    sighash_flag: u32,
}

impl UnlockingScriptTemplate for P2PKH {
    fn sign(&self, tx: &Transaction, input_index: u32) -> Result<Script, TransactionError> {
        let idx = input_index as usize;
        if idx >= tx.inputs.len() {
            return Err(TransactionError::SigningError(format!(
                "input index {} out of range (tx has {} inputs)",
                idx,
                tx.inputs.len()
            )));
        }

        let sig_hash = tx.calc_input_signature_hash(idx, self.sighash_flag)?;
        let signature = self.private_key.sign(&sig_hash)?;

        let mut sig_buf = signature.to_der();
        sig_buf.push(self.sighash_flag as u8);

        let mut script = Script::new();
        script.append_push_data(&sig_buf)?;
        script.append_push_data(&self.private_key.pub_key().to_compressed())?;
        Ok(script)
    }

    fn estimate_length(&self, _tx: &Transaction, _input_index: u32) -> u32 {
        ESTIMATED_UNLOCK_LEN
    }
}
