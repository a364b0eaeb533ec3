//! Transaction input spending a previous output.
//!
//! Besides the wire fields an input can carry the output it spends. The
//! FORKID sighash commits to that output's value and script, so signing
//! needs it.

use slp_primitives::util::{ByteReader, ByteWriter};
use slp_script::Script;

use crate::output::TransactionOutput;
use crate::transaction::txid_to_hex;
use crate::error::truncated;
use crate::TransactionError;

/// Sequence number of a final input (no relative lock-time).
pub const DEFAULT_SEQUENCE_NUMBER: u32 = 0xFFFF_FFFF;

/// A single transaction input.
///
/// # Wire format
///
/// | Field              | Size             |
/// |--------------------|------------------|
/// | source_txid        | 32 bytes (LE)    |
/// | source_tx_out_index| 4 bytes (LE)     |
/// | script length      | VarInt           |
/// | unlocking_script   | variable         |
/// | sequence_number    | 4 bytes (LE)     |
#[derive(Clone, Debug)]
pub struct TransactionInput {
    /// Txid of the spent output in internal (little-endian) byte order.
    pub source_txid: [u8; 32],
    pub source_tx_out_index: u32,
    pub sequence_number: u32,
    /// `None` until the input is signed.
    pub unlocking_script: Option<Script>,
    source_output: Option<TransactionOutput>,
}

impl TransactionInput {
    /// An unsigned input spending `source_txid:vout`.
    pub fn new(source_txid: [u8; 32], source_tx_out_index: u32) -> Self {
        TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number: DEFAULT_SEQUENCE_NUMBER,
            unlocking_script: None,
            source_output: None,
        }
    }

    /// Deserialize an input from `reader`.
    ///
    /// # Returns
    /// The input, or `SerializationError` naming the field that was cut short.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let source_txid = reader.read_array::<32>().map_err(truncated("source txid"))?;
        let source_tx_out_index = reader.read_u32_le().map_err(truncated("output index"))?;
        let script_len = reader.read_varint().map_err(truncated("script length"))?;
        let script_bytes = reader.read_bytes(script_len.value() as usize).map_err(truncated("unlocking script"))?;
        let sequence_number = reader.read_u32_le().map_err(truncated("sequence number"))?;

        let unlocking_script = if script_bytes.is_empty() {
            None
        } else {
            Some(Script::from_bytes(script_bytes))
        };

        Ok(TransactionInput {
            source_txid,
            source_tx_out_index,
            sequence_number,
            unlocking_script,
            source_output: None,
        })
    }

    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_bytes(&self.source_txid);
        writer.write_u32_le(self.source_tx_out_index);
        match &self.unlocking_script {
            Some(script) => writer.write_var_bytes(script.to_bytes()),
            None => writer.write_var_bytes(&[]),
        }
        writer.write_u32_le(self.sequence_number);
    }

    /// Attach (or clear) the output this input spends.
    pub fn set_source_output(&mut self, output: Option<TransactionOutput>) {
        self.source_output = output;
    }

    pub fn source_tx_output(&self) -> Option<&TransactionOutput> {
        self.source_output.as_ref()
    }

    pub fn source_tx_satoshis(&self) -> Option<u64> {
        self.source_output.as_ref().map(|o| o.satoshis)
    }

    pub fn source_tx_script(&self) -> Option<&Script> {
        self.source_output.as_ref().map(|o| &o.locking_script)
    }

    /// Display-order hex of the spent txid.
    pub fn source_txid_hex(&self) -> String {
        txid_to_hex(&self.source_txid)
    }
}
