//! Core transaction type.
//!
//! Version, inputs, outputs and lock time, with wire serialization, txid
//! computation, size estimation for fee calculation, and signing helpers.

use slp_primitives::hash::sha256d;
use slp_primitives::util::{ByteReader, ByteWriter, VarInt};
use slp_primitives::PrivateKey;
use slp_script::Script;

use crate::input::TransactionInput;
use crate::output::TransactionOutput;
use crate::sighash;
use crate::template::{p2pkh, UnlockingScriptTemplate};
use crate::error::truncated;
use crate::TransactionError;

/// Version used for newly built transactions.
pub const DEFAULT_VERSION: u32 = 2;

/// Parse a display-order (big-endian) txid into internal byte order.
pub fn parse_txid(hex_str: &str) -> Result<[u8; 32], TransactionError> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| TransactionError::SerializationError(format!("invalid txid hex: {}", e)))?;
    let mut txid: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
        TransactionError::SerializationError(format!("txid must be 32 bytes, got {}", b.len()))
    })?;
    txid.reverse();
    Ok(txid)
}

/// Display-order hex of an internal-order txid.
pub fn txid_to_hex(txid: &[u8; 32]) -> String {
    let mut display = *txid;
    display.reverse();
    hex::encode(display)
}

/// A Bitcoin Cash transaction.
///
/// # Wire format
///
/// | Field        | Size                      |
/// |--------------|---------------------------|
/// | version      | 4 bytes (LE)              |
/// | input count  | VarInt                    |
/// | inputs       | variable (per input)      |
/// | output count | VarInt                    |
/// | outputs      | variable (per output)     |
/// | lock_time    | 4 bytes (LE)              |
#[derive(Clone, Debug)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// An empty version 2 transaction with lock time 0.
    pub fn new() -> Self {
        Transaction {
            version: DEFAULT_VERSION,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }

    // -----------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------

    pub fn from_hex(hex_str: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(hex_str).map_err(|e| {
            TransactionError::SerializationError(format!("invalid hex: {}", e))
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse exactly one transaction; trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = ByteReader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(TransactionError::SerializationError(format!(
                "trailing {} bytes after transaction",
                reader.remaining()
            )));
        }
        Ok(tx)
    }

    pub fn read_from(reader: &mut ByteReader) -> Result<Self, TransactionError> {
        let version = reader.read_u32_le().map_err(truncated("version"))?;

        let input_count = reader.read_varint().map_err(truncated("input count"))?;
        // Each input is at least 41 bytes; cap the preallocation accordingly.
        let mut inputs = Vec::with_capacity((input_count.value() as usize).min(reader.remaining() / 41));
        for _ in 0..input_count.value() {
            inputs.push(TransactionInput::read_from(reader)?);
        }

        let output_count = reader.read_varint().map_err(truncated("output count"))?;
        let mut outputs = Vec::with_capacity((output_count.value() as usize).min(reader.remaining() / 9));
        for _ in 0..output_count.value() {
            outputs.push(TransactionOutput::read_from(reader)?);
        }

        let lock_time = reader.read_u32_le().map_err(truncated("lock time"))?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    // -----------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(256);
        writer.write_u32_le(self.version);

        writer.write_varint(VarInt::from(self.inputs.len()));
        for input in &self.inputs {
            input.write_to(&mut writer);
        }

        writer.write_varint(VarInt::from(self.outputs.len()));
        for output in &self.outputs {
            output.write_to(&mut writer);
        }

        writer.write_u32_le(self.lock_time);
        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    // -----------------------------------------------------------------
    // Transaction ID
    // -----------------------------------------------------------------

    /// Double SHA-256 of the serialization, internal byte order.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    /// The txid as conventionally displayed (byte-reversed hex).
    pub fn tx_id_hex(&self) -> String {
        txid_to_hex(&self.tx_id())
    }

    // -----------------------------------------------------------------
    // Inputs and outputs
    // -----------------------------------------------------------------

    pub fn add_input(&mut self, input: TransactionInput) {
        self.inputs.push(input);
    }

    /// Add an input spending `prev_tx_id:vout`, remembering the spent
    /// output's script and value for signing.
    ///
    /// # Arguments
    /// * `prev_tx_id` - Display-order hex txid.
    /// * `vout` - Index of the spent output.
    /// * `locking_script` - Script of the spent output.
    /// * `satoshis` - Value of the spent output.
    pub fn add_input_from(
        &mut self,
        prev_tx_id: &str,
        vout: u32,
        locking_script: Script,
        satoshis: u64,
    ) -> Result<(), TransactionError> {
        let mut input = TransactionInput::new(parse_txid(prev_tx_id)?, vout);
        input.set_source_output(Some(TransactionOutput::new(satoshis, locking_script)));
        self.inputs.push(input);
        Ok(())
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn add_output(&mut self, output: TransactionOutput) {
        self.outputs.push(output);
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Sum of the output values.
    ///
    /// # Returns
    /// `InvalidTransaction` if the sum does not fit in a u64.
    pub fn total_output_satoshis(&self) -> Result<u64, TransactionError> {
        self.outputs.iter().try_fold(0u64, |total, output| {
            total.checked_add(output.satoshis).ok_or_else(|| {
                TransactionError::InvalidTransaction("output values overflow u64".to_string())
            })
        })
    }

    /// Sum of the spent outputs' values.
    ///
    /// # Returns
    /// An error if any input lacks its source output or the sum does not
    /// fit in a u64.
    pub fn total_input_satoshis(&self) -> Result<u64, TransactionError> {
        self.inputs.iter().try_fold(0u64, |total, input| {
            let sats = input.source_tx_satoshis().ok_or_else(|| {
                TransactionError::InvalidTransaction(format!(
                    "missing source output for input {}:{}",
                    input.source_txid_hex(),
                    input.source_tx_out_index
                ))
            })?;
            total.checked_add(sats).ok_or_else(|| {
                TransactionError::InvalidTransaction("input values overflow u64".to_string())
            })
        })
    }

    // -----------------------------------------------------------------
    // Size
    // -----------------------------------------------------------------

    /// Serialized size in bytes.
    pub fn size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Size once signed, assuming each unsigned input gets an unlocking
    /// script of `unlock_len` bytes.
    pub fn estimated_signed_size(&self, unlock_len: usize) -> usize {
        let inputs: usize = self
            .inputs
            .iter()
            .map(|input| {
                let script_len = input.unlocking_script.as_ref().map_or(unlock_len, Script::len);
                32 + 4 + VarInt::from(script_len).length() + script_len + 4
            })
            .sum();
        let outputs: usize = self
            .outputs
            .iter()
            .map(|o| 8 + VarInt::from(o.locking_script.len()).length() + o.locking_script.len())
            .sum();
        4 + VarInt::from(self.inputs.len()).length()
            + inputs
            + VarInt::from(self.outputs.len()).length()
            + outputs
            + 4
    }

    // -----------------------------------------------------------------
    // Signing
    // -----------------------------------------------------------------

    /// FORKID signature hash for an input, using its attached source output.
    pub fn calc_input_signature_hash(
        &self,
        input_index: usize,
        sighash_flag: u32,
    ) -> Result<[u8; 32], TransactionError> {
        let input = self.inputs.get(input_index).ok_or_else(|| {
            TransactionError::InvalidTransaction(format!(
                "input index {} out of range (tx has {} inputs)",
                input_index,
                self.inputs.len()
            ))
        })?;
        let source_output = input.source_tx_output().ok_or_else(|| {
            TransactionError::SigningError(format!(
                "missing source output for input {}",
                input_index
            ))
        })?;

        sighash::signature_hash(
            self,
            input_index,
            source_output.locking_script.to_bytes(),
            sighash_flag,
            source_output.satoshis,
        )
    }

    /// Sign one input with `template` and store the unlocking script.
    pub fn sign_input<T: UnlockingScriptTemplate>(
        &mut self,
        input_index: usize,
        template: &T,
    ) -> Result<(), TransactionError> {
        let script = template.sign(self, input_index as u32)?;
        self.inputs[input_index].unlocking_script = Some(script);
        Ok(())
    }

    /// Sign every input as P2PKH, `keys[i]` signing input `i`.
    pub fn sign_all(&mut self, keys: &[PrivateKey]) -> Result<(), TransactionError> {
        if keys.len() != self.inputs.len() {
            return Err(TransactionError::SigningError(format!(
                "{} keys for {} inputs",
                keys.len(),
                self.inputs.len()
            )));
        }
        for (i, key) in keys.iter().enumerate() {
            self.sign_input(i, &p2pkh::unlock(key.clone(), None))?;
        }
        Ok(())
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
