//! SEND transaction construction.
//!
//! # Transaction structure
//! - Inputs: the caller's outputs, in the order given, each signed P2PKH
//! - Output 0: the SEND OP_RETURN
//! - Outputs 1..=N: 546 sat to each token receiver
//! - Output N+1: 546 sat token change, when inputs hold more than is sent
//! - Extra BCH outputs, in the order given
//! - BCH change, when at least 546 sat remain after the fee

use slp_primitives::PrivateKey;
use slp_script::{Address, AddressFormat};
use slp_transaction::output::TransactionOutput;
use slp_transaction::template::p2pkh::ESTIMATED_UNLOCK_LEN;
use slp_transaction::Transaction;
use tracing::debug;

use crate::message::{build_send_script, TokenType, MAX_SEND_OUTPUTS};
use crate::utxo::{SlpUtxo, UtxoJudgement};
use crate::{TokenError, TokenId};

/// Value of every token-carrying output, and the smallest change output
/// worth creating.
pub const DUST_LIMIT: u64 = 546;

/// Fee rate used when none is given, in satoshis per byte.
pub const DEFAULT_FEE_RATE: f64 = 1.0;

/// A plain BCH payment added after the token outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BchOutput {
    /// Receiving address in any supported format.
    pub address: String,
    /// Value in satoshis.
    pub satoshis: u64,
}

/// Everything needed to build and sign a token send.
#[derive(Debug, Clone)]
pub struct SendRequest {
    /// The token being sent.
    pub token_id: TokenId,
    /// Base units per receiver.
    pub send_amounts: Vec<u64>,
    /// Outputs to spend; each needs a signing key.
    pub inputs: Vec<SlpUtxo>,
    /// SLP-format addresses, one per amount.
    pub token_receivers: Vec<String>,
    /// SLP-format address for token and BCH change.
    pub change_receiver: String,
    /// BCH payments placed after the token outputs.
    pub extra_outputs: Vec<BchOutput>,
    /// Satoshis per byte.
    pub fee_rate: f64,
}

impl SendRequest {
    /// A request with no extra outputs and the default fee rate.
    pub fn new(
        token_id: TokenId,
        send_amounts: Vec<u64>,
        inputs: Vec<SlpUtxo>,
        token_receivers: Vec<String>,
        change_receiver: impl Into<String>,
    ) -> Self {
        Self {
            token_id,
            send_amounts,
            inputs,
            token_receivers,
            change_receiver: change_receiver.into(),
            extra_outputs: Vec::new(),
            fee_rate: DEFAULT_FEE_RATE,
        }
    }
}

/// Build and sign a SEND transaction.
///
/// # Returns
/// The signed transaction, or
/// - `InvalidOutputCount` / `InvalidReceiver` for a malformed request
/// - `InvalidInput` for an input that is not spendable by this send
/// - `InsufficientTokens` when token inputs hold less than is sent
/// - `InsufficientFunds` when the inputs cannot cover outputs and fee
pub fn build_send_transaction(request: &SendRequest) -> Result<Transaction, TokenError> {
    if request.send_amounts.is_empty() {
        return Err(TokenError::InvalidOutputCount("no send amounts".into()));
    }
    if request.token_receivers.len() != request.send_amounts.len() {
        return Err(TokenError::InvalidOutputCount(format!(
            "{} receivers for {} amounts",
            request.token_receivers.len(),
            request.send_amounts.len()
        )));
    }
    if !request.fee_rate.is_finite() || request.fee_rate < 0.0 {
        return Err(TokenError::InvalidAmount {
            amount: request.fee_rate.to_string(),
            reason: "fee rate must be a non-negative number".into(),
        });
    }

    let receivers = request
        .token_receivers
        .iter()
        .map(|r| parse_slp_address(r))
        .collect::<Result<Vec<_>, _>>()?;
    let change_address = parse_slp_address(&request.change_receiver)?;

    let (keys, token_type, token_in) = check_inputs(request)?;

    let needed: u128 = request.send_amounts.iter().map(|&a| a as u128).sum();
    if token_in < needed {
        return Err(TokenError::InsufficientTokens {
            needed,
            available: token_in,
        });
    }

    let mut amounts = request.send_amounts.clone();
    let token_change = token_in - needed;
    if token_change > 0 {
        let change = u64::try_from(token_change).map_err(|_| TokenError::InvalidAmount {
            amount: token_change.to_string(),
            reason: "token change exceeds 64 bits".into(),
        })?;
        amounts.push(change);
    }
    if amounts.len() > MAX_SEND_OUTPUTS {
        return Err(TokenError::InvalidOutputCount(format!(
            "{} token outputs including change, at most {}",
            amounts.len(),
            MAX_SEND_OUTPUTS
        )));
    }

    let mut tx = Transaction::new();
    for input in &request.inputs {
        tx.add_input_from(
            &input.utxo.txid,
            input.utxo.vout,
            input.utxo.script.clone(),
            input.utxo.satoshis,
        )?;
    }

    tx.add_output(TransactionOutput::new(
        0,
        build_send_script(token_type, &request.token_id, &amounts)?,
    ));
    for receiver in &receivers {
        tx.add_output(TransactionOutput::new(DUST_LIMIT, receiver.locking_script()));
    }
    if token_change > 0 {
        tx.add_output(TransactionOutput::new(DUST_LIMIT, change_address.locking_script()));
    }
    for extra in &request.extra_outputs {
        let address = Address::from_string(&extra.address)?;
        tx.add_output(TransactionOutput::new(extra.satoshis, address.locking_script()));
    }

    add_bch_change(&mut tx, &change_address, request.fee_rate)?;

    tx.sign_all(&keys)?;
    debug!(
        token_id = %request.token_id,
        inputs = tx.input_count(),
        outputs = tx.output_count(),
        size = tx.size(),
        "built SLP send"
    );
    Ok(tx)
}

/// Parse an address that must be written in the SLP format.
fn parse_slp_address(addr: &str) -> Result<Address, TokenError> {
    match Address::parse_with_format(addr) {
        Ok((address, AddressFormat::Slp)) => Ok(address),
        Ok(_) => Err(TokenError::InvalidReceiver(format!("{addr} is not an SLP address"))),
        Err(e) => Err(TokenError::InvalidReceiver(format!("{addr}: {e}"))),
    }
}

/// Check every input and collect the signing keys, the token type, and
/// the token base units the inputs hold.
fn check_inputs(
    request: &SendRequest,
) -> Result<(Vec<PrivateKey>, TokenType, u128), TokenError> {
    let mut keys = Vec::with_capacity(request.inputs.len());
    let mut token_type = None;
    let mut token_in: u128 = 0;

    for input in &request.inputs {
        let reject = |reason: &str| TokenError::InvalidInput {
            txid: input.utxo.txid.clone(),
            vout: input.utxo.vout,
            reason: reason.to_string(),
        };

        match (input.judgement, &input.token) {
            (UtxoJudgement::NotSlp, _) => {}
            (UtxoJudgement::SlpToken, Some(token)) if token.token_id == request.token_id => {
                token_in += token.amount as u128;
                token_type.get_or_insert(token.token_type);
            }
            (UtxoJudgement::SlpToken, _) => return Err(reject("holds a different token")),
            (UtxoJudgement::SlpBaton, _) => return Err(reject("spending it would burn a mint baton")),
            (UtxoJudgement::InvalidToken | UtxoJudgement::InvalidBaton, _) => {
                return Err(reject("parent is not a valid SLP transaction"))
            }
            (UtxoJudgement::UnknownTokenType, _) => return Err(reject("unknown token type")),
        }

        let key = input
            .signing_key
            .clone()
            .ok_or_else(|| reject("no signing key attached"))?;
        keys.push(key);
    }

    Ok((keys, token_type.unwrap_or(TokenType::Fungible), token_in))
}

fn fee_for(tx: &Transaction, fee_rate: f64) -> u64 {
    let size = tx.estimated_signed_size(ESTIMATED_UNLOCK_LEN as usize);
    (size as f64 * fee_rate).ceil() as u64
}

/// Pay the fee and return what is left to `change_address`, dropping the
/// change output when it would be dust.
fn add_bch_change(
    tx: &mut Transaction,
    change_address: &Address,
    fee_rate: f64,
) -> Result<(), TokenError> {
    let available = tx.total_input_satoshis()?;
    let spent = tx.total_output_satoshis()?;

    let fee_without_change = fee_for(tx, fee_rate);
    let needed = spent
        .checked_add(fee_without_change)
        .ok_or_else(|| TokenError::InvalidAmount {
            amount: spent.to_string(),
            reason: format!("outputs plus a {fee_without_change} sat fee overflow u64"),
        })?;
    if available < needed {
        return Err(TokenError::InsufficientFunds { needed, available });
    }

    tx.add_output(TransactionOutput::new(0, change_address.locking_script()));
    let fee_with_change = fee_for(tx, fee_rate);
    let mut change = available.saturating_sub(spent.saturating_add(fee_with_change));
    if change >= DUST_LIMIT {
        if let Some(output) = tx.outputs.last_mut() {
            output.satoshis = change;
        }
    } else {
        tx.outputs.pop();
        change = 0;
    }
    debug!(available, spent, change, fee = available - spent - change, "fee settled");
    Ok(())
}
