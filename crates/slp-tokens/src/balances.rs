//! UTXO judgement and balance aggregation.
//!
//! An output's meaning comes from output 0 of its parent transaction: a
//! SEND assigns amounts to outputs `1..=n`, a GENESIS or MINT puts the new
//! tokens at output 1 and may put a mint baton at a later output. Whether
//! those tokens are real depends on the parent's SLP validity, which is
//! decided elsewhere and passed in.

use std::collections::BTreeMap;

use serde::Serialize;

use slp_script::Script;

use crate::message::SlpMessage;
use crate::utxo::{SlpUtxo, TokenData, Utxo, UtxoJudgement};
use crate::{TokenError, TokenId};

/// What output 0 of a parent transaction says about its other outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentMessage {
    /// No SLP message, or a malformed one.
    NotSlp,
    /// The SLP lokad id with a token type this crate cannot read.
    UnknownTokenType(u16),
    /// A well-formed SLP message.
    Slp(SlpMessage),
}

impl ParentMessage {
    /// Interpret the locking script of a parent's output 0.
    pub fn from_script(script: &Script) -> Self {
        match SlpMessage::parse(script) {
            Ok(message) => ParentMessage::Slp(message),
            Err(TokenError::UnsupportedTokenType(token_type)) => {
                ParentMessage::UnknownTokenType(token_type)
            }
            Err(_) => ParentMessage::NotSlp,
        }
    }

    /// The message, when there is one.
    pub fn message(&self) -> Option<&SlpMessage> {
        match self {
            ParentMessage::Slp(message) => Some(message),
            _ => None,
        }
    }
}

enum Role {
    Token(u64),
    Baton,
}

/// Judge a single output.
///
/// # Arguments
/// * `utxo` - The output being judged.
/// * `parent` - The message in output 0 of the transaction that created it.
/// * `parent_valid` - Whether that transaction is SLP-valid. Ignored unless
///   `parent` is an SLP message.
pub fn classify_utxo(utxo: Utxo, parent: &ParentMessage, parent_valid: bool) -> SlpUtxo {
    let message = match parent {
        ParentMessage::NotSlp => return SlpUtxo::new(utxo, UtxoJudgement::NotSlp, None),
        ParentMessage::UnknownTokenType(_) => {
            return SlpUtxo::new(utxo, UtxoJudgement::UnknownTokenType, None)
        }
        ParentMessage::Slp(message) => message,
    };

    let vout = utxo.vout;
    let (token_id, role) = match message {
        SlpMessage::Genesis {
            mint_baton_vout,
            initial_quantity,
            ..
        } => {
            let Ok(token_id) = TokenId::from_hex(&utxo.txid) else {
                return SlpUtxo::new(utxo, UtxoJudgement::NotSlp, None);
            };
            (token_id, issuance_role(vout, *mint_baton_vout, *initial_quantity))
        }
        SlpMessage::Mint {
            token_id,
            mint_baton_vout,
            additional_quantity,
            ..
        } => (*token_id, issuance_role(vout, *mint_baton_vout, *additional_quantity)),
        SlpMessage::Send {
            token_id, amounts, ..
        } => {
            let amount = (vout as usize)
                .checked_sub(1)
                .and_then(|i| amounts.get(i))
                .map(|amount| Role::Token(*amount));
            (*token_id, amount)
        }
    };

    let Some(role) = role else {
        return SlpUtxo::new(utxo, UtxoJudgement::NotSlp, None);
    };

    let (judgement, amount) = match (role, parent_valid) {
        (Role::Token(amount), true) => (UtxoJudgement::SlpToken, amount),
        (Role::Token(amount), false) => (UtxoJudgement::InvalidToken, amount),
        (Role::Baton, true) => (UtxoJudgement::SlpBaton, 0),
        (Role::Baton, false) => (UtxoJudgement::InvalidBaton, 0),
    };
    let token = TokenData {
        token_id,
        token_type: message.token_type(),
        amount,
        transaction_type: message.transaction_type().to_string(),
    };
    SlpUtxo::new(utxo, judgement, Some(token))
}

/// GENESIS and MINT: tokens at output 1, the baton wherever it was sent.
fn issuance_role(vout: u32, baton_vout: Option<u8>, quantity: u64) -> Option<Role> {
    if vout == 1 {
        Some(Role::Token(quantity))
    } else if baton_vout.map(u32::from) == Some(vout) {
        Some(Role::Baton)
    } else {
        None
    }
}

// -----------------------------------------------------------------------
// Aggregation
// -----------------------------------------------------------------------

/// Balances and outputs of an address, grouped by judgement.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlpBalancesResult {
    /// Satoshis in plain BCH outputs.
    pub satoshis_available_bch: u64,
    /// Satoshis locked in mint baton outputs.
    pub satoshis_in_slp_baton: u64,
    /// Satoshis locked in token outputs.
    pub satoshis_in_slp_token: u64,
    /// Satoshis in outputs whose token parent is invalid.
    pub satoshis_in_invalid_token_dag: u64,
    /// Satoshis in outputs whose baton parent is invalid.
    pub satoshis_in_invalid_baton_dag: u64,
    /// Satoshis in outputs of unknown token types.
    pub satoshis_in_unknown_token_type: u64,
    /// Base units held per token.
    pub slp_token_balances: BTreeMap<TokenId, u128>,
    /// Token outputs per token.
    pub slp_token_utxos: BTreeMap<TokenId, Vec<SlpUtxo>>,
    /// Baton outputs per token.
    pub slp_baton_utxos: BTreeMap<TokenId, Vec<SlpUtxo>>,
    /// Plain BCH outputs.
    pub non_slp_utxos: Vec<SlpUtxo>,
    /// Token outputs with an invalid parent.
    pub invalid_token_utxos: Vec<SlpUtxo>,
    /// Baton outputs with an invalid parent.
    pub invalid_baton_utxos: Vec<SlpUtxo>,
    /// Outputs of token types this crate cannot read.
    pub unknown_token_type_utxos: Vec<SlpUtxo>,
}

impl SlpBalancesResult {
    /// Group judged outputs and total their balances.
    pub fn from_judged(utxos: impl IntoIterator<Item = SlpUtxo>) -> Self {
        let mut result = Self::default();

        for slp in utxos {
            let sats = slp.utxo.satoshis;
            match (slp.judgement, slp.token_id()) {
                (UtxoJudgement::SlpToken, Some(token_id)) => {
                    result.satoshis_in_slp_token += sats;
                    *result.slp_token_balances.entry(token_id).or_default() +=
                        slp.token_amount() as u128;
                    result.slp_token_utxos.entry(token_id).or_default().push(slp);
                }
                (UtxoJudgement::SlpBaton, Some(token_id)) => {
                    result.satoshis_in_slp_baton += sats;
                    result.slp_baton_utxos.entry(token_id).or_default().push(slp);
                }
                (UtxoJudgement::InvalidToken, _) => {
                    result.satoshis_in_invalid_token_dag += sats;
                    result.invalid_token_utxos.push(slp);
                }
                (UtxoJudgement::InvalidBaton, _) => {
                    result.satoshis_in_invalid_baton_dag += sats;
                    result.invalid_baton_utxos.push(slp);
                }
                (UtxoJudgement::UnknownTokenType, _) => {
                    result.satoshis_in_unknown_token_type += sats;
                    result.unknown_token_type_utxos.push(slp);
                }
                // a token judgement without token data cannot be spent safely
                (UtxoJudgement::SlpToken | UtxoJudgement::SlpBaton, None) => {
                    result.satoshis_in_unknown_token_type += sats;
                    result.unknown_token_type_utxos.push(slp);
                }
                (UtxoJudgement::NotSlp, _) => {
                    result.satoshis_available_bch += sats;
                    result.non_slp_utxos.push(slp);
                }
            }
        }

        result
    }

    /// Base units of `token_id` held, zero when the address has none.
    pub fn balance_of(&self, token_id: &TokenId) -> u128 {
        self.slp_token_balances.get(token_id).copied().unwrap_or(0)
    }

    /// Inputs for sending `token_id`: every output of that token followed by
    /// every plain BCH output. Batons and other tokens are never included.
    pub fn send_inputs(&self, token_id: &TokenId) -> Vec<SlpUtxo> {
        self.slp_token_utxos
            .get(token_id)
            .into_iter()
            .flatten()
            .chain(self.non_slp_utxos.iter())
            .cloned()
            .collect()
    }
}
