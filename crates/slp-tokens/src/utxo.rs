//! Spendable outputs and their SLP judgement.

use serde::{Deserialize, Serialize};

use slp_primitives::PrivateKey;
use slp_script::Script;

use crate::message::TokenType;
use crate::TokenId;

/// An unspent output as reported by an indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Display-order hex txid of the transaction holding the output.
    pub txid: String,
    /// Index of the output.
    pub vout: u32,
    /// Value in satoshis.
    pub satoshis: u64,
    /// Locking script of the output.
    pub script: Script,
    /// Block height, `None` while unconfirmed.
    pub height: Option<u32>,
    /// Number of confirmations.
    pub confirmations: u32,
}

impl Utxo {
    /// `txid:vout`, the form used in logs and error messages.
    pub fn outpoint(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }
}

/// What an output means to the SLP protocol, decided from the message in
/// output 0 of the transaction that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UtxoJudgement {
    /// Plain BCH; safe to spend as fee funding.
    NotSlp,
    /// Holds tokens from a valid SLP transaction.
    SlpToken,
    /// Holds the mint baton of a valid GENESIS or MINT.
    SlpBaton,
    /// Would hold tokens, but the parent transaction is not SLP-valid.
    InvalidToken,
    /// Would hold a baton, but the parent transaction is not SLP-valid.
    InvalidBaton,
    /// The parent carries a token type this crate cannot interpret.
    UnknownTokenType,
}

/// Token details carried by a judged output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenData {
    /// The token the output belongs to.
    pub token_id: TokenId,
    /// Type of that token.
    pub token_type: TokenType,
    /// Base units held; zero for a baton.
    pub amount: u64,
    /// `GENESIS`, `MINT` or `SEND`: how the parent created the output.
    pub transaction_type: String,
}

/// An output together with its judgement and, once selected for spending,
/// the key that signs for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlpUtxo {
    /// The underlying output.
    #[serde(flatten)]
    pub utxo: Utxo,
    /// The output's SLP classification.
    pub judgement: UtxoJudgement,
    /// Token details for token, baton and invalid outputs.
    pub token: Option<TokenData>,
    /// Signing key, attached before the output is spent.
    #[serde(skip)]
    pub signing_key: Option<PrivateKey>,
}

impl SlpUtxo {
    /// Wrap an output with a judgement and no key.
    pub fn new(utxo: Utxo, judgement: UtxoJudgement, token: Option<TokenData>) -> Self {
        Self {
            utxo,
            judgement,
            token,
            signing_key: None,
        }
    }

    /// Attach the key that signs for this output.
    pub fn with_signing_key(mut self, key: PrivateKey) -> Self {
        self.signing_key = Some(key);
        self
    }

    /// Token base units held; zero for anything but a token output.
    pub fn token_amount(&self) -> u64 {
        match (&self.judgement, &self.token) {
            (UtxoJudgement::SlpToken, Some(token)) => token.amount,
            _ => 0,
        }
    }

    /// The token id, when the output belongs to one.
    pub fn token_id(&self) -> Option<TokenId> {
        self.token.as_ref().map(|t| t.token_id)
    }
}
