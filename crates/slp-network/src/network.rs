//! The SLP network client.

use std::collections::{BTreeMap, BTreeSet};

use slp_rest::{RestClient, RestConfig, RestError};
use slp_script::{Address, Network, Script};
use slp_tokens::{
    build_send_transaction, classify_utxo, ParentMessage, SendRequest, SlpBalancesResult,
    SlpMessage, SlpUtxo, TokenId, TokenType, Utxo, UtxoJudgement, DEFAULT_FEE_RATE,
};
use slp_transaction::Transaction;
use tracing::{debug, info, warn};

use crate::error::NetworkError;
use crate::validator::{RemoteValidator, SlpValidator};

/// Metadata of a token, read from its GENESIS transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// The token id (the genesis txid).
    pub token_id: TokenId,
    /// The token type.
    pub token_type: TokenType,
    /// Ticker symbol.
    pub ticker: String,
    /// Token name.
    pub name: String,
    /// Document URI.
    pub document_uri: String,
    /// Document hash, if committed.
    pub document_hash: Option<[u8; 32]>,
    /// Decimal precision of display amounts.
    pub decimals: u8,
    /// Output of the genesis holding the mint baton.
    pub mint_baton_vout: Option<u8>,
    /// Base units created by the genesis.
    pub initial_quantity: u64,
}

/// Token info, balances and token sends over the REST API.
#[derive(Debug, Clone)]
pub struct SlpNetwork<V: SlpValidator> {
    client: RestClient,
    validator: V,
    network: Network,
    fee_rate: f64,
}

impl SlpNetwork<RemoteValidator> {
    /// A client whose validator is the same REST API.
    pub fn remote(config: RestConfig, network: Network) -> Result<Self, NetworkError> {
        let client = RestClient::new(config)?;
        let validator = RemoteValidator::new(client.clone());
        Ok(Self::new(client, validator, network))
    }
}

impl<V: SlpValidator> SlpNetwork<V> {
    /// Create a client from its parts.
    pub fn new(client: RestClient, validator: V, network: Network) -> Self {
        Self {
            client,
            validator,
            network,
            fee_rate: DEFAULT_FEE_RATE,
        }
    }

    /// Fee rate, in satoshis per byte, for `simple_token_send`.
    pub fn with_fee_rate(mut self, fee_rate: f64) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// The network addresses are expected on.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The validator in use.
    pub fn validator(&self) -> &V {
        &self.validator
    }

    // -----------------------------------------------------------------
    // Token information
    // -----------------------------------------------------------------

    /// Fetch and parse a token's GENESIS.
    ///
    /// # Returns
    /// `NotGenesis` when the transaction's output 0 is anything but a
    /// GENESIS, or when its txid differs from `token_id`.
    pub async fn get_token_information(&self, token_id: &TokenId) -> Result<TokenInfo, NetworkError> {
        let hexes = self.client.raw_transactions(&[token_id.to_hex()]).await?;
        let hex = hexes.first().ok_or_else(|| NetworkError::NotGenesis {
            token_id: token_id.to_hex(),
            reason: "transaction not found".into(),
        })?;
        let tx = Transaction::from_hex(hex)?;

        let not_genesis = |reason: String| NetworkError::NotGenesis {
            token_id: token_id.to_hex(),
            reason,
        };
        if tx.tx_id_hex() != token_id.to_hex() {
            return Err(not_genesis(format!("API returned transaction {}", tx.tx_id_hex())));
        }
        let output = tx
            .outputs
            .first()
            .ok_or_else(|| not_genesis("transaction has no outputs".into()))?;

        let message = SlpMessage::parse(&output.locking_script)
            .map_err(|e| not_genesis(e.to_string()))?;
        match message {
            SlpMessage::Genesis {
                token_type,
                ticker,
                name,
                document_uri,
                document_hash,
                decimals,
                mint_baton_vout,
                initial_quantity,
            } => {
                let info = TokenInfo {
                    token_id: *token_id,
                    token_type,
                    ticker,
                    name,
                    document_uri,
                    document_hash,
                    decimals,
                    mint_baton_vout,
                    initial_quantity,
                };
                debug!(token_id = %token_id, ticker = %info.ticker, decimals, "token information");
                Ok(info)
            }
            other => Err(not_genesis(format!("output 0 is a {}", other.transaction_type()))),
        }
    }

    // -----------------------------------------------------------------
    // Balances
    // -----------------------------------------------------------------

    /// All outputs of an address, judged, with token balances.
    ///
    /// # Arguments
    /// * `address` - Any supported address format.
    pub async fn get_all_slp_balances_and_utxos(
        &self,
        address: &str,
    ) -> Result<SlpBalancesResult, NetworkError> {
        let cash_address = Address::from_string(address)?.to_cash_address();
        let response = self.client.utxos(&cash_address).await?;
        let script = Script::from_hex(&response.script_pub_key)?;

        let utxos: Vec<Utxo> = response
            .utxos
            .into_iter()
            .map(|u| Utxo {
                txid: u.txid.to_ascii_lowercase(),
                vout: u.vout,
                satoshis: u.satoshis,
                script: script.clone(),
                height: u.height,
                confirmations: u.confirmations,
            })
            .collect();

        let parents = self.fetch_parent_messages(&utxos).await?;

        let slp_parents: Vec<String> = parents
            .iter()
            .filter(|(_, parent)| matches!(parent, ParentMessage::Slp(_)))
            .map(|(txid, _)| txid.clone())
            .collect();
        let valid: BTreeSet<String> = self
            .validator
            .validate_slp_transactions(&slp_parents)
            .await?
            .into_iter()
            .collect();

        let judged = utxos.into_iter().map(|utxo| {
            let parent_valid = valid.contains(&utxo.txid);
            match parents.get(&utxo.txid) {
                Some(parent) => classify_utxo(utxo, parent, parent_valid),
                None => classify_utxo(utxo, &ParentMessage::NotSlp, false),
            }
        });
        let result = SlpBalancesResult::from_judged(judged);

        info!(
            address = %cash_address,
            bch = result.satoshis_available_bch,
            tokens = result.slp_token_balances.len(),
            invalid = result.invalid_token_utxos.len() + result.invalid_baton_utxos.len(),
            "balances loaded"
        );
        Ok(result)
    }

    /// Output 0 of every distinct parent transaction, keyed by txid.
    ///
    /// Parents are matched by their computed txid, never by position in
    /// the response. A requested parent missing from the response is an
    /// error: judging its output as plain BCH could burn tokens.
    async fn fetch_parent_messages(
        &self,
        utxos: &[Utxo],
    ) -> Result<BTreeMap<String, ParentMessage>, NetworkError> {
        let txids: Vec<String> = utxos
            .iter()
            .map(|u| u.txid.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let hexes = self.client.raw_transactions(&txids).await?;

        let mut parents = BTreeMap::new();
        for hex in hexes {
            let tx = Transaction::from_hex(&hex)?;
            let parent = tx
                .outputs
                .first()
                .map(|output| ParentMessage::from_script(&output.locking_script))
                .unwrap_or(ParentMessage::NotSlp);
            parents.insert(tx.tx_id_hex(), parent);
        }

        if let Some(missing) = txids.iter().find(|txid| !parents.contains_key(*txid)) {
            return Err(RestError::UnexpectedResponse(format!(
                "parent transaction {missing} missing from getRawTransaction response"
            ))
            .into());
        }
        Ok(parents)
    }

    // -----------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------

    /// Check token inputs with the validator, then build and sign.
    ///
    /// # Returns
    /// The signed transaction, not yet broadcast, or `InvalidInput` for a
    /// token input whose parent the validator rejects.
    pub async fn prepare_token_send(&self, request: &SendRequest) -> Result<Transaction, NetworkError> {
        for input in &request.inputs {
            if input.judgement == UtxoJudgement::SlpToken
                && !self.validator.is_valid_slp_txid(&input.utxo.txid).await?
            {
                return Err(NetworkError::InvalidInput(input.utxo.outpoint()));
            }
        }
        Ok(build_send_transaction(request)?)
    }

    /// Send tokens and broadcast.
    ///
    /// # Arguments
    /// * `token_id` - The token to send.
    /// * `send_amounts` - Base units per receiver.
    /// * `inputs` - Outputs to spend, each with a signing key attached.
    /// * `token_receivers` - SLP addresses, one per amount.
    /// * `change_receiver` - SLP address for token and BCH change.
    ///
    /// # Returns
    /// The txid of the broadcast transaction.
    pub async fn simple_token_send(
        &self,
        token_id: &TokenId,
        send_amounts: Vec<u64>,
        inputs: Vec<SlpUtxo>,
        token_receivers: Vec<String>,
        change_receiver: &str,
    ) -> Result<String, NetworkError> {
        let mut request = SendRequest::new(*token_id, send_amounts, inputs, token_receivers, change_receiver);
        request.fee_rate = self.fee_rate;
        let tx = self.prepare_token_send(&request).await?;
        self.send_tx(&tx).await
    }

    /// Broadcast a signed transaction.
    ///
    /// # Returns
    /// The txid reported by the node.
    pub async fn send_tx(&self, tx: &Transaction) -> Result<String, NetworkError> {
        let txid = self.client.send_raw_transaction(&tx.to_hex()).await?;
        let expected = tx.tx_id_hex();
        if txid != expected {
            warn!(reported = %txid, computed = %expected, "node reported an unexpected txid");
        }
        info!(%txid, size = tx.size(), "broadcast");
        Ok(txid)
    }
}
