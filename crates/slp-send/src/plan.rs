//! Turning a balance lookup into the amounts and inputs of a send.

use slp_network::TokenInfo;
use slp_primitives::PrivateKey;
use slp_tokens::{format_base_units, to_base_units, SlpBalancesResult, SlpUtxo, TokenError};
use tracing::{info, warn};

/// Base-unit amounts and signed-for inputs, ready for `simple_token_send`.
#[derive(Debug)]
pub struct SendPlan {
    pub amounts: Vec<u64>,
    pub inputs: Vec<SlpUtxo>,
}

/// Scale `display_amounts` by the token's decimals and pick every output
/// that can fund the send, each carrying `key`.
///
/// # Returns
/// `InsufficientTokens` with `available: 0` when `address` holds none of
/// the token, or `InvalidAmount` for an amount the token cannot represent.
pub fn plan_send(
    token: &TokenInfo,
    balances: &SlpBalancesResult,
    display_amounts: &[String],
    address: &str,
    key: &PrivateKey,
) -> Result<SendPlan, TokenError> {
    let amounts = display_amounts
        .iter()
        .map(|amount| to_base_units(amount, token.decimals))
        .collect::<Result<Vec<u64>, _>>()?;
    let needed: u128 = amounts.iter().map(|&a| u128::from(a)).sum();

    let balance = balances.balance_of(&token.token_id);
    if balance == 0 {
        warn!(
            %address,
            token_id = %token.token_id,
            ticker = %token.ticker,
            "you need to have some of this token in the funding address"
        );
        return Err(TokenError::InsufficientTokens {
            needed,
            available: 0,
        });
    }
    info!(
        ticker = %token.ticker,
        balance = %format_base_units(balance, token.decimals),
        sending = %format_base_units(needed, token.decimals),
        "token balance"
    );

    let inputs: Vec<SlpUtxo> = balances
        .send_inputs(&token.token_id)
        .into_iter()
        .map(|utxo| utxo.with_signing_key(key.clone()))
        .collect();
    info!(inputs = inputs.len(), "inputs selected");

    Ok(SendPlan { amounts, inputs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use slp_script::{Address, Network};
    use slp_tokens::{TokenData, TokenId, TokenType, Utxo, UtxoJudgement};

    fn key() -> PrivateKey {
        PrivateKey::from_hex(&format!("{:064x}", 3)).unwrap()
    }

    fn token(id_byte: u8) -> TokenInfo {
        TokenInfo {
            token_id: TokenId::from_bytes([id_byte; 32]),
            token_type: TokenType::Fungible,
            ticker: "TST".into(),
            name: "Test".into(),
            document_uri: String::new(),
            document_hash: None,
            decimals: 2,
            mint_baton_vout: None,
            initial_quantity: 1_000_000,
        }
    }

    fn utxo(txid_byte: &str, satoshis: u64) -> Utxo {
        Utxo {
            txid: txid_byte.repeat(32),
            vout: 1,
            satoshis,
            script: Address::from_public_key(&key().pub_key(), Network::Mainnet).locking_script(),
            height: Some(700_000),
            confirmations: 1,
        }
    }

    fn token_utxo(txid_byte: &str, token: &TokenInfo, amount: u64) -> SlpUtxo {
        SlpUtxo::new(
            utxo(txid_byte, 546),
            UtxoJudgement::SlpToken,
            Some(TokenData {
                token_id: token.token_id,
                token_type: token.token_type,
                amount,
                transaction_type: "SEND".into(),
            }),
        )
    }

    fn plain_utxo(txid_byte: &str, satoshis: u64) -> SlpUtxo {
        SlpUtxo::new(utxo(txid_byte, satoshis), UtxoJudgement::NotSlp, None)
    }

    #[test]
    fn missing_balance_stops_with_insufficient_tokens() {
        let wanted = token(1);
        let other = token(2);
        let balances = SlpBalancesResult::from_judged(vec![
            token_utxo("aa", &other, 500),
            plain_utxo("bb", 20_000),
        ]);

        let result = plan_send(&wanted, &balances, &["1.5".to_string()], "simpleledger:q", &key());
        match result {
            Err(TokenError::InsufficientTokens { needed, available }) => {
                assert_eq!(needed, 150);
                assert_eq!(available, 0);
            }
            other => panic!("expected InsufficientTokens, got {other:?}"),
        }
    }

    #[test]
    fn amounts_are_scaled_and_inputs_signed() {
        let wanted = token(1);
        let balances = SlpBalancesResult::from_judged(vec![
            token_utxo("aa", &wanted, 300),
            token_utxo("cc", &token(2), 900),
            plain_utxo("bb", 20_000),
        ]);

        let amounts = ["1.5".to_string(), "0.25".to_string()];
        let plan = plan_send(&wanted, &balances, &amounts, "simpleledger:q", &key()).unwrap();

        assert_eq!(plan.amounts, vec![150, 25]);
        // the wanted token's output, then plain BCH; the other token is left alone
        let txids: Vec<&str> = plan.inputs.iter().map(|i| &i.utxo.txid[..2]).collect();
        assert_eq!(txids, vec!["aa", "bb"]);
        assert!(plan.inputs.iter().all(|i| i.signing_key.as_ref() == Some(&key())));
    }

    #[test]
    fn excess_precision_is_rejected() {
        let wanted = token(1);
        let balances = SlpBalancesResult::from_judged(vec![token_utxo("aa", &wanted, 300)]);
        let result = plan_send(&wanted, &balances, &["0.001".to_string()], "simpleledger:q", &key());
        assert!(matches!(result, Err(TokenError::InvalidAmount { .. })));
    }
}
