//! `slp-send`: send SLP tokens from a seed-phrase wallet.
//!
//! Derives the wallet key, reads the token's GENESIS for its decimals,
//! loads the funding address's balances, scales the display amounts,
//! attaches the key to every spendable input and submits the send.

mod config;
mod logging;
mod plan;
mod wallet;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use slp_network::SlpNetwork;
use slp_tokens::SendRequest;

use crate::config::{Cli, SendConfig};
use crate::plan::{plan_send, SendPlan};
use crate::wallet::Wallet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let config = SendConfig::load(Cli::parse())?;
    run(config).await
}

async fn run(config: SendConfig) -> anyhow::Result<()> {
    // wallet
    let derived = match &config.mnemonic {
        Some(phrase) => Some(Wallet::from_mnemonic(
            phrase,
            &config.account_path,
            &config.address_path,
            config.network,
        )?),
        None => None,
    };
    if let Some(wallet) = &derived {
        info!(
            path = %format!("{}/{}", config.account_path, config.address_path),
            cash_address = %wallet.cash_address(),
            slp_address = %wallet.slp_address(),
            "wallet derived"
        );
    }
    let signer = match (&config.wif, derived) {
        (Some(wif), _) => Wallet::from_wif(wif, config.network)?,
        (None, Some(wallet)) => wallet,
        (None, None) => anyhow::bail!("no signing key configured"),
    };
    let funding_address = config
        .funding_address
        .clone()
        .unwrap_or_else(|| signer.cash_address());
    let change_address = config
        .change_address
        .clone()
        .unwrap_or_else(|| signer.slp_address());

    let network = SlpNetwork::remote(config.rest.clone(), config.network)
        .context("creating REST client")?
        .with_fee_rate(config.fee_rate);

    // token metadata
    let token = network.get_token_information(&config.token_id).await?;
    info!(
        token_id = %token.token_id,
        ticker = %token.ticker,
        name = %token.name,
        decimals = token.decimals,
        "token"
    );

    // balances
    let balances = network.get_all_slp_balances_and_utxos(&funding_address).await?;

    // scale amounts; every spendable output, signed by the one key
    let SendPlan { amounts, inputs } = plan_send(
        &token,
        &balances,
        &config.amounts,
        &funding_address,
        signer.key(),
    )?;

    if config.dry_run {
        let mut request = SendRequest::new(
            config.token_id,
            amounts,
            inputs,
            config.receivers.clone(),
            change_address,
        );
        request.fee_rate = config.fee_rate;
        let tx = network.prepare_token_send(&request).await?;
        info!(txid = %tx.tx_id_hex(), size = tx.size(), "dry run, not broadcast");
        println!("{}", tx.to_hex());
        return Ok(());
    }

    let txid = network
        .simple_token_send(
            &config.token_id,
            amounts,
            inputs,
            config.receivers.clone(),
            &change_address,
        )
        .await?;

    info!(%txid, "token send broadcast");
    println!("{txid}");
    Ok(())
}
