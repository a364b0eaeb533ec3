//! Command line and config file handling.
//!
//! Values come from, in increasing priority: built-in defaults, the TOML
//! file named by `--config`, then command line flags. Secrets may also come
//! from `SLP_SEND_MNEMONIC`, `SLP_SEND_WIF` and `SLP_SEND_API_KEY`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use serde::Deserialize;

use slp_primitives::DerivationPath;
use slp_rest::RestConfig;
use slp_script::Network;
use slp_tokens::{TokenId, DEFAULT_FEE_RATE};

/// BIP-44 account path for Bitcoin Cash (coin type 145).
pub const DEFAULT_ACCOUNT_PATH: &str = "m/44'/145'/0'";

/// First receiving address below the account.
pub const DEFAULT_ADDRESS_PATH: &str = "0/0";

/// Send SLP tokens from an HD wallet.
#[derive(Debug, Default, Parser)]
#[command(name = "slp-send", version, about)]
pub struct Cli {
    /// TOML file with any of the options below.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// `mainnet` or `testnet`.
    #[arg(long)]
    pub network: Option<String>,

    /// BIP-39 seed phrase of the wallet.
    #[arg(long, env = "SLP_SEND_MNEMONIC", hide_env_values = true)]
    pub mnemonic: Option<String>,

    /// WIF key that signs every input; overrides the derived key.
    #[arg(long, env = "SLP_SEND_WIF", hide_env_values = true)]
    pub wif: Option<String>,

    /// Address whose outputs fund the send; defaults to the signing key's.
    #[arg(long)]
    pub funding_address: Option<String>,

    /// Id of the token to send.
    #[arg(long)]
    pub token_id: Option<String>,

    /// SLP address to send to; repeat once per amount.
    #[arg(long = "to")]
    pub to: Vec<String>,

    /// Display amount to send, e.g. `12.5`; repeat once per receiver.
    #[arg(long = "amount")]
    pub amounts: Vec<String>,

    /// SLP address for token and BCH change; defaults to the signing key's.
    #[arg(long)]
    pub change_address: Option<String>,

    /// Fee rate in satoshis per byte.
    #[arg(long)]
    pub fee_rate: Option<f64>,

    /// BIP-32 account path.
    #[arg(long)]
    pub derivation_path: Option<String>,

    /// Path of the address below the account.
    #[arg(long)]
    pub address_path: Option<String>,

    /// Base URL of the REST API.
    #[arg(long)]
    pub rest_url: Option<String>,

    /// REST API key.
    #[arg(long, env = "SLP_SEND_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Build and sign, print the raw transaction, do not broadcast.
    #[arg(long)]
    pub dry_run: bool,
}

/// The config file; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub network: Option<String>,
    pub mnemonic: Option<String>,
    pub wif: Option<String>,
    pub funding_address: Option<String>,
    pub token_id: Option<String>,
    pub to: Vec<String>,
    pub amounts: Vec<String>,
    pub change_address: Option<String>,
    pub fee_rate: Option<f64>,
    pub derivation_path: Option<String>,
    pub address_path: Option<String>,
    pub rest_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct SendConfig {
    pub network: Network,
    pub mnemonic: Option<String>,
    pub wif: Option<String>,
    pub funding_address: Option<String>,
    pub token_id: TokenId,
    pub receivers: Vec<String>,
    pub amounts: Vec<String>,
    pub change_address: Option<String>,
    pub fee_rate: f64,
    pub account_path: DerivationPath,
    pub address_path: DerivationPath,
    pub rest: RestConfig,
    pub dry_run: bool,
}

impl SendConfig {
    /// Read the config file named by `cli`, if any, and resolve.
    pub fn load(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge flags over file values and validate the result.
    pub fn resolve(cli: Cli, file: FileConfig) -> anyhow::Result<Self> {
        let network: Network = match cli.network.or(file.network) {
            Some(name) => name.parse().with_context(|| format!("unknown network '{name}'"))?,
            None => Network::Mainnet,
        };

        let mnemonic = cli.mnemonic.or(file.mnemonic);
        let wif = cli.wif.or(file.wif);
        if mnemonic.is_none() && wif.is_none() {
            bail!("a mnemonic or a WIF is required (--mnemonic / SLP_SEND_MNEMONIC or --wif / SLP_SEND_WIF)");
        }

        let token_id = cli
            .token_id
            .or(file.token_id)
            .context("--token-id is required")?;
        let token_id = TokenId::from_hex(&token_id)?;

        let receivers = if cli.to.is_empty() { file.to } else { cli.to };
        let amounts = if cli.amounts.is_empty() { file.amounts } else { cli.amounts };
        if receivers.is_empty() {
            bail!("at least one --to receiver is required");
        }
        if receivers.len() != amounts.len() {
            bail!("{} receivers but {} amounts", receivers.len(), amounts.len());
        }

        let fee_rate = cli.fee_rate.or(file.fee_rate).unwrap_or(DEFAULT_FEE_RATE);
        if !fee_rate.is_finite() || fee_rate < 0.0 {
            bail!("fee rate must be a non-negative number, got {fee_rate}");
        }

        let account_path: DerivationPath = cli
            .derivation_path
            .or(file.derivation_path)
            .as_deref()
            .unwrap_or(DEFAULT_ACCOUNT_PATH)
            .parse()?;
        let address_path: DerivationPath = cli
            .address_path
            .or(file.address_path)
            .as_deref()
            .unwrap_or(DEFAULT_ADDRESS_PATH)
            .parse()?;
        if address_path.is_absolute() {
            bail!("address path {address_path} must be relative to the account");
        }

        let mut rest = match network {
            Network::Mainnet => RestConfig::mainnet(),
            Network::Testnet => RestConfig::testnet(),
        };
        if let Some(url) = cli.rest_url.or(file.rest_url) {
            rest.base_url = url;
        }
        rest.api_key = cli.api_key.or(file.api_key);
        if let Some(secs) = file.timeout_secs {
            rest.timeout = Some(Duration::from_secs(secs));
        }

        Ok(Self {
            network,
            mnemonic,
            wif,
            funding_address: cli.funding_address.or(file.funding_address),
            token_id,
            receivers,
            amounts,
            change_address: cli.change_address.or(file.change_address),
            fee_rate,
            account_path,
            address_path,
            rest,
            dry_run: cli.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98";

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["slp-send"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn file(toml_src: &str) -> FileConfig {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn flags_only() {
        let config = SendConfig::resolve(
            cli(&[
                "--wif", "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn",
                "--token-id", TOKEN,
                "--to", "simpleledger:qr95sy3j9xwd2ap32xkykttr4cvcu7as4yu0kfhhmt",
                "--amount", "1.5",
            ]),
            FileConfig::default(),
        )
        .unwrap();

        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.token_id.to_hex(), TOKEN);
        assert_eq!(config.amounts, vec!["1.5"]);
        assert_eq!(config.fee_rate, DEFAULT_FEE_RATE);
        assert_eq!(config.account_path.to_string(), DEFAULT_ACCOUNT_PATH);
        assert_eq!(config.rest.base_url, "https://rest.bitcoin.com/v2");
        assert!(!config.dry_run);
    }

    #[test]
    fn flags_override_file() {
        let file = file(
            r#"
            network = "testnet"
            mnemonic = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about"
            token_id = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98"
            to = ["slptest:a", "slptest:b"]
            amounts = ["1", "2"]
            fee_rate = 2.0
            rest_url = "http://localhost:3000/v2"
            timeout_secs = 5
            "#,
        );
        let config = SendConfig::resolve(cli(&["--fee-rate", "1.1", "--dry-run"]), file).unwrap();

        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.fee_rate, 1.1);
        assert_eq!(config.receivers.len(), 2);
        assert_eq!(config.rest.base_url, "http://localhost:3000/v2");
        assert_eq!(config.rest.timeout, Some(Duration::from_secs(5)));
        assert!(config.dry_run);
    }

    #[test]
    fn testnet_preset_url() {
        let config = SendConfig::resolve(
            cli(&["--network", "testnet", "--wif", "x", "--token-id", TOKEN, "--to", "a", "--amount", "1"]),
            FileConfig::default(),
        )
        .unwrap();
        assert_eq!(config.rest.base_url, "https://trest.bitcoin.com/v2");
    }

    #[test]
    fn requires_a_secret() {
        // built directly so SLP_SEND_* variables in the environment cannot fill it in
        let no_secret = || Cli {
            token_id: Some(TOKEN.to_string()),
            to: vec!["a".into()],
            amounts: vec!["1".into()],
            ..Cli::default()
        };
        let err = SendConfig::resolve(no_secret(), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("mnemonic or a WIF"));

        let from_file = FileConfig {
            mnemonic: Some("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about".into()),
            ..FileConfig::default()
        };
        let config = SendConfig::resolve(no_secret(), from_file).unwrap();
        assert!(config.mnemonic.is_some());
        assert!(config.wif.is_none());
    }

    #[test]
    fn receivers_and_amounts_must_pair() {
        let result = SendConfig::resolve(
            cli(&["--wif", "x", "--token-id", TOKEN, "--to", "a", "--to", "b", "--amount", "1"]),
            FileConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_bad_values() {
        let base = ["--wif", "x", "--to", "a", "--amount", "1"];

        let mut args = base.to_vec();
        args.extend(["--token-id", "abcd"]);
        assert!(SendConfig::resolve(cli(&args), FileConfig::default()).is_err());

        let mut args = base.to_vec();
        args.extend(["--token-id", TOKEN, "--address-path", "m/0/0"]);
        assert!(SendConfig::resolve(cli(&args), FileConfig::default()).is_err());

        let mut args = base.to_vec();
        args.extend(["--token-id", TOKEN, "--network", "regtest"]);
        assert!(SendConfig::resolve(cli(&args), FileConfig::default()).is_err());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("recipient = \"x\"").is_err());
    }
}
