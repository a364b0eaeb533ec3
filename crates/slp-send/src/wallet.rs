//! Signing key and addresses for the send.

use anyhow::Context;
use slp_primitives::mnemonic::seed_from_mnemonic;
use slp_primitives::{DerivationPath, ExtendedPrivateKey, PrivateKey};
use slp_script::{Address, Network};

/// One key with its address on a network.
#[derive(Debug, Clone)]
pub struct Wallet {
    key: PrivateKey,
    address: Address,
}

impl Wallet {
    /// Derive `account_path` then `address_path` from a BIP-39 phrase.
    ///
    /// # Arguments
    /// * `phrase` - The seed phrase; no passphrase is applied.
    /// * `account_path` - Absolute path of the account, e.g. `m/44'/145'/0'`.
    /// * `address_path` - Path below the account, e.g. `0/0`.
    pub fn from_mnemonic(
        phrase: &str,
        account_path: &DerivationPath,
        address_path: &DerivationPath,
        network: Network,
    ) -> anyhow::Result<Self> {
        let seed = seed_from_mnemonic(phrase, "").context("invalid mnemonic")?;
        let account = ExtendedPrivateKey::from_seed(&seed)?
            .derive_path(account_path)
            .with_context(|| format!("deriving {account_path}"))?;
        let node = account
            .derive_path(address_path)
            .with_context(|| format!("deriving {address_path} below {account_path}"))?;
        Ok(Self::from_key(node.private_key().clone(), network))
    }

    /// Wrap a WIF-encoded key.
    pub fn from_wif(wif: &str, network: Network) -> anyhow::Result<Self> {
        let key = PrivateKey::from_wif(wif).context("invalid WIF")?;
        Ok(Self::from_key(key, network))
    }

    pub fn from_key(key: PrivateKey, network: Network) -> Self {
        let address = Address::from_public_key(&key.pub_key(), network);
        Self { key, address }
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn cash_address(&self) -> String {
        self.address.to_cash_address()
    }

    pub fn slp_address(&self) -> String {
        self.address.to_slp_address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn path(s: &str) -> DerivationPath {
        s.parse().unwrap()
    }

    #[test]
    fn mnemonic_derivation_matches_full_path() {
        let wallet =
            Wallet::from_mnemonic(PHRASE, &path("m/44'/145'/0'"), &path("0/0"), Network::Mainnet).unwrap();

        let seed = seed_from_mnemonic(PHRASE, "").unwrap();
        let direct = ExtendedPrivateKey::from_seed(&seed)
            .unwrap()
            .derive_path(&path("m/44'/145'/0'/0/0"))
            .unwrap();
        assert_eq!(wallet.key(), direct.private_key());
    }

    #[test]
    fn addresses_share_the_key_hash() {
        let wallet =
            Wallet::from_mnemonic(PHRASE, &path("m/44'/145'/0'"), &path("0/1"), Network::Mainnet).unwrap();

        assert!(wallet.cash_address().starts_with("bitcoincash:q"));
        assert!(wallet.slp_address().starts_with("simpleledger:q"));
        let cash = Address::from_string(&wallet.cash_address()).unwrap();
        let slp = Address::from_string(&wallet.slp_address()).unwrap();
        assert_eq!(cash, slp);
    }

    #[test]
    fn different_paths_give_different_keys() {
        let a = Wallet::from_mnemonic(PHRASE, &path("m/44'/145'/0'"), &path("0/0"), Network::Mainnet).unwrap();
        let b = Wallet::from_mnemonic(PHRASE, &path("m/44'/145'/0'"), &path("1/0"), Network::Mainnet).unwrap();
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn wif_wallet_uses_requested_network() {
        let wif = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn";
        let mainnet = Wallet::from_wif(wif, Network::Mainnet).unwrap();
        let testnet = Wallet::from_wif(wif, Network::Testnet).unwrap();

        assert_eq!(mainnet.key(), testnet.key());
        assert_eq!(*mainnet.key(), PrivateKey::from_hex(&format!("{:064x}", 1)).unwrap());
        assert!(mainnet.cash_address().starts_with("bitcoincash:"));
        assert!(testnet.slp_address().starts_with("slptest:"));
    }

    #[test]
    fn rejects_bad_secrets() {
        assert!(Wallet::from_mnemonic("abandon abandon", &path("m"), &path("0"), Network::Mainnet).is_err());
        assert!(Wallet::from_wif("not-a-wif", Network::Mainnet).is_err());
    }
}
