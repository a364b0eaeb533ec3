use proptest::prelude::*;

use slp_primitives::ec::{PrivateKey, PublicKey, Signature, TESTNET_WIF_PREFIX};
use slp_primitives::hash::sha256;
use slp_primitives::util::{ByteReader, ByteWriter, VarInt};
use slp_primitives::{DerivationPath, ExtendedPrivateKey};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wif_and_pubkey_survive_reencoding(seed in prop::array::uniform32(any::<u8>())) {
        // Not every 32-byte array is a valid scalar.
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let wif = pk.to_wif_prefix(TESTNET_WIF_PREFIX);
            let (decoded, prefix) = PrivateKey::from_wif_with_prefix(&wif).unwrap();
            prop_assert_eq!(prefix, TESTNET_WIF_PREFIX);
            prop_assert_eq!(&decoded, &pk);

            let compressed = pk.pub_key().to_compressed();
            prop_assert_eq!(PublicKey::from_bytes(&compressed).unwrap(), pk.pub_key());
        }
    }

    #[test]
    fn signatures_verify_and_parse_from_der(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let digest = sha256(&msg);
            let sig = pk.sign(&digest).unwrap();
            prop_assert!(pk.pub_key().verify(&digest, &sig));
            let reparsed = Signature::from_der(&sig.to_der()).unwrap();
            prop_assert!(pk.pub_key().verify(&digest, &reparsed));
        }
    }

    #[test]
    fn varint_reads_back(v in any::<u64>()) {
        let mut w = ByteWriter::new();
        w.write_varint(VarInt(v));
        prop_assert_eq!(w.len(), VarInt(v).length());
        let bytes = w.into_bytes();
        let mut r = ByteReader::new(&bytes);
        prop_assert_eq!(r.read_varint().unwrap().value(), v);
    }

    #[test]
    fn relative_derivation_matches_absolute(
        seed in prop::collection::vec(any::<u8>(), 16..=64),
        account in 0u32..1000,
        index in 0u32..1000,
    ) {
        let master = ExtendedPrivateKey::from_seed(&seed).unwrap();
        let account_path: DerivationPath = format!("m/44'/145'/{account}'").parse().unwrap();
        let full_path: DerivationPath = format!("m/44'/145'/{account}'/0/{index}").parse().unwrap();
        let relative: DerivationPath = format!("0/{index}").parse().unwrap();

        let stepwise = master.derive_path(&account_path).unwrap().derive_path(&relative).unwrap();
        let direct = master.derive_path(&full_path).unwrap();
        prop_assert_eq!(stepwise.private_key(), direct.private_key());
        prop_assert_eq!(direct.depth(), 5);
    }
}
