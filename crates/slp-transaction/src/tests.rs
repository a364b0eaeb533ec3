//! Tests for the slp-transaction crate.
//!
//! Covers wire parsing and serialization, txid computation, FORKID sighash
//! preimages, size estimation and P2PKH signing.

use slp_primitives::ec::{PrivateKey, PublicKey, Signature};
use slp_script::Script;

use crate::input::{TransactionInput, DEFAULT_SEQUENCE_NUMBER};
use crate::output::TransactionOutput;
use crate::sighash;
use crate::template::p2pkh::{self, ESTIMATED_UNLOCK_LEN};
use crate::template::UnlockingScriptTemplate;
use crate::transaction::{parse_txid, txid_to_hex, Transaction};

// -----------------------------------------------------------------------
// Raw transaction vectors
// -----------------------------------------------------------------------

/// One input, a P2PKH output and an OP_RETURN-bearing output.
const SOURCE_RAW_TX: &str = "010000000138c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2030000006a47304402203e9ab8e4c14addf3b4741540b556cfb0e0efb67dc1a7b5ce84c3ac56b3fd447802203c9f49f7bd893ebd7060176dfc36bcaff9d2c443d9a0dd6cd2d59b372c024d20412102798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d66ffffffff02dc050000000000002076a914eb0bd5edba389198e73f8efabddfc61666969ff788ac6a0568656c6c6faa0d0000000000001976a914eb0bd5edba389198e73f8efabddfc61666969ff788ac00000000";

/// Three inputs, two outputs, non-zero lock time.
const MULTI_INPUT_TX_HEX: &str = "0200000003a9bc457fdc6a54d99300fb137b23714d860c350a9d19ff0f571e694a419ff3a0010000006b48304502210086c83beb2b2663e4709a583d261d75be538aedcafa7766bd983e5c8db2f8b2fc02201a88b178624ab0ad1748b37c875f885930166237c88f5af78ee4e61d337f935f412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff0092bb9a47e27bf64fc98f557c530c04d9ac25e2f2a8b600e92a0b1ae7c89c20010000006b483045022100f06b3db1c0a11af348401f9cebe10ae2659d6e766a9dcd9e3a04690ba10a160f02203f7fbd7dfcfc70863aface1a306fcc91bbadf6bc884c21a55ef0d32bd6b088c8412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff9d0d4554fa692420a0830ca614b6c60f1bf8eaaa21afca4aa8c99fb052d9f398000000006b483045022100d920f2290548e92a6235f8b2513b7f693a64a0d3fa699f81a034f4b4608ff82f0220767d7d98025aff3c7bd5f2a66aab6a824f5990392e6489aae1e1ae3472d8dffb412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff02807c814a000000001976a9143a6bf34ebfcf30e8541bbb33a7882845e5a29cb488ac76b0e60e000000001976a914bd492b67f90cb85918494767ebb23102c4f06b7088ac67000000";

const TEST_WIF: &str = "cNGwGSc7KRrTmdLUZ54fiSXWbhLNDc2Eg5zNucgQxyQCzuQ5YRDq";
const SPEND_TXID: &str = "45be95d2f2c64e99518ffbbce03fb15a7758f20ee5eecf0df07938d977add71d";

fn script(hex_str: &str) -> Script {
    Script::from_hex(hex_str).unwrap()
}

// -----------------------------------------------------------------------
// Parsing and serialization
// -----------------------------------------------------------------------

#[test]
fn test_from_hex_roundtrip() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse source tx hex");
    assert_eq!(tx.version, 1);
    assert_eq!(tx.input_count(), 1);
    assert_eq!(tx.output_count(), 2);
    assert_eq!(tx.lock_time, 0);
    assert_eq!(tx.to_hex(), SOURCE_RAW_TX);
    assert_eq!(tx.to_string(), SOURCE_RAW_TX);
}

#[test]
fn test_multi_input_roundtrip() {
    let tx = Transaction::from_hex(MULTI_INPUT_TX_HEX).expect("should parse multi-input tx");
    assert_eq!(tx.version, 2);
    assert_eq!(tx.input_count(), 3);
    assert_eq!(tx.lock_time, 103);
    assert_eq!(tx.inputs[0].sequence_number, 0xffff_fffe);
    assert_eq!(tx.to_hex(), MULTI_INPUT_TX_HEX);
}

#[test]
fn test_malformed_input_is_rejected() {
    assert!(Transaction::from_hex(&format!("{}deadbeef", SOURCE_RAW_TX)).is_err());
    assert!(Transaction::from_hex("not_valid_hex").is_err());
    assert!(Transaction::from_bytes(&[]).is_err());
    // truncated in the middle of an output
    assert!(Transaction::from_hex(&SOURCE_RAW_TX[..SOURCE_RAW_TX.len() - 20]).is_err());
}

#[test]
fn test_output_scripts_and_values() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    assert_eq!(tx.outputs[0].satoshis, 1500);
    assert_eq!(tx.outputs[1].satoshis, 3498);
    assert!(tx.outputs[1].locking_script.is_p2pkh());
    assert_eq!(tx.total_output_satoshis().unwrap(), 4998);
    assert_eq!(tx.size(), SOURCE_RAW_TX.len() / 2);
}

#[test]
fn test_new_transaction_defaults() {
    let tx = Transaction::new();
    assert_eq!(tx.version, 2);
    // version + 0 inputs + 0 outputs + lock time
    assert_eq!(tx.to_hex(), "02000000000000000000");
}

// -----------------------------------------------------------------------
// Txids
// -----------------------------------------------------------------------

#[test]
fn test_tx_id_is_reversed_double_sha() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    let mut reversed = tx.tx_id();
    reversed.reverse();
    assert_eq!(hex::encode(reversed), tx.tx_id_hex());
}

#[test]
fn test_parse_txid_reverses_bytes() {
    let internal = parse_txid(SPEND_TXID).unwrap();
    assert_eq!(internal[0], 0x1d);
    assert_eq!(internal[31], 0x45);
    assert_eq!(txid_to_hex(&internal), SPEND_TXID);
    assert!(parse_txid("abcd").is_err());
    assert!(parse_txid("zz").is_err());
}

#[test]
fn test_input_source_txid_hex() {
    let tx = Transaction::from_hex(MULTI_INPUT_TX_HEX).unwrap();
    assert_eq!(
        tx.inputs[0].source_txid_hex(),
        "a0f39f414a691e570fff199d0a350c864d71237b13fb0093d9546adc7f45bca9"
    );
}

// -----------------------------------------------------------------------
// Sighash
// -----------------------------------------------------------------------

#[test]
fn test_calc_preimage_structure() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    let prev = hex::decode("76a914eb0bd5edba389198e73f8efabddfc61666969ff788ac").unwrap();

    let preimage =
        sighash::calc_preimage(&tx, 0, &prev, sighash::SIGHASH_ALL_FORKID, 1500).unwrap();

    let expected_len = 4 + 32 + 32 + 36 + 1 + prev.len() + 8 + 4 + 32 + 4 + 4;
    assert_eq!(preimage.len(), expected_len);
    assert_eq!(&preimage[..4], &1u32.to_le_bytes());
    assert_eq!(&preimage[preimage.len() - 4..], &0x41u32.to_le_bytes());
}

#[test]
fn test_sighash_commits_to_value() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    let prev = hex::decode("76a914eb0bd5edba389198e73f8efabddfc61666969ff788ac").unwrap();
    let a = sighash::signature_hash(&tx, 0, &prev, sighash::SIGHASH_ALL_FORKID, 1500).unwrap();
    let b = sighash::signature_hash(&tx, 0, &prev, sighash::SIGHASH_ALL_FORKID, 1501).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_sighash_out_of_range() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).unwrap();
    assert!(sighash::signature_hash(&tx, 99, &[], sighash::SIGHASH_ALL_FORKID, 0).is_err());
    assert!(tx.calc_input_signature_hash(0, sighash::SIGHASH_ALL_FORKID).is_err());
}

// -----------------------------------------------------------------------
// P2PKH signing
// -----------------------------------------------------------------------

#[test]
fn test_p2pkh_sign_exact_match() {
    let unsigned = "010000000193a35408b6068499e0d5abd799d3e827d9bfe70c9b75ebe209c91d25072326510000000000ffffffff02404b4c00000000001976a91404ff367be719efa79d76e4416ffb072cd53b208888acde94a905000000001976a91404d03f746652cfcb6cb55119ab473a045137d26588ac00000000";
    let mut tx = Transaction::from_hex(unsigned).unwrap();
    tx.inputs[0].set_source_output(Some(TransactionOutput::new(
        100_000_000,
        script("76a914c0a3c167a28cabb9fbb495affa0761e6e74ac60d88ac"),
    )));

    let key = PrivateKey::from_wif(TEST_WIF).unwrap();
    tx.sign_input(0, &p2pkh::unlock(key, None)).unwrap();

    let expected = "010000000193a35408b6068499e0d5abd799d3e827d9bfe70c9b75ebe209c91d2507232651000000006b483045022100c1d77036dc6cd1f3fa1214b0688391ab7f7a16cd31ea4e5a1f7a415ef167df820220751aced6d24649fa235132f1e6969e163b9400f80043a72879237dab4a1190ad412103b8b40a84123121d260f5c109bc5a46ec819c2e4002e5ba08638783bfb4e01435ffffffff02404b4c00000000001976a91404ff367be719efa79d76e4416ffb072cd53b208888acde94a905000000001976a91404d03f746652cfcb6cb55119ab473a045137d26588ac00000000";
    assert_eq!(tx.to_hex(), expected);
}

#[test]
fn test_p2pkh_signature_verifies() {
    let mut tx = Transaction::new();
    tx.add_input_from(
        SPEND_TXID,
        0,
        script("76a914c7c6987b6e2345a6b138e3384141520a0fbc18c588ac"),
        15_564_838_601,
    )
    .unwrap();
    tx.add_output(TransactionOutput::new(
        375_041_432,
        script("76a91442f9682260509ac80722b1963aec8a896593d16688ac"),
    ));

    let key = PrivateKey::from_wif(TEST_WIF).unwrap();
    let unlocking = p2pkh::unlock(key, None).sign(&tx, 0).unwrap();
    let chunks = unlocking.chunks().unwrap();
    assert_eq!(chunks.len(), 2);

    let sig_bytes = chunks[0].data.as_ref().unwrap();
    assert_eq!(*sig_bytes.last().unwrap(), 0x41);
    let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1]).unwrap();
    let public_key = PublicKey::from_bytes(chunks[1].data.as_ref().unwrap()).unwrap();

    let digest = tx
        .calc_input_signature_hash(0, sighash::SIGHASH_ALL_FORKID)
        .unwrap();
    assert!(sig.verify(&digest, &public_key));
}

#[test]
fn test_p2pkh_error_without_source_output() {
    let mut tx = Transaction::new();
    tx.add_input(TransactionInput::new(parse_txid(SPEND_TXID).unwrap(), 0));
    assert_eq!(tx.inputs[0].sequence_number, DEFAULT_SEQUENCE_NUMBER);

    let key = PrivateKey::from_wif(TEST_WIF).unwrap();
    assert!(p2pkh::unlock(key.clone(), None).sign(&tx, 0).is_err());
    assert!(p2pkh::unlock(key, None).sign(&tx, 1).is_err());
    assert!(tx.total_input_satoshis().is_err());
}

#[test]
fn test_p2pkh_lock_rejects_p2sh() {
    let p2pkh_addr = slp_script::Address::from_string("1BpEi6DfDAUFd7GtittLSdBeYJvcoaVggu").unwrap();
    let p2sh_addr = slp_script::Address::from_string("3CWFddi6m4ndiGyKqzYvsFYagqDLPVMTzC").unwrap();
    assert!(p2pkh::lock(&p2pkh_addr).unwrap().is_p2pkh());
    assert!(p2pkh::lock(&p2sh_addr).is_err());
}

#[test]
fn test_sign_all_and_size_estimate() {
    let key_a = PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000007").unwrap();
    let key_b = PrivateKey::from_hex("0000000000000000000000000000000000000000000000000000000000000008").unwrap();

    let mut tx = Transaction::new();
    tx.add_input_from(SPEND_TXID, 1, Script::p2pkh(&key_a.pub_key().hash160()), 546).unwrap();
    tx.add_input_from(SPEND_TXID, 2, Script::p2pkh(&key_b.pub_key().hash160()), 10_000).unwrap();
    tx.add_output(TransactionOutput::new(0, script("6a04534c5000")));
    tx.add_output(TransactionOutput::new(546, Script::p2pkh(&[0x11; 20])));
    tx.add_output(TransactionOutput::new(9_000, Script::p2pkh(&[0x22; 20])));

    let unlock = p2pkh::unlock(key_a.clone(), None);
    assert_eq!(unlock.estimate_length(&tx, 0), ESTIMATED_UNLOCK_LEN);
    let estimate = tx.estimated_signed_size(ESTIMATED_UNLOCK_LEN as usize);

    assert!(tx.sign_all(&[key_a.clone()]).is_err());
    tx.sign_all(&[key_a, key_b]).unwrap();
    assert!(tx.inputs.iter().all(|i| i.unlocking_script.is_some()));

    let actual = tx.size();
    assert!(actual <= estimate, "{actual} > {estimate}");
    assert!(estimate - actual <= 4);
    // Once signed the estimate is exact.
    assert_eq!(tx.estimated_signed_size(0), actual);
    assert_eq!(tx.total_input_satoshis().unwrap(), 10_546);
}

#[test]
fn test_value_totals_reject_overflow() {
    let mut tx = Transaction::new();
    tx.add_input_from(SPEND_TXID, 0, Script::p2pkh(&[0x11; 20]), u64::MAX).unwrap();
    tx.add_input_from(SPEND_TXID, 1, Script::p2pkh(&[0x11; 20]), 1).unwrap();
    tx.add_output(TransactionOutput::new(u64::MAX, Script::p2pkh(&[0x22; 20])));
    assert_eq!(tx.total_output_satoshis().unwrap(), u64::MAX);

    tx.add_output(TransactionOutput::new(1, Script::p2pkh(&[0x22; 20])));
    assert!(tx.total_output_satoshis().is_err());
    assert!(tx.total_input_satoshis().is_err());
}
