//! Bitcoin Cash address handling.
//!
//! An address is a 20-byte hash plus its kind (P2PKH or P2SH) and network.
//! Three string encodings exist for the same address:
//!
//! - CashAddr with the `bitcoincash:` / `bchtest:` prefix
//! - the SLP variant of CashAddr with the `simpleledger:` / `slptest:` prefix
//! - legacy Base58Check
//!
//! CashAddr strings may be written without their prefix; parsing then tries
//! every known prefix against the checksum.

use std::fmt;
use std::str::FromStr;

use slp_primitives::base58;
use slp_primitives::PublicKey;

use crate::{Script, ScriptError};

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const MAINNET_P2PKH: u8 = 0x00;
const MAINNET_P2SH: u8 = 0x05;
const TESTNET_P2PKH: u8 = 0x6f;
const TESTNET_P2SH: u8 = 0xc4;

/// Number of 5-bit groups in the CashAddr checksum.
const CHECKSUM_GROUPS: usize = 8;

/// Network an address belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// CashAddr prefix for the given string format.
    pub fn prefix(self, format: AddressFormat) -> &'static str {
        match (self, format) {
            (Network::Mainnet, AddressFormat::Slp) => "simpleledger",
            (Network::Testnet, AddressFormat::Slp) => "slptest",
            (Network::Mainnet, _) => "bitcoincash",
            (Network::Testnet, _) => "bchtest",
        }
    }
}

impl FromStr for Network {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(ScriptError::UnsupportedAddress(format!("unknown network '{other}'"))),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        })
    }
}

/// String encoding of an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressFormat {
    Cash,
    Slp,
    Legacy,
}

/// What the 20-byte hash commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AddressKind {
    P2pkh,
    P2sh,
}

impl AddressKind {
    fn cashaddr_type(self) -> u8 {
        match self {
            AddressKind::P2pkh => 0,
            AddressKind::P2sh => 1,
        }
    }
}

/// A Bitcoin Cash address, independent of how it was written.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    pub hash: [u8; 20],
    pub kind: AddressKind,
    pub network: Network,
}

impl Address {
    /// P2PKH address for a public key.
    pub fn from_public_key(pub_key: &PublicKey, network: Network) -> Self {
        Self::from_public_key_hash(&pub_key.hash160(), network)
    }

    pub fn from_public_key_hash(hash: &[u8; 20], network: Network) -> Self {
        Address {
            hash: *hash,
            kind: AddressKind::P2pkh,
            network,
        }
    }

    /// Parse any supported encoding.
    ///
    /// # Returns
    /// The address, or an error if no encoding matches or the checksum fails.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        Self::parse_with_format(addr).map(|(address, _)| address)
    }

    /// Parse any supported encoding and report which one it was.
    pub fn parse_with_format(addr: &str) -> Result<(Self, AddressFormat), ScriptError> {
        let addr = addr.trim();
        if let Some((prefix, payload)) = addr.rsplit_once(':') {
            return decode_cashaddr(prefix, payload);
        }
        if let Ok(legacy) = decode_legacy(addr) {
            return Ok((legacy, AddressFormat::Legacy));
        }
        for prefix in ["bitcoincash", "simpleledger", "bchtest", "slptest"] {
            if let Ok(found) = decode_cashaddr(prefix, addr) {
                return Ok(found);
            }
        }
        Err(ScriptError::InvalidAddress(addr.to_string()))
    }

    /// CashAddr with the `bitcoincash`/`bchtest` prefix.
    pub fn to_cash_address(&self) -> String {
        self.encode_cashaddr(self.network.prefix(AddressFormat::Cash))
    }

    /// CashAddr with the `simpleledger`/`slptest` prefix.
    pub fn to_slp_address(&self) -> String {
        self.encode_cashaddr(self.network.prefix(AddressFormat::Slp))
    }

    /// Legacy Base58Check encoding.
    pub fn to_legacy(&self) -> String {
        let version = match (self.network, self.kind) {
            (Network::Mainnet, AddressKind::P2pkh) => MAINNET_P2PKH,
            (Network::Mainnet, AddressKind::P2sh) => MAINNET_P2SH,
            (Network::Testnet, AddressKind::P2pkh) => TESTNET_P2PKH,
            (Network::Testnet, AddressKind::P2sh) => TESTNET_P2SH,
        };
        let mut payload = Vec::with_capacity(21);
        payload.push(version);
        payload.extend_from_slice(&self.hash);
        base58::check_encode(&payload)
    }

    pub fn to_format(&self, format: AddressFormat) -> String {
        match format {
            AddressFormat::Cash => self.to_cash_address(),
            AddressFormat::Slp => self.to_slp_address(),
            AddressFormat::Legacy => self.to_legacy(),
        }
    }

    /// The output script paying to this address.
    pub fn locking_script(&self) -> Script {
        match self.kind {
            AddressKind::P2pkh => Script::p2pkh(&self.hash),
            AddressKind::P2sh => Script::p2sh(&self.hash),
        }
    }

    fn encode_cashaddr(&self, prefix: &str) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(self.kind.cashaddr_type() << 3);
        payload.extend_from_slice(&self.hash);
        let data = convert_bits(&payload, 8, 5, true).unwrap_or_default();

        let checksum = polymod(&checksum_input(prefix, &data, &[0; CHECKSUM_GROUPS]));
        let mut out = String::with_capacity(prefix.len() + 1 + data.len() + CHECKSUM_GROUPS);
        out.push_str(prefix);
        out.push(':');
        for &d in &data {
            out.push(CHARSET[d as usize] as char);
        }
        for i in 0..CHECKSUM_GROUPS {
            let group = (checksum >> (5 * (CHECKSUM_GROUPS - 1 - i))) & 0x1f;
            out.push(CHARSET[group as usize] as char);
        }
        out
    }
}

impl fmt::Display for Address {
    /// Displays the CashAddr form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cash_address())
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_string(s)
    }
}

// ---------------------------------------------------------------------------
// String-level helpers
// ---------------------------------------------------------------------------

/// Re-encode any address string as CashAddr.
pub fn to_cash_address(addr: &str) -> Result<String, ScriptError> {
    Ok(Address::from_string(addr)?.to_cash_address())
}

/// Re-encode any address string with the SLP prefix.
pub fn to_slp_address(addr: &str) -> Result<String, ScriptError> {
    Ok(Address::from_string(addr)?.to_slp_address())
}

/// Re-encode any address string as legacy Base58Check.
pub fn to_legacy_address(addr: &str) -> Result<String, ScriptError> {
    Ok(Address::from_string(addr)?.to_legacy())
}

/// Whether `addr` is written in the SLP format, prefixed or not.
pub fn is_slp_address(addr: &str) -> bool {
    matches!(Address::parse_with_format(addr), Ok((_, AddressFormat::Slp)))
}

// ---------------------------------------------------------------------------
// CashAddr internals
// ---------------------------------------------------------------------------

fn decode_cashaddr(prefix: &str, payload: &str) -> Result<(Address, AddressFormat), ScriptError> {
    let full = format!("{prefix}:{payload}");
    let invalid = |why: &str| ScriptError::InvalidAddress(format!("{full}: {why}"));

    let has_lower = full.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = full.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Err(invalid("mixed case"));
    }
    let prefix = prefix.to_ascii_lowercase();
    let payload = payload.to_ascii_lowercase();

    let (network, format) = match prefix.as_str() {
        "bitcoincash" => (Network::Mainnet, AddressFormat::Cash),
        "bchtest" => (Network::Testnet, AddressFormat::Cash),
        "simpleledger" => (Network::Mainnet, AddressFormat::Slp),
        "slptest" => (Network::Testnet, AddressFormat::Slp),
        _ => return Err(ScriptError::UnsupportedAddress(full.clone())),
    };

    let data = payload
        .bytes()
        .map(|c| CHARSET.iter().position(|&x| x == c).map(|p| p as u8))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| invalid("bad character"))?;
    if data.len() <= CHECKSUM_GROUPS {
        return Err(invalid("too short"));
    }

    if polymod(&checksum_input(&prefix, &data, &[])) != 0 {
        return Err(ScriptError::ChecksumMismatch(full.clone()));
    }

    let bytes = convert_bits(&data[..data.len() - CHECKSUM_GROUPS], 5, 8, false)
        .ok_or_else(|| invalid("bad padding"))?;
    if bytes.len() != 21 {
        return Err(invalid("unsupported hash size"));
    }
    let version = bytes[0];
    if version & 0x07 != 0 {
        return Err(invalid("unsupported hash size"));
    }
    let kind = match version >> 3 {
        0 => AddressKind::P2pkh,
        1 => AddressKind::P2sh,
        _ => return Err(ScriptError::UnsupportedAddress(full.clone())),
    };

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&bytes[1..]);
    Ok((Address { hash, kind, network }, format))
}

fn decode_legacy(addr: &str) -> Result<Address, ScriptError> {
    let payload = base58::check_decode(addr)?;
    if payload.len() != 21 {
        return Err(ScriptError::InvalidAddressLength(addr.to_string()));
    }
    let (network, kind) = match payload[0] {
        MAINNET_P2PKH => (Network::Mainnet, AddressKind::P2pkh),
        MAINNET_P2SH => (Network::Mainnet, AddressKind::P2sh),
        TESTNET_P2PKH => (Network::Testnet, AddressKind::P2pkh),
        TESTNET_P2SH => (Network::Testnet, AddressKind::P2sh),
        _ => return Err(ScriptError::UnsupportedAddress(addr.to_string())),
    };
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(Address { hash, kind, network })
}

/// Prefix (low five bits of each char), a zero separator, then data and
/// trailing groups.
fn checksum_input(prefix: &str, data: &[u8], trailer: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(prefix.len() + 1 + data.len() + trailer.len());
    v.extend(prefix.bytes().map(|b| b & 0x1f));
    v.push(0);
    v.extend_from_slice(data);
    v.extend_from_slice(trailer);
    v
}

/// CashAddr BCH code checksum over 5-bit groups.
fn polymod(values: &[u8]) -> u64 {
    const GENERATORS: [u64; 5] = [
        0x98_f2bc_8e61,
        0x79_b76d_99e2,
        0xf3_3e5f_b3c4,
        0xae_2eab_e2a8,
        0x1e_4f43_e470,
    ];
    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        for (i, g) in GENERATORS.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= g;
            }
        }
    }
    c ^ 1
}

/// Regroup bits, e.g. 8-bit bytes into 5-bit groups.
///
/// Without `pad`, leftover bits must be fewer than `from` and all zero.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let max = (1u32 << to) - 1;
    let max_acc = (1u32 << (from + to - 1)) - 1;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);
    for &value in data {
        let v = u32::from(value);
        if v >> from != 0 {
            return None;
        }
        acc = ((acc << from) | v) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max) as u8);
        }
    }
    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max) as u8);
        }
    } else if bits >= from || (acc << (to - bits)) & max != 0 {
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "1BpEi6DfDAUFd7GtittLSdBeYJvcoaVggu";
    const CASH: &str = "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";
    const HASH: &str = "76a04053bda0a88bda5177b86a15c3b29f559873";

    fn hash() -> [u8; 20] {
        hex::decode(HASH).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_cashaddr_known_vector() {
        let addr = Address::from_public_key_hash(&hash(), Network::Mainnet);
        assert_eq!(addr.to_cash_address(), CASH);
        assert_eq!(addr.to_legacy(), LEGACY);
    }

    #[test]
    fn test_second_cashaddr_vector() {
        let addr = Address::from_string("1KXrWXciRDZUpQwQmuM1DbwsKDLYAYsVLR").unwrap();
        assert_eq!(
            addr.to_cash_address(),
            "bitcoincash:qr95sy3j9xwd2ap32xkykttr4cvcu7as4y0qverfuy"
        );
    }

    #[test]
    fn test_p2sh_vector() {
        let addr = Address::from_string("3CWFddi6m4ndiGyKqzYvsFYagqDLPVMTzC").unwrap();
        assert_eq!(addr.kind, AddressKind::P2sh);
        assert_eq!(addr.hash, hash());
        assert_eq!(
            addr.to_cash_address(),
            "bitcoincash:ppm2qsznhks23z7629mms6s4cwef74vcwvn0h829pq"
        );
    }

    #[test]
    fn test_parse_reports_format() {
        let (from_legacy, f1) = Address::parse_with_format(LEGACY).unwrap();
        let (from_cash, f2) = Address::parse_with_format(CASH).unwrap();
        assert_eq!(f1, AddressFormat::Legacy);
        assert_eq!(f2, AddressFormat::Cash);
        assert_eq!(from_legacy, from_cash);

        let slp = from_cash.to_slp_address();
        assert!(slp.starts_with("simpleledger:q"));
        let (from_slp, f3) = Address::parse_with_format(&slp).unwrap();
        assert_eq!(f3, AddressFormat::Slp);
        assert_eq!(from_slp, from_cash);
    }

    #[test]
    fn test_unprefixed_and_uppercase() {
        let bare = CASH.trim_start_matches("bitcoincash:");
        assert_eq!(Address::from_string(bare).unwrap().hash, hash());
        assert_eq!(Address::from_string(&CASH.to_uppercase()).unwrap().hash, hash());

        let slp = to_slp_address(LEGACY).unwrap();
        let bare_slp = slp.trim_start_matches("simpleledger:");
        assert!(is_slp_address(bare_slp));
        assert!(!is_slp_address(bare));
    }

    #[test]
    fn test_testnet_prefixes() {
        let addr = Address::from_public_key_hash(&hash(), Network::Testnet);
        let cash = addr.to_cash_address();
        let slp = addr.to_slp_address();
        assert!(cash.starts_with("bchtest:"));
        assert!(slp.starts_with("slptest:"));
        assert_eq!(Address::from_string(&slp).unwrap(), addr);
        assert!(addr.to_legacy().starts_with('m') || addr.to_legacy().starts_with('n'));
        assert_eq!(Address::from_string(&addr.to_legacy()).unwrap(), addr);
    }

    #[test]
    fn test_rejects_bad_addresses() {
        // checksum
        let mut bad = CASH.to_string();
        bad.pop();
        bad.push('q');
        assert!(matches!(Address::from_string(&bad), Err(ScriptError::ChecksumMismatch(_))));
        // prefix swapped without recomputing the checksum
        let swapped = CASH.replace("bitcoincash:", "simpleledger:");
        assert!(Address::from_string(&swapped).is_err());
        // mixed case
        let mixed = CASH.replacen('q', "Q", 1);
        assert!(Address::from_string(&mixed).is_err());
        assert!(Address::from_string("").is_err());
        assert!(Address::from_string("foo:qpm2").is_err());
    }

    #[test]
    fn test_locking_scripts() {
        let addr = Address::from_string(CASH).unwrap();
        assert_eq!(addr.locking_script().to_hex(), format!("76a914{HASH}88ac"));
        let p2sh = Address { kind: AddressKind::P2sh, ..addr };
        assert_eq!(p2sh.locking_script().to_hex(), format!("a914{HASH}87"));
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert!("regtest".parse::<Network>().is_err());
    }
}
