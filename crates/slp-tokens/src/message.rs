//! SLP OP_RETURN messages.
//!
//! Every SLP transaction carries its token semantics in output 0:
//!
//! ```text
//! OP_RETURN <"SLP\0"> <token_type> <"GENESIS" | "MINT" | "SEND"> <fields...>
//! ```
//!
//! All fields after `OP_RETURN` must be data pushes. An empty field is
//! written as `OP_PUSHDATA1 0x00`; a bare `OP_0` is not a push and makes
//! the message invalid.

use serde::{Deserialize, Serialize};
use slp_script::opcodes::{OP_PUSHDATA1, OP_RETURN};
use slp_script::{Script, ScriptChunk};

use crate::{TokenError, TokenId};

/// The lokad id prefixing every SLP message.
pub const LOKAD_ID: &[u8; 4] = b"SLP\0";

/// Most token outputs a single SEND can describe.
pub const MAX_SEND_OUTPUTS: usize = 19;

/// Highest decimal precision a GENESIS may declare.
pub const MAX_DECIMALS: u8 = 9;

// -----------------------------------------------------------------------
// Token type
// -----------------------------------------------------------------------

/// The SLP token type pushed after the lokad id.
///
/// Serializes as its numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub enum TokenType {
    /// Type 1 fungible tokens.
    Fungible,
    /// NFT1 child (a single non-fungible token).
    NftChild,
    /// NFT1 group (a fungible token that funds child genesis).
    NftGroup,
    /// Any other type; outputs carrying it must not be spent by a wallet
    /// that does not understand it.
    Unknown(u16),
}

impl TokenType {
    /// Returns the numeric token type.
    pub fn value(self) -> u16 {
        match self {
            TokenType::Fungible => 0x01,
            TokenType::NftChild => 0x41,
            TokenType::NftGroup => 0x81,
            TokenType::Unknown(v) => v,
        }
    }

    /// Map a numeric token type.
    pub fn from_value(value: u16) -> Self {
        match value {
            0x01 => TokenType::Fungible,
            0x41 => TokenType::NftChild,
            0x81 => TokenType::NftGroup,
            v => TokenType::Unknown(v),
        }
    }

    /// Whether this crate knows how to parse and build messages of this type.
    pub fn is_supported(self) -> bool {
        !matches!(self, TokenType::Unknown(_))
    }

    /// The minimal big-endian encoding pushed on chain.
    fn to_push(self) -> Vec<u8> {
        let v = self.value();
        if v <= 0xff {
            vec![v as u8]
        } else {
            v.to_be_bytes().to_vec()
        }
    }
}

impl From<u16> for TokenType {
    fn from(value: u16) -> Self {
        TokenType::from_value(value)
    }
}

impl From<TokenType> for u16 {
    fn from(token_type: TokenType) -> Self {
        token_type.value()
    }
}

// -----------------------------------------------------------------------
// Messages
// -----------------------------------------------------------------------

/// A parsed SLP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlpMessage {
    /// Creates a token; the transaction's txid becomes the token id.
    Genesis {
        /// The token type.
        token_type: TokenType,
        /// Ticker symbol, possibly empty.
        ticker: String,
        /// Token name, possibly empty.
        name: String,
        /// Document URI, possibly empty.
        document_uri: String,
        /// SHA-256 of the token document, if one was committed.
        document_hash: Option<[u8; 32]>,
        /// Number of decimal places in display amounts.
        decimals: u8,
        /// Output holding the mint baton, if any (always >= 2).
        mint_baton_vout: Option<u8>,
        /// Base units created at output 1.
        initial_quantity: u64,
    },
    /// Issues more of an existing token; requires spending the baton.
    Mint {
        /// The token type.
        token_type: TokenType,
        /// The token being minted.
        token_id: TokenId,
        /// Output receiving the baton, if it is passed on (always >= 2).
        mint_baton_vout: Option<u8>,
        /// Base units created at output 1.
        additional_quantity: u64,
    },
    /// Moves tokens; `amounts[i]` goes to output `i + 1`.
    Send {
        /// The token type.
        token_type: TokenType,
        /// The token being sent.
        token_id: TokenId,
        /// Base units per output, in output order.
        amounts: Vec<u64>,
    },
}

impl SlpMessage {
    /// The token type of the message.
    pub fn token_type(&self) -> TokenType {
        match self {
            SlpMessage::Genesis { token_type, .. }
            | SlpMessage::Mint { token_type, .. }
            | SlpMessage::Send { token_type, .. } => *token_type,
        }
    }

    /// The token id, or `None` for a GENESIS, whose id is the txid of the
    /// transaction carrying it.
    pub fn token_id(&self) -> Option<TokenId> {
        match self {
            SlpMessage::Genesis { .. } => None,
            SlpMessage::Mint { token_id, .. } | SlpMessage::Send { token_id, .. } => {
                Some(*token_id)
            }
        }
    }

    /// The transaction type name as it appears on chain.
    pub fn transaction_type(&self) -> &'static str {
        match self {
            SlpMessage::Genesis { .. } => "GENESIS",
            SlpMessage::Mint { .. } => "MINT",
            SlpMessage::Send { .. } => "SEND",
        }
    }

    /// The mint baton output index, for GENESIS and MINT.
    pub fn mint_baton_vout(&self) -> Option<u8> {
        match self {
            SlpMessage::Genesis { mint_baton_vout, .. }
            | SlpMessage::Mint { mint_baton_vout, .. } => *mint_baton_vout,
            SlpMessage::Send { .. } => None,
        }
    }

    /// Parse the OP_RETURN script of a transaction's output 0.
    ///
    /// # Returns
    /// - `UnsupportedTokenType` when the lokad id matches but the token
    ///   type is unknown; callers must treat such outputs as untouchable.
    /// - `InvalidSlpMessage` for anything else that is not a valid message,
    ///   including scripts that are not SLP at all.
    pub fn parse(script: &Script) -> Result<Self, TokenError> {
        let chunks = script.chunks().map_err(|e| invalid(format!("undecodable script: {e}")))?;
        parse_chunks(&chunks)
    }

    /// Serialize the message as an OP_RETURN locking script.
    pub fn to_script(&self) -> Result<Script, TokenError> {
        if !self.token_type().is_supported() {
            return Err(TokenError::UnsupportedTokenType(self.token_type().value()));
        }

        let mut fields: Vec<Vec<u8>> = vec![
            LOKAD_ID.to_vec(),
            self.token_type().to_push(),
            self.transaction_type().as_bytes().to_vec(),
        ];

        match self {
            SlpMessage::Genesis {
                ticker,
                name,
                document_uri,
                document_hash,
                decimals,
                mint_baton_vout,
                initial_quantity,
                ..
            } => {
                fields.push(ticker.as_bytes().to_vec());
                fields.push(name.as_bytes().to_vec());
                fields.push(document_uri.as_bytes().to_vec());
                fields.push(document_hash.map(|h| h.to_vec()).unwrap_or_default());
                fields.push(vec![*decimals]);
                fields.push(mint_baton_vout.map(|v| vec![v]).unwrap_or_default());
                fields.push(initial_quantity.to_be_bytes().to_vec());
            }
            SlpMessage::Mint {
                token_id,
                mint_baton_vout,
                additional_quantity,
                ..
            } => {
                fields.push(token_id.as_bytes().to_vec());
                fields.push(mint_baton_vout.map(|v| vec![v]).unwrap_or_default());
                fields.push(additional_quantity.to_be_bytes().to_vec());
            }
            SlpMessage::Send {
                token_id, amounts, ..
            } => {
                if amounts.is_empty() || amounts.len() > MAX_SEND_OUTPUTS {
                    return Err(TokenError::InvalidOutputCount(format!(
                        "a SEND carries 1 to {} amounts, got {}",
                        MAX_SEND_OUTPUTS,
                        amounts.len()
                    )));
                }
                fields.push(token_id.as_bytes().to_vec());
                fields.extend(amounts.iter().map(|a| a.to_be_bytes().to_vec()));
            }
        }

        let mut script = Script::new();
        script.append_opcodes(&[OP_RETURN])?;
        for field in &fields {
            if field.is_empty() {
                // OP_0 is not a push in SLP's eyes
                script.append_raw(&[OP_PUSHDATA1, 0x00]);
            } else {
                script.append_push_data(field)?;
            }
        }
        Ok(script)
    }
}

/// Build the OP_RETURN script of a SEND.
///
/// # Arguments
/// * `token_type` - Type of the token being sent.
/// * `token_id` - The token being sent.
/// * `amounts` - Base units for outputs 1..=n, in order.
///
/// # Returns
/// `InvalidOutputCount` for an empty list or more than 19 amounts.
pub fn build_send_script(
    token_type: TokenType,
    token_id: &TokenId,
    amounts: &[u64],
) -> Result<Script, TokenError> {
    SlpMessage::Send {
        token_type,
        token_id: *token_id,
        amounts: amounts.to_vec(),
    }
    .to_script()
}

// -----------------------------------------------------------------------
// Parsing internals
// -----------------------------------------------------------------------

fn invalid(reason: impl Into<String>) -> TokenError {
    TokenError::InvalidSlpMessage(reason.into())
}

fn parse_chunks(chunks: &[ScriptChunk]) -> Result<SlpMessage, TokenError> {
    let (first, rest) = chunks.split_first().ok_or_else(|| invalid("empty script"))?;
    if first.op != OP_RETURN {
        return Err(invalid("output does not start with OP_RETURN"));
    }

    let fields = rest
        .iter()
        .map(|chunk| chunk.data.as_deref())
        .collect::<Option<Vec<&[u8]>>>()
        .ok_or_else(|| invalid("non-push opcode after OP_RETURN"))?;

    if fields.first() != Some(&LOKAD_ID.as_slice()) {
        return Err(invalid("missing SLP lokad id"));
    }

    let type_bytes = fields.get(1).ok_or_else(|| invalid("missing token type"))?;
    let token_type = match type_bytes.len() {
        1 => TokenType::from_value(type_bytes[0] as u16),
        2 => TokenType::from_value(u16::from_be_bytes([type_bytes[0], type_bytes[1]])),
        n => return Err(invalid(format!("token type must be 1 or 2 bytes, got {n}"))),
    };
    if let TokenType::Unknown(v) = token_type {
        return Err(TokenError::UnsupportedTokenType(v));
    }

    let tx_type = fields.get(2).ok_or_else(|| invalid("missing transaction type"))?;
    match *tx_type {
        b"GENESIS" => parse_genesis(token_type, &fields),
        b"MINT" => parse_mint(token_type, &fields),
        b"SEND" => parse_send(token_type, &fields),
        other => Err(invalid(format!(
            "unknown transaction type '{}'",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn parse_genesis(token_type: TokenType, fields: &[&[u8]]) -> Result<SlpMessage, TokenError> {
    if fields.len() != 10 {
        return Err(invalid(format!("GENESIS needs 10 fields, got {}", fields.len())));
    }

    let document_hash = match fields[6].len() {
        0 => None,
        32 => {
            let mut hash = [0u8; 32];
            hash.copy_from_slice(fields[6]);
            Some(hash)
        }
        n => return Err(invalid(format!("document hash must be 0 or 32 bytes, got {n}"))),
    };

    let decimals = match fields[7] {
        [d] if *d <= MAX_DECIMALS => *d,
        [d] => return Err(invalid(format!("decimals {d} above {MAX_DECIMALS}"))),
        other => return Err(invalid(format!("decimals must be 1 byte, got {}", other.len()))),
    };

    let mint_baton_vout = parse_baton(fields[8])?;
    let initial_quantity = parse_amount(fields[9])?;

    if token_type == TokenType::NftChild {
        if decimals != 0 {
            return Err(invalid("NFT1 child must have 0 decimals"));
        }
        if initial_quantity != 1 {
            return Err(invalid("NFT1 child must have a quantity of 1"));
        }
        if mint_baton_vout.is_some() {
            return Err(invalid("NFT1 child cannot have a mint baton"));
        }
    }

    Ok(SlpMessage::Genesis {
        token_type,
        ticker: String::from_utf8_lossy(fields[3]).into_owned(),
        name: String::from_utf8_lossy(fields[4]).into_owned(),
        document_uri: String::from_utf8_lossy(fields[5]).into_owned(),
        document_hash,
        decimals,
        mint_baton_vout,
        initial_quantity,
    })
}

fn parse_mint(token_type: TokenType, fields: &[&[u8]]) -> Result<SlpMessage, TokenError> {
    if token_type == TokenType::NftChild {
        return Err(invalid("NFT1 child cannot be minted"));
    }
    if fields.len() != 6 {
        return Err(invalid(format!("MINT needs 6 fields, got {}", fields.len())));
    }

    Ok(SlpMessage::Mint {
        token_type,
        token_id: parse_token_id(fields[3])?,
        mint_baton_vout: parse_baton(fields[4])?,
        additional_quantity: parse_amount(fields[5])?,
    })
}

fn parse_send(token_type: TokenType, fields: &[&[u8]]) -> Result<SlpMessage, TokenError> {
    if fields.len() < 5 {
        return Err(invalid("SEND needs a token id and at least one amount"));
    }
    let token_id = parse_token_id(fields[3])?;

    let amount_fields = &fields[4..];
    if amount_fields.len() > MAX_SEND_OUTPUTS {
        return Err(invalid(format!(
            "SEND carries {} amounts, at most {} allowed",
            amount_fields.len(),
            MAX_SEND_OUTPUTS
        )));
    }
    let amounts = amount_fields
        .iter()
        .map(|field| parse_amount(field))
        .collect::<Result<Vec<u64>, _>>()?;

    Ok(SlpMessage::Send {
        token_type,
        token_id,
        amounts,
    })
}

fn parse_token_id(field: &[u8]) -> Result<TokenId, TokenError> {
    TokenId::from_slice(field).map_err(|_| invalid(format!("token id must be 32 bytes, got {}", field.len())))
}

fn parse_baton(field: &[u8]) -> Result<Option<u8>, TokenError> {
    match field {
        [] => Ok(None),
        [v] if *v >= 2 => Ok(Some(*v)),
        [v] => Err(invalid(format!("mint baton vout {v} must be at least 2"))),
        other => Err(invalid(format!("mint baton vout must be 0 or 1 bytes, got {}", other.len()))),
    }
}

fn parse_amount(field: &[u8]) -> Result<u64, TokenError> {
    let bytes: [u8; 8] = field
        .try_into()
        .map_err(|_| invalid(format!("amount must be 8 bytes, got {}", field.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "959a6818cba5af8aba391d3f7649f5f6a5ceb6cdcd2c2a3dcb5d2fbfc4b08e98";

    fn token_id() -> TokenId {
        TokenId::from_hex(TOKEN).unwrap()
    }

    /// OP_RETURN followed by the given pushes, each with a minimal prefix
    /// (or OP_PUSHDATA1 0x00 when empty).
    fn op_return(fields: &[&[u8]]) -> Script {
        let mut script = Script::new();
        script.append_opcodes(&[OP_RETURN]).unwrap();
        for field in fields {
            if field.is_empty() {
                script.append_raw(&[OP_PUSHDATA1, 0x00]);
            } else {
                script.append_push_data(field).unwrap();
            }
        }
        script
    }

    fn genesis_fields<'a>(decimals: &'a [u8], baton: &'a [u8], qty: &'a [u8]) -> Vec<&'a [u8]> {
        let fields: [&[u8]; 10] = [
            b"SLP\0", &[0x01], b"GENESIS", b"TST", b"Test Token", b"", b"", decimals, baton, qty,
        ];
        fields.to_vec()
    }

    #[test]
    fn send_script_exact_bytes() {
        let script = build_send_script(TokenType::Fungible, &token_id(), &[1, 2]).unwrap();
        let expected = format!(
            "6a04534c500001010453454e4420{}08{}08{}",
            TOKEN, "0000000000000001", "0000000000000002"
        );
        assert_eq!(script.to_hex(), expected);
    }

    #[test]
    fn send_parse_roundtrip() {
        let script = build_send_script(TokenType::Fungible, &token_id(), &[100, 0, 7]).unwrap();
        let msg = SlpMessage::parse(&script).unwrap();
        assert_eq!(
            msg,
            SlpMessage::Send {
                token_type: TokenType::Fungible,
                token_id: token_id(),
                amounts: vec![100, 0, 7],
            }
        );
        assert_eq!(msg.token_id(), Some(token_id()));
        assert_eq!(msg.transaction_type(), "SEND");
    }

    #[test]
    fn send_output_count_limits() {
        assert!(matches!(
            build_send_script(TokenType::Fungible, &token_id(), &[]),
            Err(TokenError::InvalidOutputCount(_))
        ));
        assert!(build_send_script(TokenType::Fungible, &token_id(), &[1; 19]).is_ok());
        assert!(matches!(
            build_send_script(TokenType::Fungible, &token_id(), &[1; 20]),
            Err(TokenError::InvalidOutputCount(_))
        ));
    }

    #[test]
    fn send_with_twenty_amounts_is_invalid() {
        let id = token_id();
        let amount = 1u64.to_be_bytes();
        let header: [&[u8]; 4] = [b"SLP\0", &[0x01], b"SEND", id.as_bytes()];
        let mut fields = header.to_vec();
        fields.extend(std::iter::repeat(amount.as_slice()).take(20));
        assert!(SlpMessage::parse(&op_return(&fields)).is_err());
    }

    #[test]
    fn genesis_parse() {
        let qty = 21_000_000u64.to_be_bytes();
        let script = op_return(&genesis_fields(&[8], &[2], &qty));
        match SlpMessage::parse(&script).unwrap() {
            SlpMessage::Genesis {
                ticker,
                name,
                document_hash,
                decimals,
                mint_baton_vout,
                initial_quantity,
                ..
            } => {
                assert_eq!(ticker, "TST");
                assert_eq!(name, "Test Token");
                assert_eq!(document_hash, None);
                assert_eq!(decimals, 8);
                assert_eq!(mint_baton_vout, Some(2));
                assert_eq!(initial_quantity, 21_000_000);
            }
            other => panic!("expected GENESIS, got {:?}", other),
        }
    }

    #[test]
    fn genesis_to_script_roundtrip() {
        let msg = SlpMessage::Genesis {
            token_type: TokenType::Fungible,
            ticker: "ABC".into(),
            name: "Alphabet".into(),
            document_uri: "https://example.com".into(),
            document_hash: Some([7u8; 32]),
            decimals: 2,
            mint_baton_vout: None,
            initial_quantity: 5000,
        };
        let parsed = SlpMessage::parse(&msg.to_script().unwrap()).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn genesis_field_rules() {
        let qty = 1u64.to_be_bytes();
        // decimals above 9
        assert!(SlpMessage::parse(&op_return(&genesis_fields(&[10], &[], &qty))).is_err());
        // baton at vout 1
        assert!(SlpMessage::parse(&op_return(&genesis_fields(&[0], &[1], &qty))).is_err());
        // quantity not 8 bytes
        assert!(SlpMessage::parse(&op_return(&genesis_fields(&[0], &[], &[1]))).is_err());
        // wrong field count
        let mut fields = genesis_fields(&[0], &[], &qty);
        fields.push(b"extra");
        assert!(SlpMessage::parse(&op_return(&fields)).is_err());
        // document hash of the wrong size
        let mut fields = genesis_fields(&[0], &[], &qty);
        fields[6] = b"short";
        assert!(SlpMessage::parse(&op_return(&fields)).is_err());
    }

    #[test]
    fn nft_child_genesis_rules() {
        let one = 1u64.to_be_bytes();
        let mut fields = genesis_fields(&[0], &[], &one);
        fields[1] = &[0x41];
        assert!(SlpMessage::parse(&op_return(&fields)).is_ok());

        fields[7] = &[2];
        assert!(SlpMessage::parse(&op_return(&fields)).is_err());
    }

    #[test]
    fn mint_parse_and_rules() {
        let id = token_id();
        let qty = 500u64.to_be_bytes();
        let script = op_return(&[b"SLP\0", &[0x01], b"MINT", id.as_bytes(), &[3], &qty]);
        let msg = SlpMessage::parse(&script).unwrap();
        assert_eq!(msg.mint_baton_vout(), Some(3));
        assert_eq!(msg.token_id(), Some(id));

        let short = op_return(&[b"SLP\0", &[0x01], b"MINT", id.as_bytes(), &qty]);
        assert!(SlpMessage::parse(&short).is_err());

        let child = op_return(&[b"SLP\0", &[0x41], b"MINT", id.as_bytes(), &[], &qty]);
        assert!(SlpMessage::parse(&child).is_err());
    }

    #[test]
    fn two_byte_token_type() {
        let id = token_id();
        let amount = 9u64.to_be_bytes();
        let script = op_return(&[b"SLP\0", &[0x00, 0x01], b"SEND", id.as_bytes(), &amount]);
        assert_eq!(SlpMessage::parse(&script).unwrap().token_type(), TokenType::Fungible);
    }

    #[test]
    fn unknown_token_type_is_reported() {
        let id = token_id();
        let amount = 9u64.to_be_bytes();
        let script = op_return(&[b"SLP\0", &[0x02], b"SEND", id.as_bytes(), &amount]);
        assert!(matches!(
            SlpMessage::parse(&script),
            Err(TokenError::UnsupportedTokenType(0x02))
        ));
    }

    #[test]
    fn bare_op_0_is_rejected() {
        let id = token_id();
        let qty = 1u64.to_be_bytes();
        let mut script = Script::new();
        script.append_opcodes(&[OP_RETURN]).unwrap();
        let fields: [&[u8]; 4] = [b"SLP\0", &[0x01], b"MINT", id.as_bytes()];
        for field in fields {
            script.append_push_data(field).unwrap();
        }
        script.append_raw(&[0x00]); // OP_0 instead of an empty push
        script.append_push_data(&qty).unwrap();
        assert!(SlpMessage::parse(&script).is_err());
    }

    #[test]
    fn non_slp_scripts() {
        let p2pkh = Script::p2pkh(&[0u8; 20]);
        assert!(SlpMessage::parse(&p2pkh).is_err());
        assert!(SlpMessage::parse(&op_return(&[b"memo"])).is_err());
        assert!(SlpMessage::parse(&Script::new()).is_err());
    }
}
