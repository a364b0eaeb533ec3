//! Base58 and Base58Check encoding.
//!
//! Legacy addresses and WIF private keys are Base58Check: the payload
//! followed by the first four bytes of its double SHA-256.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Encode bytes with the Bitcoin Base58 alphabet.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decode a Base58 string.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Append a four byte SHA-256d checksum to `data` and Base58 encode it.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + 4);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..4]);
    encode(&payload)
}

/// Decode a Base58Check string and verify its checksum.
///
/// # Returns
/// The payload without the checksum, `ChecksumMismatch` if the trailing
/// four bytes do not match.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let mut decoded = decode(s)?;
    if decoded.len() < 4 {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let checksum_start = decoded.len() - 4;
    let expected = sha256d(&decoded[..checksum_start]);
    if decoded[checksum_start..] != expected[..4] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    decoded.truncate(checksum_start);
    Ok(decoded)
}
