//! BIP-39 mnemonic phrases.
//!
//! Thin layer over the `bip39` crate: English word list only, whitespace
//! normalized before parsing.

use bip39::{Language, Mnemonic};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::PrimitivesError;

/// Validate a phrase and return its canonical single-spaced lowercase form.
pub fn normalize(phrase: &str) -> Result<String, PrimitivesError> {
    Ok(parse(phrase)?.to_string())
}

/// Compute the 64-byte BIP-39 seed for `phrase` and `passphrase`.
///
/// # Arguments
/// * `phrase` - 12 to 24 English words; extra whitespace and case are ignored
/// * `passphrase` - optional extension word, empty for none
///
/// # Returns
/// The seed, or `InvalidMnemonic` if a word is unknown or the checksum fails.
pub fn seed_from_mnemonic(phrase: &str, passphrase: &str) -> Result<[u8; 64], PrimitivesError> {
    Ok(parse(phrase)?.to_seed(passphrase))
}

/// Generate a fresh phrase with `word_count` words (12, 15, 18, 21 or 24).
pub fn generate(word_count: usize) -> Result<String, PrimitivesError> {
    if word_count % 3 != 0 || !(12..=24).contains(&word_count) {
        return Err(PrimitivesError::InvalidMnemonic(format!(
            "unsupported word count {word_count}"
        )));
    }
    let mut entropy = vec![0u8; word_count / 3 * 4];
    OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)?;
    Ok(mnemonic.to_string())
}

fn parse(phrase: &str) -> Result<Mnemonic, PrimitivesError> {
    let cleaned = phrase
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    Ok(Mnemonic::parse_in_normalized(Language::English, &cleaned)?)
}
