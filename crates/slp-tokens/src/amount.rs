//! Conversion between display amounts and token base units.
//!
//! SLP messages carry integer base units; the GENESIS `decimals` field says
//! where the decimal point sits for display. Conversions are exact: no
//! floating point, and digits beyond the token's precision are an error
//! unless they are zeros.

use crate::TokenError;

/// Scale a decimal string such as `"12.5"` to base units.
///
/// # Arguments
/// * `amount` - Non-negative decimal number; `"5"`, `"5."`, `".5"` and
///   `"5.50"` are accepted.
/// * `decimals` - The token's decimal precision.
///
/// # Returns
/// The amount in base units, or `InvalidAmount` for malformed input, excess
/// precision, or a result that does not fit in 64 bits.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<u64, TokenError> {
    let reject = |reason: &str| TokenError::InvalidAmount {
        amount: amount.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = amount.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(reject("no digits"));
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(reject("not a non-negative decimal number"));
    }

    let precision = decimals as usize;
    let significant = fraction.trim_end_matches('0');
    if significant.len() > precision {
        return Err(reject(&format!("more than {decimals} decimal places")));
    }

    let scale = 10u64
        .checked_pow(decimals as u32)
        .ok_or_else(|| reject("decimals out of range"))?;

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| reject("too large"))?
    };

    let padded = format!("{significant:0<precision$}");
    let fraction_units = if padded.is_empty() {
        0
    } else {
        padded.parse::<u64>().map_err(|_| reject("too large"))?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(|| reject("too large"))
}

/// Render base units as a decimal string, without trailing fraction zeros.
///
/// Takes a `u128` so aggregated balances format as well as single amounts.
pub fn format_base_units(units: u128, decimals: u8) -> String {
    if decimals == 0 {
        return units.to_string();
    }
    let digits = format!("{:0>width$}", units, width = decimals as usize + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}
