//! Conversions between human-readable token amounts and on-chain base units.
//!
//! All arithmetic is done on decimal strings and `U256`, never through
//! floating point, so amounts with many fractional digits survive intact.

use ethers::types::U256;

use crate::error::{GatewayError, GatewayResult};

/// Decimals of the native currency (wei → ETH).
pub const ETHER_DECIMALS: u8 = 18;

/// Scale a normalized decimal string (`"12.5"`) to base units.
///
/// Fractional digits beyond `decimals` are truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> GatewayResult<U256> {
    let (int_part, frac_part) = amount.split_once('.').unwrap_or((amount, ""));
    let decimals = decimals as usize;

    let mut digits = String::with_capacity(int_part.len() + decimals);
    digits.push_str(int_part);
    digits.extend(frac_part.chars().chain(std::iter::repeat('0')).take(decimals));

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Err(GatewayError::validation(
            "Amount is smaller than the token's smallest unit",
        ));
    }

    U256::from_dec_str(trimmed).map_err(|_| GatewayError::validation("Invalid amount"))
}

/// Render base units as an exact decimal, trailing zeros trimmed.
pub fn format_units_exact(value: U256, decimals: u8) -> String {
    let (int_part, frac_part) = split_digits(&value.to_string(), decimals as usize);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Render base units with exactly `places` fractional digits, rounding half up.
pub fn format_units_fixed(value: U256, decimals: u8, places: u8) -> String {
    let (decimals, places) = (decimals as usize, places as usize);

    let scaled = if decimals > places {
        // 10^shift past U256 means any value rounds to zero.
        match U256::from(10).checked_pow(U256::from(decimals - places)) {
            Some(divisor) => value.saturating_add(divisor / 2) / divisor,
            None => U256::zero(),
        }
    } else {
        value.saturating_mul(U256::exp10(places - decimals))
    };

    let (int_part, frac_part) = split_digits(&scaled.to_string(), places);
    if places == 0 {
        int_part
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Multiply a gas price by a configured factor, at millis precision.
pub fn apply_multiplier(gas_price: U256, multiplier: f64) -> U256 {
    let millis = (multiplier * 1000.0).round().max(0.0) as u64;
    gas_price.saturating_mul(U256::from(millis)) / U256::from(1000)
}

fn split_digits(digits: &str, decimals: usize) -> (String, String) {
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    (int_part.to_string(), frac_part.to_string())
}
