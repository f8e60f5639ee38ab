use ethers::types::{Address, H256};
use ethers::utils::to_checksum;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};

/// A strictly positive decimal amount in token units
///
/// Holds the normalized decimal text (no sign, no exponent, no leading
/// zeros) so it can be scaled to base units without floating point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that `address` is a well-formed, EIP-55 checksummed address
///
/// All-lowercase and all-uppercase forms are rejected unless they happen to
/// equal the checksum encoding.
pub fn is_valid_address(address: &str) -> bool {
    let Some(hex) = address.strip_prefix("0x") else {
        return false;
    };
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    match address.parse::<Address>() {
        Ok(parsed) => to_checksum(&parsed, None) == address,
        Err(_) => false,
    }
}

/// Ensure the body is a JSON object carrying every field in `fields`
pub fn require_fields<'a>(
    body: Option<&'a Value>,
    fields: &[&str],
) -> GatewayResult<&'a Map<String, Value>> {
    let missing = || {
        GatewayError::Validation(format!("Missing required fields: {}", fields.join(", ")))
    };

    let object = body.and_then(Value::as_object).ok_or_else(missing)?;
    if fields.iter().all(|field| object.contains_key(*field)) {
        Ok(object)
    } else {
        Err(missing())
    }
}

/// Read `field` as a checksummed address, failing with `message`
pub fn parse_address(
    body: &Map<String, Value>,
    field: &str,
    message: &str,
) -> GatewayResult<Address> {
    let raw = body.get(field).and_then(Value::as_str).unwrap_or_default();
    if !is_valid_address(raw) {
        debug!(field, value = raw, "Address failed validation");
        return Err(GatewayError::validation(message));
    }
    raw.parse()
        .map_err(|_| GatewayError::validation(message))
}

/// Parse a JSON number or numeric string as a positive amount
pub fn parse_amount(value: &Value) -> GatewayResult<Amount> {
    let invalid = || GatewayError::validation("Invalid amount");

    let text = match value {
        Value::Number(n) if n.is_f64() => {
            let f = n.as_f64().ok_or_else(invalid)?;
            if !f.is_finite() {
                return Err(invalid());
            }
            // f64 Display never uses exponent notation.
            f.to_string()
        }
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err(invalid()),
    };

    let normalized = match normalize_decimal(&text) {
        Some(normalized) => normalized,
        None => {
            let f: f64 = text.parse().map_err(|_| invalid())?;
            if !f.is_finite() {
                return Err(invalid());
            }
            normalize_decimal(&f.to_string()).ok_or_else(invalid)?
        }
    };

    if normalized.chars().all(|c| c == '0' || c == '.') {
        return Err(invalid());
    }
    Ok(Amount(normalized))
}

/// Parse a 0x-prefixed 32-byte transaction hash
pub fn parse_tx_hash(tx_hash: &str) -> GatewayResult<H256> {
    let invalid = || GatewayError::validation("Invalid transaction hash");
    let hex = tx_hash.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    tx_hash.parse().map_err(|_| invalid())
}

/// Accepts `[+]digits[.digits]` or `[+].digits`; negatives and exponents fall through.
fn normalize_decimal(text: &str) -> Option<String> {
    let text = text.strip_prefix('+').unwrap_or(text);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit()) || !frac_part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let int_part = match int_part.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };
    let frac_part = frac_part.trim_end_matches('0');

    Some(if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    })
}
