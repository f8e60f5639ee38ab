//! Request Validation Module
//!
//! This module validates request input before anything reaches the chain:
//! field presence, EIP-55 checksummed addresses, positive amounts and
//! transaction hashes.

mod validator;
pub use validator::{
    Amount, is_valid_address, parse_address, parse_amount, parse_tx_hash, require_fields,
};
