use ethers::types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::Amount;

/// Success envelope returned by every endpoint
///
/// Errors use the same shape with `success: false` and an `error` string,
/// see [`crate::error::GatewayError`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Token metadata read from the contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    /// Base units, as a decimal string
    pub total_supply: String,
    pub formatted_total_supply: String,
    pub decimals: u8,
    pub contract_address: String,
}

/// Token balance of one account, in token units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub address: String,
    pub balance: String,
    pub formatted_balance: String,
}

/// Acknowledgement for a submitted mint, transfer or burn
///
/// Request fields are echoed exactly as the client sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxSubmission {
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    pub amount: Value,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxState {
    Success,
    Failed,
    Pending,
}

/// Receipt and transaction details for a hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStatus {
    pub hash: String,
    pub status: TxState,
    #[serde(flatten)]
    pub receipt: Option<ReceiptDetails>,
    #[serde(flatten)]
    pub transaction: Option<TransactionDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDetails {
    pub block_number: Option<u64>,
    pub gas_used: Option<String>,
    pub transaction_index: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub gas: String,
    pub gas_price: Option<String>,
}

/// Which contract function a gas estimate is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenFunction {
    Mint,
    Transfer,
    Burn,
}

impl TokenFunction {
    /// Case-insensitive lookup by contract function name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mint" => Some(Self::Mint),
            "transfer" => Some(Self::Transfer),
            "burn" => Some(Self::Burn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Transfer => "transfer",
            Self::Burn => "burn",
        }
    }
}

/// Validated parameters for a gas estimate
///
/// `amount` is in token units; estimates without one use a nominal amount.
#[derive(Debug, Clone, PartialEq)]
pub struct GasEstimateRequest {
    pub function: TokenFunction,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub amount: Option<Amount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasEstimate {
    pub function_name: String,
    pub estimated_gas: u64,
    pub gas_price: String,
    pub estimated_cost_wei: String,
    pub estimated_cost_eth: String,
}
