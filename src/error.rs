//! Gateway error type and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ethers::{
    contract::ContractError,
    providers::{Middleware, ProviderError},
    signers::WalletError,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure a request can end in
///
/// The message is returned to the client verbatim, so variants carry the
/// human-readable text rather than a source error.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed or missing request input
    #[error("{0}")]
    Validation(String),

    /// Request body over the configured size limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Invalid or incomplete gateway configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Contract call reverted or could not be decoded
    #[error("{0}")]
    Contract(String),

    /// JSON-RPC transport or node error
    #[error("{0}")]
    Provider(String),

    /// Signing account missing or unusable
    #[error("{0}")]
    Signer(String),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Config(_)
            | GatewayError::Contract(_)
            | GatewayError::Provider(_)
            | GatewayError::Signer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(error = %message, "Request failed");
        } else {
            warn!(error = %message, "Request rejected");
        }

        let body = json!({
            "success": false,
            "error": message,
        });
        (status, Json(body)).into_response()
    }
}

impl<M: Middleware> From<ContractError<M>> for GatewayError {
    fn from(err: ContractError<M>) -> Self {
        match err {
            ContractError::ProviderError { e } => GatewayError::Provider(e.to_string()),
            other => GatewayError::Contract(other.to_string()),
        }
    }
}

impl From<ProviderError> for GatewayError {
    fn from(err: ProviderError) -> Self {
        GatewayError::Provider(err.to_string())
    }
}

// Caller-supplied keys. The owner key maps to `Config` where it is loaded.
impl From<WalletError> for GatewayError {
    fn from(_: WalletError) -> Self {
        GatewayError::validation("Invalid private key")
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
