//! REST handlers
//!
//! Each handler validates its input, delegates to the [`TokenBackend`] and
//! wraps the result in the success envelope. Errors convert into the error
//! envelope through [`GatewayError`]'s `IntoResponse` impl.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use ethers::{types::H256, utils::to_checksum};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::server::AppState;
use crate::{
    contract::TokenBackend,
    error::{GatewayError, GatewayResult},
    types::{
        ApiResponse, Balance, GasEstimate, GasEstimateRequest, TokenFunction, TokenInfo,
        TransactionStatus, TxSubmission,
    },
    validation::{is_valid_address, parse_address, parse_amount, parse_tx_hash, require_fields},
};

type Body = Result<Json<Value>, JsonRejection>;

/// A missing or malformed JSON body counts as an empty one. A body that
/// could not be read at all (over the size limit) is rejected outright.
fn body_value(body: Body) -> GatewayResult<Option<Value>> {
    match body {
        Ok(Json(value)) => Ok(Some(value)),
        Err(JsonRejection::BytesRejection(rejection)) => {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                Err(GatewayError::PayloadTooLarge)
            } else {
                Err(GatewayError::Validation(rejection.body_text()))
            }
        }
        Err(rejection) => {
            debug!(error = %rejection, "Request body is not usable JSON");
            Ok(None)
        }
    }
}

fn private_key(fields: &serde_json::Map<String, Value>) -> GatewayResult<&str> {
    fields
        .get("private_key")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::validation("Invalid private key"))
}

fn submission(
    tx_hash: H256,
    from_address: Option<String>,
    to_address: Option<String>,
    amount: Value,
    message: &str,
) -> TxSubmission {
    TxSubmission {
        transaction_hash: format!("{:?}", tx_hash),
        from_address,
        to_address,
        amount,
        status: "pending".to_string(),
        message: message.to_string(),
    }
}

pub(super) async fn health<B: TokenBackend>(State(state): State<AppState<B>>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Smart Contract Backend API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "data": {
            "status": "UP",
            "network": state.network,
            "timestamp": chrono::Utc::now().timestamp_millis(),
        },
    }))
}

pub(super) async fn token_info<B: TokenBackend>(
    State(state): State<AppState<B>>,
) -> GatewayResult<Json<ApiResponse<TokenInfo>>> {
    info!("Fetching token information");
    let token_info = state.backend.token_info().await?;
    Ok(Json(ApiResponse::ok(token_info)))
}

pub(super) async fn balance<B: TokenBackend>(
    State(state): State<AppState<B>>,
    Path(address): Path<String>,
) -> GatewayResult<Json<ApiResponse<Balance>>> {
    if !is_valid_address(&address) {
        return Err(GatewayError::validation("Invalid Ethereum address"));
    }
    let parsed = address
        .parse()
        .map_err(|_| GatewayError::validation("Invalid Ethereum address"))?;

    info!(%address, "Fetching balance");
    let mut balance = state.backend.balance_of(parsed).await?;
    balance.address = address;
    Ok(Json(ApiResponse::ok(balance)))
}

pub(super) async fn mint<B: TokenBackend>(
    State(state): State<AppState<B>>,
    body: Body,
) -> GatewayResult<Json<ApiResponse<TxSubmission>>> {
    let body = body_value(body)?;
    let fields = require_fields(body.as_ref(), &["to_address", "amount"])?;

    let to = parse_address(fields, "to_address", "Invalid recipient address")?;
    let amount = parse_amount(&fields["amount"])?;

    info!(to = %to_checksum(&to, None), %amount, "Minting tokens");
    let tx_hash = state.backend.mint(to, &amount).await?;

    Ok(Json(ApiResponse::ok(submission(
        tx_hash,
        None,
        Some(to_checksum(&to, None)),
        fields["amount"].clone(),
        "Mint transaction submitted successfully",
    ))))
}

pub(super) async fn transfer<B: TokenBackend>(
    State(state): State<AppState<B>>,
    body: Body,
) -> GatewayResult<Json<ApiResponse<TxSubmission>>> {
    let body = body_value(body)?;
    let fields = require_fields(
        body.as_ref(),
        &["from_address", "to_address", "amount", "private_key"],
    )?;

    let from = parse_address(fields, "from_address", "Invalid sender address")?;
    let to = parse_address(fields, "to_address", "Invalid recipient address")?;
    let amount = parse_amount(&fields["amount"])?;
    let private_key = private_key(fields)?;

    info!(
        from = %to_checksum(&from, None),
        to = %to_checksum(&to, None),
        %amount,
        "Transferring tokens"
    );
    let tx_hash = state.backend.transfer(from, to, &amount, private_key).await?;

    Ok(Json(ApiResponse::ok(submission(
        tx_hash,
        Some(to_checksum(&from, None)),
        Some(to_checksum(&to, None)),
        fields["amount"].clone(),
        "Transfer transaction submitted successfully",
    ))))
}

pub(super) async fn burn<B: TokenBackend>(
    State(state): State<AppState<B>>,
    body: Body,
) -> GatewayResult<Json<ApiResponse<TxSubmission>>> {
    let body = body_value(body)?;
    let fields = require_fields(body.as_ref(), &["from_address", "amount", "private_key"])?;

    let from = parse_address(fields, "from_address", "Invalid address")?;
    let amount = parse_amount(&fields["amount"])?;
    let private_key = private_key(fields)?;

    info!(from = %to_checksum(&from, None), %amount, "Burning tokens");
    let tx_hash = state.backend.burn(from, &amount, private_key).await?;

    Ok(Json(ApiResponse::ok(submission(
        tx_hash,
        Some(to_checksum(&from, None)),
        None,
        fields["amount"].clone(),
        "Burn transaction submitted successfully",
    ))))
}

pub(super) async fn transaction_status<B: TokenBackend>(
    State(state): State<AppState<B>>,
    Path(tx_hash): Path<String>,
) -> GatewayResult<Json<ApiResponse<TransactionStatus>>> {
    let hash = parse_tx_hash(&tx_hash)?;
    info!(%tx_hash, "Fetching transaction status");
    let status = state.backend.transaction_status(hash).await?;
    Ok(Json(ApiResponse::ok(status)))
}

pub(super) async fn estimate_gas<B: TokenBackend>(
    State(state): State<AppState<B>>,
    body: Body,
) -> GatewayResult<Json<ApiResponse<GasEstimate>>> {
    let body = body_value(body)?;
    let fields = require_fields(body.as_ref(), &["function_name"])?;

    let function_name = fields["function_name"].as_str().unwrap_or_default();
    let function = TokenFunction::from_name(function_name)
        .ok_or_else(|| GatewayError::Validation(format!("Unknown function: {}", function_name)))?;

    let params = match fields.get("params") {
        None | Some(Value::Null) => json!({}),
        Some(params) if params.is_object() => params.clone(),
        Some(_) => return Err(GatewayError::validation("params must be an object")),
    };
    let required: &[&str] = match function {
        TokenFunction::Mint => &["to_address"],
        TokenFunction::Transfer => &["from_address", "to_address"],
        TokenFunction::Burn => &["from_address"],
    };
    let params = require_fields(Some(&params), required)?;

    let request = GasEstimateRequest {
        function,
        from: params
            .contains_key("from_address")
            .then(|| parse_address(params, "from_address", "Invalid sender address"))
            .transpose()?,
        to: params
            .contains_key("to_address")
            .then(|| parse_address(params, "to_address", "Invalid recipient address"))
            .transpose()?,
        amount: params.get("amount").map(parse_amount).transpose()?,
    };

    info!(function = function.as_str(), "Estimating gas");
    let mut estimate = state.backend.estimate_gas(request).await?;
    estimate.function_name = function_name.to_string();
    Ok(Json(ApiResponse::ok(estimate)))
}

pub(super) async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Not found" })),
    )
}

/// Give error responses produced outside the handlers (timeouts, wrong
/// method) the same JSON envelope as handler errors.
pub(super) async fn envelope_errors(response: Response) -> Response {
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if is_json {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let message = status.canonical_reason().unwrap_or("Request failed");
    (parts, Json(json!({ "success": false, "error": message }))).into_response()
}
