//! Tests for the REST API
//!
//! Drives the full router in-process against a scripted backend, checking
//! status codes, envelopes and validation order.

#[cfg(test)]
mod tests {
    use crate::{
        api::{AppState, router},
        config::{ApiConfig, NetworkInfo},
        contract::TokenBackend,
        error::{GatewayError, GatewayResult},
        types::{
            Balance, GasEstimate, GasEstimateRequest, ReceiptDetails, TokenFunction, TokenInfo,
            TransactionStatus, TxState,
        },
        validation::Amount,
    };
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use ethers::types::{Address, H256};
    use serde_json::{Value, json};
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tower::ServiceExt;

    const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    const BOB: &str = "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359";
    const ALICE_KEY: &str = "alice-key";

    /// Backend that records what it was asked and answers from fixed data
    #[derive(Default)]
    struct MockBackend {
        calls: Mutex<Vec<String>>,
        /// When set, every call fails with this provider error
        failure: Option<String>,
        /// When set, token info answers only after this long
        delay: Option<Duration>,
    }

    impl MockBackend {
        fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Default::default()
            }
        }

        fn record(&self, call: String) -> GatewayResult<()> {
            self.calls.lock().unwrap().push(call);
            match &self.failure {
                Some(message) => Err(GatewayError::Provider(message.clone())),
                None => Ok(()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn check_key(&self, from: Address, private_key: &str) -> GatewayResult<()> {
            let alice: Address = ALICE.parse().unwrap();
            if from == alice && private_key == ALICE_KEY {
                Ok(())
            } else {
                Err(GatewayError::validation("Private key does not match sender address"))
            }
        }
    }

    impl TokenBackend for MockBackend {
        async fn token_info(&self) -> GatewayResult<TokenInfo> {
            self.record("token_info".to_string())?;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(TokenInfo {
                name: "Gateway Token".to_string(),
                symbol: "GWT".to_string(),
                total_supply: "1000000000000000000000".to_string(),
                formatted_total_supply: "1000.0000".to_string(),
                decimals: 18,
                contract_address: BOB.to_string(),
            })
        }

        async fn balance_of(&self, address: Address) -> GatewayResult<Balance> {
            self.record(format!("balance_of {:?}", address))?;
            Ok(Balance {
                address: format!("{:?}", address),
                balance: "12.5".to_string(),
                formatted_balance: "12.5000".to_string(),
            })
        }

        async fn mint(&self, to: Address, amount: &Amount) -> GatewayResult<H256> {
            self.record(format!("mint {:?} {}", to, amount))?;
            Ok(H256::repeat_byte(0x01))
        }

        async fn transfer(
            &self,
            from: Address,
            to: Address,
            amount: &Amount,
            private_key: &str,
        ) -> GatewayResult<H256> {
            self.record(format!("transfer {:?} {:?} {}", from, to, amount))?;
            self.check_key(from, private_key)?;
            Ok(H256::repeat_byte(0x02))
        }

        async fn burn(&self, from: Address, amount: &Amount, private_key: &str) -> GatewayResult<H256> {
            self.record(format!("burn {:?} {}", from, amount))?;
            self.check_key(from, private_key)?;
            Ok(H256::repeat_byte(0x03))
        }

        async fn transaction_status(&self, tx_hash: H256) -> GatewayResult<TransactionStatus> {
            self.record(format!("transaction_status {:?}", tx_hash))?;
            Ok(TransactionStatus {
                hash: format!("{:?}", tx_hash),
                status: TxState::Success,
                receipt: Some(ReceiptDetails {
                    block_number: Some(42),
                    gas_used: Some("51234".to_string()),
                    transaction_index: 0,
                }),
                transaction: None,
            })
        }

        async fn estimate_gas(&self, request: GasEstimateRequest) -> GatewayResult<GasEstimate> {
            self.record(format!(
                "estimate_gas {} {:?} {:?} {:?}",
                request.function.as_str(),
                request.from,
                request.to,
                request.amount.as_ref().map(Amount::as_str),
            ))?;
            Ok(GasEstimate {
                function_name: request.function.as_str().to_string(),
                estimated_gas: 51234,
                gas_price: "1000000000".to_string(),
                estimated_cost_wei: "51234000000000".to_string(),
                estimated_cost_eth: "0.00005123".to_string(),
            })
        }
    }

    fn app(backend: Arc<MockBackend>) -> Router {
        app_with(backend, ApiConfig::default())
    }

    fn app_with(backend: Arc<MockBackend>, api: ApiConfig) -> Router {
        let state = AppState::new(backend, NetworkInfo::for_chain(11155111));
        router(state, &api)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_network() {
        let (status, body) = send(app(Arc::default()), get("/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Smart Contract Backend API is running");
        assert_eq!(body["data"]["status"], "UP");
        assert_eq!(body["data"]["network"]["name"], "Sepolia Testnet");
        assert_eq!(body["data"]["network"]["chain_id"], 11155111);
        assert!(body["data"]["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_token_info_wraps_data() {
        let (status, body) = send(app(Arc::default()), get("/api/token/info")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["symbol"], "GWT");
        assert_eq!(body["data"]["decimals"], 18);
        assert_eq!(body["data"]["formatted_total_supply"], "1000.0000");
    }

    #[tokio::test]
    async fn test_backend_failure_is_500_with_message() {
        let backend = Arc::new(MockBackend::failing("connection refused"));
        let (status, body) = send(app(backend), get("/api/token/info")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "success": false, "error": "connection refused" }));
    }

    #[tokio::test]
    async fn test_balance_requires_checksummed_address() {
        let backend = Arc::new(MockBackend::default());
        let uri = format!("/api/balance/{}", ALICE.to_lowercase());
        let (status, body) = send(app(backend.clone()), get(&uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid Ethereum address");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_balance_echoes_address() {
        let uri = format!("/api/balance/{}", ALICE);
        let (status, body) = send(app(Arc::default()), get(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["address"], ALICE);
        assert_eq!(body["data"]["balance"], "12.5");
        assert_eq!(body["data"]["formatted_balance"], "12.5000");
    }

    #[tokio::test]
    async fn test_mint_missing_fields() {
        let (status, body) = send(
            app(Arc::default()),
            post_json("/api/mint", json!({ "to_address": ALICE })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing required fields: to_address, amount");
    }

    #[tokio::test]
    async fn test_mint_without_json_body() {
        let request = Request::post("/api/mint").body(Body::from("to=me")).unwrap();
        let (status, body) = send(app(Arc::default()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: to_address, amount");
    }

    #[tokio::test]
    async fn test_mint_rejects_bad_address_then_bad_amount() {
        let (status, body) = send(
            app(Arc::default()),
            post_json("/api/mint", json!({ "to_address": "0x1234", "amount": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid recipient address");

        let (status, body) = send(
            app(Arc::default()),
            post_json("/api/mint", json!({ "to_address": ALICE, "amount": -3 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid amount");
    }

    #[tokio::test]
    async fn test_mint_submits_and_echoes_fields() {
        let backend = Arc::new(MockBackend::default());
        let (status, body) = send(
            app(backend.clone()),
            post_json("/api/mint", json!({ "to_address": ALICE, "amount": "1.50" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["transaction_hash"], format!("0x{}", "01".repeat(32)));
        assert_eq!(body["data"]["to_address"], ALICE);
        assert_eq!(body["data"]["amount"], "1.50");
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["message"], "Mint transaction submitted successfully");
        assert!(body["data"].get("from_address").is_none());

        let alice: Address = ALICE.parse().unwrap();
        assert_eq!(backend.calls(), vec![format!("mint {:?} 1.5", alice)]);
    }

    #[tokio::test]
    async fn test_transfer_checks_sender_before_recipient() {
        let (status, body) = send(
            app(Arc::default()),
            post_json(
                "/api/transfer",
                json!({
                    "from_address": "nope",
                    "to_address": "also-nope",
                    "amount": 1,
                    "private_key": ALICE_KEY,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid sender address");
    }

    #[tokio::test]
    async fn test_transfer_success() {
        let backend = Arc::new(MockBackend::default());
        let (status, body) = send(
            app(backend.clone()),
            post_json(
                "/api/transfer",
                json!({
                    "from_address": ALICE,
                    "to_address": BOB,
                    "amount": 2.5,
                    "private_key": ALICE_KEY,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["from_address"], ALICE);
        assert_eq!(body["data"]["to_address"], BOB);
        assert_eq!(body["data"]["amount"], 2.5);
        assert_eq!(body["data"]["message"], "Transfer transaction submitted successfully");
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_transfer_with_foreign_key_is_400() {
        let (status, body) = send(
            app(Arc::default()),
            post_json(
                "/api/transfer",
                json!({
                    "from_address": BOB,
                    "to_address": ALICE,
                    "amount": 1,
                    "private_key": ALICE_KEY,
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Private key does not match sender address");
    }

    #[tokio::test]
    async fn test_burn_lists_all_required_fields() {
        let (status, body) = send(
            app(Arc::default()),
            post_json("/api/burn", json!({ "from_address": ALICE, "amount": 1 })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: from_address, amount, private_key");
    }

    #[tokio::test]
    async fn test_burn_success() {
        let (status, body) = send(
            app(Arc::default()),
            post_json(
                "/api/burn",
                json!({ "from_address": ALICE, "amount": "3", "private_key": ALICE_KEY }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["from_address"], ALICE);
        assert_eq!(body["data"]["amount"], "3");
        assert_eq!(body["data"]["message"], "Burn transaction submitted successfully");
        assert!(body["data"].get("to_address").is_none());
    }

    #[tokio::test]
    async fn test_transaction_status() {
        let hash = format!("0x{}", "cd".repeat(32));
        let (status, body) = send(app(Arc::default()), get(&format!("/api/transaction/{}", hash))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["hash"], hash);
        assert_eq!(body["data"]["status"], "success");
        assert_eq!(body["data"]["block_number"], 42);
        assert_eq!(body["data"]["gas_used"], "51234");
        assert!(body["data"].get("from").is_none());
    }

    #[tokio::test]
    async fn test_transaction_status_rejects_malformed_hash() {
        let backend = Arc::new(MockBackend::default());
        let (status, body) = send(app(backend.clone()), get("/api/transaction/0xdeadbeef")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid transaction hash");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_gas_estimate_validation() {
        let (status, body) = send(app(Arc::default()), post_json("/api/gas/estimate", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: function_name");

        let (status, body) = send(
            app(Arc::default()),
            post_json("/api/gas/estimate", json!({ "function_name": "approve" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Unknown function: approve");

        let (status, body) = send(
            app(Arc::default()),
            post_json(
                "/api/gas/estimate",
                json!({ "function_name": "transfer", "params": { "to_address": BOB } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields: from_address, to_address");
    }

    #[tokio::test]
    async fn test_gas_estimate_success_echoes_function_name() {
        let backend = Arc::new(MockBackend::default());
        let (status, body) = send(
            app(backend.clone()),
            post_json(
                "/api/gas/estimate",
                json!({ "function_name": "Burn", "params": { "from_address": ALICE, "amount": "10" } }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["function_name"], "Burn");
        assert_eq!(body["data"]["estimated_gas"], 51234);
        assert_eq!(body["data"]["estimated_cost_eth"], "0.00005123");

        let alice: Address = ALICE.parse().unwrap();
        assert_eq!(
            backend.calls(),
            vec![format!("estimate_gas burn Some({:?}) None Some(\"10\")", alice)]
        );
        assert_eq!(TokenFunction::from_name("BURN"), Some(TokenFunction::Burn));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let (status, body) = send(app(Arc::default()), get("/api/unknown")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "error": "Not found" }));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let backend = Arc::new(MockBackend::default());
        let api = ApiConfig {
            max_request_size: 32,
            ..ApiConfig::default()
        };
        let (status, body) = send(
            app_with(backend.clone(), api),
            post_json("/api/mint", json!({ "to_address": ALICE, "amount": "1" })),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({ "success": false, "error": "Request body too large" }));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_envelope() {
        let (status, body) = send(app(Arc::default()), get("/api/mint")).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({ "success": false, "error": "Method Not Allowed" }));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out_with_envelope() {
        let backend = Arc::new(MockBackend {
            delay: Some(Duration::from_secs(30)),
            ..Default::default()
        });
        let api = ApiConfig {
            request_timeout_secs: 1,
            ..ApiConfig::default()
        };
        let (status, body) = send(app_with(backend, api), get("/api/token/info")).await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, json!({ "success": false, "error": "Request Timeout" }));
    }
}
