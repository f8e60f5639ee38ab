use ethers::types::{Address, H256};
use std::future::Future;

use crate::{
    error::GatewayResult,
    types::{Balance, GasEstimate, GasEstimateRequest, TokenInfo, TransactionStatus},
    validation::Amount,
};

/// Operations the gateway performs against the token contract
///
/// Handlers only see this trait, so the router can be driven by any
/// implementation. Inputs are already validated; amounts are in token units.
pub trait TokenBackend: Send + Sync + 'static {
    fn token_info(&self) -> impl Future<Output = GatewayResult<TokenInfo>> + Send;

    fn balance_of(&self, address: Address) -> impl Future<Output = GatewayResult<Balance>> + Send;

    /// Mint from the configured owner account.
    fn mint(&self, to: Address, amount: &Amount) -> impl Future<Output = GatewayResult<H256>> + Send;

    /// Transfer signed with the caller-supplied key, which must belong to `from`.
    fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: &Amount,
        private_key: &str,
    ) -> impl Future<Output = GatewayResult<H256>> + Send;

    /// Burn signed with the caller-supplied key, which must belong to `from`.
    fn burn(
        &self,
        from: Address,
        amount: &Amount,
        private_key: &str,
    ) -> impl Future<Output = GatewayResult<H256>> + Send;

    fn transaction_status(
        &self,
        tx_hash: H256,
    ) -> impl Future<Output = GatewayResult<TransactionStatus>> + Send;

    fn estimate_gas(
        &self,
        request: GasEstimateRequest,
    ) -> impl Future<Output = GatewayResult<GasEstimate>> + Send;
}
