//! Contract Client Module
//!
//! Implements [`TokenBackend`] on top of an ethers `Provider`. The transport
//! (`Http` or `Ws`) is picked from the configured RPC URL; everything else
//! is shared.

use ethers::{
    abi::Detokenize,
    contract::ContractCall,
    middleware::SignerMiddleware,
    providers::{Http, JsonRpcClient, Middleware, Provider, Ws},
    signers::{LocalWallet, Signer},
    types::{Address, H256, TransactionReceipt, U256, U64},
    utils::to_checksum,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{TokenBackend, TokenContract};
use crate::{
    config::{Config, GasConfig},
    error::{GatewayError, GatewayResult},
    types::{
        Balance, GasEstimate, GasEstimateRequest, ReceiptDetails, TokenFunction, TokenInfo,
        TransactionDetails, TransactionStatus, TxState,
    },
    units::{ETHER_DECIMALS, apply_multiplier, format_units_exact, format_units_fixed, to_base_units},
    validation::Amount,
};

/// Amount used for gas estimates that do not name one, in base units.
const NOMINAL_ESTIMATE_AMOUNT: u64 = 100;

type SignerClient<P> = SignerMiddleware<Provider<P>, LocalWallet>;

/// Client for the configured token contract
pub struct ContractClient<P: JsonRpcClient + Clone + 'static> {
    provider: Provider<P>,
    contract: TokenContract<Provider<P>>,
    address: Address,
    chain_id: u64,
    /// Owner account used for minting, if configured
    owner: Option<LocalWallet>,
    gas: GasConfig,
}

impl ContractClient<Http> {
    /// Connect over HTTP(S)
    pub async fn connect_http(config: &Config) -> GatewayResult<Self> {
        let provider = Provider::<Http>::try_from(config.network.rpc_url.as_str())
            .map_err(|e| GatewayError::Config(format!("Invalid RPC URL: {}", e)))?;
        Self::new(provider, config).await
    }
}

impl ContractClient<Ws> {
    /// Connect over WebSocket
    pub async fn connect_ws(config: &Config) -> GatewayResult<Self> {
        let ws = Ws::connect(config.network.rpc_url.as_str())
            .await
            .map_err(|e| GatewayError::Provider(format!("Failed to connect to blockchain network: {}", e)))?;
        Self::new(Provider::new(ws), config).await
    }
}

impl<P: JsonRpcClient + Clone + 'static> ContractClient<P> {
    /// Wrap an existing provider
    ///
    /// Fails if the node is unreachable, the contract address is malformed or
    /// the owner key cannot be parsed. A chain ID differing from the
    /// configuration is only logged.
    pub async fn new(provider: Provider<P>, config: &Config) -> GatewayResult<Self> {
        let chain_id = provider.get_chainid().await.map_err(|e| {
            GatewayError::Provider(format!("Failed to connect to blockchain network: {}", e))
        })?;

        if chain_id != U256::from(config.network.chain_id) {
            warn!(
                expected = config.network.chain_id,
                actual = %chain_id,
                "Connected chain differs from configuration"
            );
        }
        info!(
            network = %config.network.name,
            chain_id = %chain_id,
            "Connected to blockchain network"
        );

        let address: Address = config
            .contract
            .address
            .trim()
            .parse()
            .map_err(|_| GatewayError::Config(format!("Invalid contract address: {}", config.contract.address)))?;

        let owner = match config.contract.owner_private_key.as_deref() {
            Some(key) => {
                let wallet = key
                    .trim()
                    .parse::<LocalWallet>()
                    .map_err(|_| GatewayError::Config("Invalid owner private key".to_string()))?
                    .with_chain_id(config.network.chain_id);
                info!(owner = %to_checksum(&wallet.address(), None), "Owner account configured");
                Some(wallet)
            }
            None => {
                warn!("No owner private key configured, minting is disabled");
                None
            }
        };

        let contract = TokenContract::new(address, Arc::new(provider.clone()));
        info!(contract = %to_checksum(&address, None), "Contract loaded");

        Ok(Self {
            provider,
            contract,
            address,
            chain_id: config.network.chain_id,
            owner,
            gas: config.gas.clone(),
        })
    }

    async fn decimals(&self) -> GatewayResult<u8> {
        Ok(self.contract.decimals().call().await?)
    }

    fn owner(&self) -> GatewayResult<&LocalWallet> {
        self.owner
            .as_ref()
            .ok_or_else(|| GatewayError::Signer("No account configured for minting".to_string()))
    }

    /// Build a wallet from a caller-supplied key and check it controls `from`
    fn caller_wallet(&self, private_key: &str, from: Address, mismatch: &str) -> GatewayResult<LocalWallet> {
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()?
            .with_chain_id(self.chain_id);

        if wallet.address() != from {
            return Err(GatewayError::validation(mismatch));
        }
        Ok(wallet)
    }

    fn signed_contract(&self, wallet: LocalWallet) -> TokenContract<SignerClient<P>> {
        let client = SignerMiddleware::new(self.provider.clone(), wallet);
        TokenContract::new(self.address, Arc::new(client))
    }

    /// Price, sign and broadcast a contract call as a legacy transaction
    ///
    /// The nonce is filled in by the signer middleware.
    async fn submit<D: Detokenize>(
        &self,
        call: ContractCall<SignerClient<P>, D>,
        gas_limit: u64,
    ) -> GatewayResult<H256> {
        let node_price = self.provider.get_gas_price().await?;
        let call = self.priced(call, gas_limit, node_price);
        let pending = call.send().await?;
        Ok(pending.tx_hash())
    }

    /// Turn a call into a legacy transaction with a fixed gas limit and the
    /// node's gas price scaled by the configured multiplier
    fn priced<D: Detokenize>(
        &self,
        call: ContractCall<SignerClient<P>, D>,
        gas_limit: u64,
        node_price: U256,
    ) -> ContractCall<SignerClient<P>, D> {
        let gas_price = apply_multiplier(node_price, self.gas.price_multiplier);
        debug!(%node_price, %gas_price, gas_limit, "Pricing transaction");
        call.legacy().gas(gas_limit).gas_price(gas_price)
    }

    async fn base_units(&self, amount: &Amount) -> GatewayResult<U256> {
        let decimals = self.decimals().await?;
        to_base_units(amount.as_str(), decimals)
    }
}

impl<P: JsonRpcClient + Clone + 'static> TokenBackend for ContractClient<P> {
    async fn token_info(&self) -> GatewayResult<TokenInfo> {
        let (name, symbol, supply, decimals) = (
            self.contract.name(),
            self.contract.symbol(),
            self.contract.total_supply(),
            self.contract.decimals(),
        );
        let (name, symbol, total_supply, decimals) =
            tokio::try_join!(name.call(), symbol.call(), supply.call(), decimals.call())?;

        debug!(%name, %symbol, "Fetched token info");
        Ok(TokenInfo {
            name,
            symbol,
            total_supply: total_supply.to_string(),
            formatted_total_supply: format_units_fixed(total_supply, decimals, 4),
            decimals,
            contract_address: to_checksum(&self.address, None),
        })
    }

    async fn balance_of(&self, address: Address) -> GatewayResult<Balance> {
        let (balance, decimals) = (self.contract.balance_of(address), self.contract.decimals());
        let (raw, decimals) = tokio::try_join!(balance.call(), decimals.call())?;

        Ok(Balance {
            address: to_checksum(&address, None),
            balance: format_units_exact(raw, decimals),
            formatted_balance: format_units_fixed(raw, decimals, 4),
        })
    }

    async fn mint(&self, to: Address, amount: &Amount) -> GatewayResult<H256> {
        let owner = self.owner()?.clone();
        let amount = self.base_units(amount).await?;

        let contract = self.signed_contract(owner);
        let tx_hash = self.submit(contract.mint(to, amount), self.gas.mint_gas_limit).await?;
        info!(tx_hash = ?tx_hash, to = ?to, %amount, "Mint transaction sent");
        Ok(tx_hash)
    }

    async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: &Amount,
        private_key: &str,
    ) -> GatewayResult<H256> {
        let wallet = self.caller_wallet(private_key, from, "Private key does not match sender address")?;
        let amount = self.base_units(amount).await?;

        let contract = self.signed_contract(wallet);
        let tx_hash = self
            .submit(contract.transfer(to, amount), self.gas.transfer_gas_limit)
            .await?;
        info!(tx_hash = ?tx_hash, from = ?from, to = ?to, %amount, "Transfer transaction sent");
        Ok(tx_hash)
    }

    async fn burn(&self, from: Address, amount: &Amount, private_key: &str) -> GatewayResult<H256> {
        let wallet = self.caller_wallet(private_key, from, "Private key does not match burner address")?;
        let amount = self.base_units(amount).await?;

        let contract = self.signed_contract(wallet);
        let tx_hash = self.submit(contract.burn(amount), self.gas.burn_gas_limit).await?;
        info!(tx_hash = ?tx_hash, from = ?from, %amount, "Burn transaction sent");
        Ok(tx_hash)
    }

    async fn transaction_status(&self, tx_hash: H256) -> GatewayResult<TransactionStatus> {
        let (receipt, transaction) = tokio::try_join!(
            self.provider.get_transaction_receipt(tx_hash),
            self.provider.get_transaction(tx_hash),
        )?;

        let status = match &receipt {
            Some(receipt) => receipt_state(receipt),
            None => TxState::Pending,
        };

        Ok(TransactionStatus {
            hash: format!("{:?}", tx_hash),
            status,
            receipt: receipt.map(|receipt| ReceiptDetails {
                block_number: receipt.block_number.map(|n| n.as_u64()),
                gas_used: receipt.gas_used.map(|g| g.to_string()),
                transaction_index: receipt.transaction_index.as_u64(),
            }),
            transaction: transaction.map(|tx| TransactionDetails {
                from: to_checksum(&tx.from, None),
                to: tx.to.map(|to| to_checksum(&to, None)),
                value: tx.value.to_string(),
                gas: tx.gas.to_string(),
                gas_price: tx.gas_price.map(|p| p.to_string()),
            }),
        })
    }

    async fn estimate_gas(&self, request: GasEstimateRequest) -> GatewayResult<GasEstimate> {
        let amount = match &request.amount {
            Some(amount) => self.base_units(amount).await?,
            None => U256::from(NOMINAL_ESTIMATE_AMOUNT),
        };
        let missing = |field: &str| GatewayError::Validation(format!("Missing required parameter: {}", field));

        let estimate = match request.function {
            TokenFunction::Mint => {
                let owner = self.owner()?.address();
                let to = request.to.ok_or_else(|| missing("to_address"))?;
                self.contract.mint(to, amount).from(owner).estimate_gas().await?
            }
            TokenFunction::Transfer => {
                let from = request.from.ok_or_else(|| missing("from_address"))?;
                let to = request.to.ok_or_else(|| missing("to_address"))?;
                self.contract.transfer(to, amount).from(from).estimate_gas().await?
            }
            TokenFunction::Burn => {
                let from = request.from.ok_or_else(|| missing("from_address"))?;
                self.contract.burn(amount).from(from).estimate_gas().await?
            }
        };
        let estimated_gas = estimate.min(U256::from(u64::MAX)).as_u64();

        // Cost is informational; a failed price lookup does not fail the estimate.
        let gas_price = match self.provider.get_gas_price().await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(error = %e, "Failed to fetch gas price for cost estimate");
                None
            }
        };
        let (cost_wei, estimated_cost_eth) = match gas_price {
            Some(price) => {
                let cost_wei = estimate.saturating_mul(price);
                (cost_wei, format_units_fixed(cost_wei, ETHER_DECIMALS, 8))
            }
            None => (U256::zero(), "0.0".to_string()),
        };

        Ok(GasEstimate {
            function_name: request.function.as_str().to_string(),
            estimated_gas,
            gas_price: gas_price.unwrap_or_default().to_string(),
            estimated_cost_wei: cost_wei.to_string(),
            estimated_cost_eth,
        })
    }
}

fn receipt_state(receipt: &TransactionReceipt) -> TxState {
    if receipt.status == Some(U64::from(1)) {
        TxState::Success
    } else {
        TxState::Failed
    }
}
