//! Configuration Module
//!
//! This module defines all configuration structures for the gateway.
//! Configuration is loaded from a TOML file, parsed using serde, and then
//! overridden by environment variables (a `.env` file is honoured).

use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::{debug, info};

use crate::error::GatewayError;

/// Value shipped in example configs for the contract address. Treated as unset.
const ADDRESS_PLACEHOLDER: &str = "0x...";

/// Main configuration structure
///
/// Contains all configuration sections for the gateway.
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "0.0.0.0"
/// port = 5000
///
/// [network]
/// name = "Sepolia Testnet"
/// rpc_url = "https://sepolia.infura.io/v3/<project>"
/// chain_id = 11155111
///
/// [contract]
/// address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
///
/// [gas]
/// price_multiplier = 1.1
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub network: NetworkConfig,
    pub contract: ContractConfig,
    pub gas: GasConfig,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on
/// - `max_request_size`: Largest accepted request body, in bytes
/// - `request_timeout_secs`: Requests running longer than this are aborted
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_request_size: 16 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Blockchain connection configuration
///
/// # Fields
/// - `name`: Display name of the network, used in logs
/// - `rpc_url`: JSON-RPC endpoint, `http(s)://` or `ws(s)://`
/// - `chain_id`: Chain ID used for EIP-155 signing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    pub chain_id: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "Ethereum Mainnet".to_string(),
            rpc_url: String::new(),
            chain_id: 1,
        }
    }
}

/// Token contract configuration
///
/// `owner_private_key` is only needed for minting. It is never logged.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub address: String,
    pub owner_private_key: Option<String>,
}

impl std::fmt::Debug for ContractConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractConfig")
            .field("address", &self.address)
            .field(
                "owner_private_key",
                &self.owner_private_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Gas settings used when building transactions
///
/// The node's gas price is multiplied by `price_multiplier` before signing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    pub mint_gas_limit: u64,
    pub transfer_gas_limit: u64,
    pub burn_gas_limit: u64,
    pub price_multiplier: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            mint_gas_limit: 200_000,
            transfer_gas_limit: 100_000,
            burn_gas_limit: 100_000,
            price_multiplier: 1.1,
        }
    }
}

/// Explorer and currency details for well-known chains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: String,
    pub explorer: String,
    pub currency: String,
}

impl NetworkInfo {
    pub fn for_chain(chain_id: u64) -> Self {
        let known = match chain_id {
            1 => Some(("Ethereum Mainnet", "https://etherscan.io", "ETH")),
            5 => Some(("Goerli Testnet", "https://goerli.etherscan.io", "GoerliETH")),
            11155111 => Some(("Sepolia Testnet", "https://sepolia.etherscan.io", "SepoliaETH")),
            137 => Some(("Polygon Mainnet", "https://polygonscan.com", "MATIC")),
            80001 => Some(("Polygon Mumbai", "https://mumbai.polygonscan.com", "MATIC")),
            _ => None,
        };

        match known {
            Some((name, explorer, currency)) => Self {
                chain_id,
                name: name.to_string(),
                explorer: explorer.to_string(),
                currency: currency.to_string(),
            },
            None => Self {
                chain_id,
                name: format!("Unknown Network (Chain ID: {})", chain_id),
                explorer: "Unknown".to_string(),
                currency: "Unknown".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    ///
    /// A missing file is not an error: defaults are used and the environment
    /// is expected to supply at least `NETWORK_URL` and `CONTRACT_ADDRESS`.
    ///
    /// # Example
    /// ```no_run
    /// let config = token_gateway::Config::load("config/default.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Config::default()
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.api.port = parse_var("PORT", &port)?;
        }
        if let Some(size) = lookup("MAX_REQUEST_SIZE") {
            self.api.max_request_size = parse_var("MAX_REQUEST_SIZE", &size)?;
        }
        if let Some(timeout) = lookup("REQUEST_TIMEOUT") {
            self.api.request_timeout_secs = parse_var("REQUEST_TIMEOUT", &timeout)?;
        }
        if let Some(name) = lookup("NETWORK_NAME") {
            self.network.name = name;
        }
        if let Some(url) = lookup("NETWORK_URL") {
            self.network.rpc_url = url;
        }
        if let Some(chain_id) = lookup("CHAIN_ID") {
            self.network.chain_id = parse_var("CHAIN_ID", &chain_id)?;
        }
        if let Some(address) = lookup("CONTRACT_ADDRESS") {
            self.contract.address = address;
        }
        if let Some(key) = lookup("PRIVATE_KEY") {
            // An empty PRIVATE_KEY disables minting rather than failing later.
            self.contract.owner_private_key = (!key.trim().is_empty()).then_some(key);
        }
        if let Some(limit) = lookup("DEFAULT_GAS_LIMIT") {
            self.gas.mint_gas_limit = parse_var("DEFAULT_GAS_LIMIT", &limit)?;
        }
        if let Some(multiplier) = lookup("GAS_PRICE_MULTIPLIER") {
            self.gas.price_multiplier = parse_var("GAS_PRICE_MULTIPLIER", &multiplier)?;
        }
        Ok(())
    }

    /// Check that everything needed to reach the contract is present
    pub fn validate(&self) -> Result<(), GatewayError> {
        let mut missing = Vec::new();
        let address = self.contract.address.trim();
        if address.is_empty() || address == ADDRESS_PLACEHOLDER {
            missing.push("CONTRACT_ADDRESS");
        }
        if self.network.rpc_url.trim().is_empty() {
            missing.push("NETWORK_URL");
        }
        if !missing.is_empty() {
            return Err(GatewayError::Config(format!(
                "Missing required configuration: {}",
                missing.join(", ")
            )));
        }

        if !(self.network.rpc_url.starts_with("http") || self.network.rpc_url.starts_with("ws")) {
            return Err(GatewayError::Config("Invalid network URL format".to_string()));
        }

        if !(self.gas.price_multiplier.is_finite() && self.gas.price_multiplier > 0.0) {
            return Err(GatewayError::Config(
                "GAS_PRICE_MULTIPLIER must be a positive number".to_string(),
            ));
        }

        Ok(())
    }

    /// Network details for the configured chain
    pub fn network_info(&self) -> NetworkInfo {
        NetworkInfo::for_chain(self.network.chain_id)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, GatewayError> {
    value
        .trim()
        .parse()
        .map_err(|_| GatewayError::Config(format!("Invalid value for {}: {}", key, value)))
}
