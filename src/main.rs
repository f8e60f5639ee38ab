use ethers::providers::{Http, Ws};
use std::env;
use token_gateway::{
    api::Server,
    config::Config,
    contract::ContractClient,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// The main entry point for the gateway.
///
/// Loads `.env`, initializes logging, loads and validates the configuration,
/// connects to the token contract over HTTP or WebSocket and serves the API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; real deployments set the environment directly.
    let _ = dotenv::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("token_gateway=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = env::var("GATEWAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    config.validate()?;
    info!("Gateway starting with config: {:?}", config);

    if config.network.rpc_url.starts_with("ws") {
        let client = ContractClient::<Ws>::connect_ws(&config).await?;
        Server::new(config, client).start().await?;
    } else {
        let client = ContractClient::<Http>::connect_http(&config).await?;
        Server::new(config, client).start().await?;
    }

    Ok(())
}
