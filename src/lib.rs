//! REST gateway for a single ERC-20 style token contract.
//! Clients read token metadata and balances and submit mint, transfer and
//! burn transactions over HTTP; the gateway handles ABI encoding, signing and
//! JSON-RPC transport.

pub mod types; // Request and response data structures.
pub mod api; // HTTP router, handlers and server.
pub mod validation; // Input validation for addresses, amounts and hashes.
pub mod units; // Token-unit and base-unit conversions.
pub mod contract; // Contract bindings and the backend that talks to the chain.
pub mod error; // Error type and its HTTP mapping.
pub mod config; // Defines and loads gateway configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use error::{GatewayError, GatewayResult};
