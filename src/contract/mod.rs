//! Contract Module
//!
//! This module owns everything that talks to the token contract:
//! - `abi`: typed bindings generated from the contract's ABI
//! - `backend`: the `TokenBackend` trait the HTTP handlers depend on
//! - `client`: the ethers-based implementation over HTTP or WebSocket

mod abi;
mod backend;
mod client;

pub use abi::TokenContract;
pub use backend::TokenBackend;
pub use client::ContractClient;
