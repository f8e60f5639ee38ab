//! API Module
//!
//! This module handles the REST API clients use to read token state and
//! submit token transactions. Every response uses the `{success, data|error}`
//! envelope.

mod handlers;
mod server;

#[cfg(test)]
mod tests;

pub use server::{AppState, Server, router};
