//! API client module
//!
//! HTTP client for talking to a running Cleanline server.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::*;
