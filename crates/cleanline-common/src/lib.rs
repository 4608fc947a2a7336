//! Cleanline Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the cleanline workspace.
//!
//! # Overview
//!
//! This crate provides common functionality used across all cleanline workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Checksums**: File and content integrity verification utilities
//! - **Logging**: Centralized `tracing` configuration
//! - **Types**: Shared domain types and data structures
//!
//! # Example
//!
//! ```no_run
//! use cleanline_common::{Result, CleanlineError};
//! use cleanline_common::checksum::compute_file_checksum;
//! use cleanline_common::types::ChecksumAlgorithm;
//!
//! fn process_file(path: &str) -> Result<()> {
//!     let checksum = compute_file_checksum(path, ChecksumAlgorithm::Sha256)?;
//!     println!("File checksum: {}", checksum);
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CleanlineError, Result};
