//! Data Hub Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared utilities and error handling for the Data Hub upload tools.
//!
//! # Overview
//!
//! - **Error Handling**: [`DataHubError`] and the [`Result`] alias
//! - **Checksums**: streaming MD5 of manifest files
//! - **Logging**: one `tracing` setup for every binary in the workspace
//!
//! # Example
//!
//! ```no_run
//! use datahub_common::checksum::compute_file_md5;
//! use datahub_common::Result;
//!
//! fn print_md5(path: &str) -> Result<()> {
//!     let md5 = compute_file_md5(path)?;
//!     println!("{path}: {md5}");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

pub use error::{DataHubError, Result};
