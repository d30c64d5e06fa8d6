//! STS API client module
//!
//! HTTP client for the terminology service that serves property PVs.

pub mod client;
pub mod endpoints;

pub use client::{StsClient, DEFAULT_STS_TIMEOUT_SECS};
