//! Data Hub Vocabulary Puller Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pulls controlled vocabularies for the data commons models from the STS
//! terminology service and saves them to storage.
//!
//! - **STS client**: one "all properties" request per model ([`api`])
//! - **Extraction**: deduplicated property PVs, synonyms and concept codes ([`extract`])
//! - **Storage**: MongoDB, JSON dumps or memory behind one trait ([`store`])
//! - **Orchestration**: model resolution and the pull itself ([`puller`])
//!
//! # Example
//!
//! ```no_run
//! use datahub_puller::{pull_pv_lists, store::open_store, PullerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PullerConfig::load("configs/puller.yml")?;
//!     let store = open_store(&config).await?;
//!     let summary = pull_pv_lists(config, store).await?;
//!     println!("{} properties saved", summary.properties);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod puller;
pub mod store;

pub use config::{PullerConfig, StsDataResource};
pub use error::{PullerError, Result};
pub use extract::{ExtractOptions, ExtractedVocabulary, VocabularyExtractor};
pub use puller::{pull_pv_lists, resolve_pv_models, retrieve_all_properties, PullSummary, PvPuller};
pub use store::VocabularyStore;
