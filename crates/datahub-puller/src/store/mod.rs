//! Vocabulary storage
//!
//! The puller only talks to storage through [`VocabularyStore`]. Backends:
//! an in-process [`MemoryStore`], a JSON [`DumpStore`] for offline runs and,
//! with the `mongo` feature, a MongoDB store.

use crate::config::PullerConfig;
use crate::error::{PullerError, Result};
use crate::models::{ConceptCodeRecord, ConfigurationEntry, PropertyPvRecord, SynonymRecord};
use async_trait::async_trait;
use std::sync::Arc;

pub mod dump;
pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;

pub use dump::DumpStore;
pub use memory::MemoryStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;

/// Persistence for pulled vocabularies
#[async_trait]
pub trait VocabularyStore: Send + Sync {
    /// Configuration documents whose type is one of `keys`
    ///
    /// Types with no document are simply absent from the result.
    async fn get_configuration_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigurationEntry>>;

    /// Write property PV records, replacing any stored record with the same
    /// (property, model, version)
    async fn upsert_property_pv(&self, records: &[PropertyPvRecord]) -> Result<()>;

    /// Append synonym records, returning how many were written
    async fn insert_synonyms(&self, records: &[SynonymRecord]) -> Result<usize>;

    /// Append concept code records, returning how many were written
    async fn insert_concept_codes(&self, records: &[ConceptCodeRecord]) -> Result<usize>;
}

/// Open the store the configuration points at
///
/// `mongo_uri` wins over `dump_dir`. The dump store serves the data commons
/// and hidden model lists straight from the configuration.
pub async fn open_store(config: &PullerConfig) -> Result<Arc<dyn VocabularyStore>> {
    if let Some(uri) = &config.mongo_uri {
        return open_mongo(uri, config).await;
    }

    match &config.dump_dir {
        Some(dir) => Ok(Arc::new(DumpStore::new(dir, config.configuration_entries()))),
        None => Err(PullerError::config("either mongo_uri or dump_dir is required")),
    }
}

#[cfg(feature = "mongo")]
async fn open_mongo(uri: &str, config: &PullerConfig) -> Result<Arc<dyn VocabularyStore>> {
    let database = config
        .mongo_database
        .as_deref()
        .ok_or_else(|| PullerError::config("mongo_database is required with mongo_uri"))?;
    Ok(Arc::new(MongoStore::connect(uri, database).await?))
}

#[cfg(not(feature = "mongo"))]
async fn open_mongo(_uri: &str, _config: &PullerConfig) -> Result<Arc<dyn VocabularyStore>> {
    Err(PullerError::config(
        "mongo_uri is set but datahub-puller was built without the `mongo` feature",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::DATA_COMMONS_LIST;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_dump_store() {
        let dir = TempDir::new().unwrap();
        let config = PullerConfig {
            dump_dir: Some(dir.path().to_path_buf()),
            data_commons_list: Some(vec!["CDS".to_string()]),
            ..Default::default()
        };

        let store = open_store(&config).await.unwrap();
        let entries = store.get_configuration_by_keys(&[DATA_COMMONS_LIST]).await.unwrap();

        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_open_without_target() {
        let result = open_store(&PullerConfig::default()).await;
        assert!(matches!(result, Err(PullerError::Config(_))));
    }
}
