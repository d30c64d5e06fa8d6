//! JSON file vocabulary store for offline pulls
//!
//! Each collection is one pretty-printed JSON array in the dump directory.
//! Configuration comes from the puller config instead of a collection.

use super::memory::upsert_by_key;
use super::VocabularyStore;
use crate::error::Result;
use crate::models::{ConceptCodeRecord, ConfigurationEntry, PropertyPvRecord, SynonymRecord};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

pub const PROPERTY_PV_FILE: &str = "property_pv.json";
pub const SYNONYMS_FILE: &str = "synonyms.json";
pub const CONCEPT_CODES_FILE: &str = "concept_codes.json";

#[derive(Debug, Clone)]
pub struct DumpStore {
    dir: PathBuf,
    configuration: Vec<ConfigurationEntry>,
}

impl DumpStore {
    pub fn new(dir: impl Into<PathBuf>, configuration: Vec<ConfigurationEntry>) -> Self {
        Self {
            dir: dir.into(),
            configuration,
        }
    }

    async fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.dir.join(name);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn write<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        let json = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&path, json).await?;
        debug!("Wrote {} records to {}", records.len(), path.display());
        Ok(())
    }

    async fn append<T: Serialize + DeserializeOwned + Clone>(
        &self,
        name: &str,
        records: &[T],
    ) -> Result<usize> {
        let mut stored: Vec<T> = self.read(name).await?;
        stored.extend_from_slice(records);
        self.write(name, &stored).await?;
        Ok(records.len())
    }
}

#[async_trait]
impl VocabularyStore for DumpStore {
    async fn get_configuration_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigurationEntry>> {
        Ok(self
            .configuration
            .iter()
            .filter(|entry| keys.contains(&entry.config_type.as_str()))
            .cloned()
            .collect())
    }

    async fn upsert_property_pv(&self, records: &[PropertyPvRecord]) -> Result<()> {
        let mut stored: Vec<PropertyPvRecord> = self.read(PROPERTY_PV_FILE).await?;
        upsert_by_key(&mut stored, records);
        self.write(PROPERTY_PV_FILE, &stored).await
    }

    async fn insert_synonyms(&self, records: &[SynonymRecord]) -> Result<usize> {
        self.append(SYNONYMS_FILE, records).await
    }

    async fn insert_concept_codes(&self, records: &[ConceptCodeRecord]) -> Result<usize> {
        self.append(CONCEPT_CODES_FILE, records).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pv(model: &str, values: Option<Vec<&str>>) -> PropertyPvRecord {
        PropertyPvRecord {
            property: "p".to_string(),
            model: Some(model.to_string()),
            version: None,
            permissible_values: values.map(|v| v.into_iter().map(str::to_string).collect()),
        }
    }

    #[tokio::test]
    async fn test_upsert_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let store = DumpStore::new(dir.path().join("out"), vec![]);

        store.upsert_property_pv(&[pv("A", Some(vec!["x"]))]).await.unwrap();
        store
            .upsert_property_pv(&[pv("A", None), pv("B", Some(vec!["y"]))])
            .await
            .unwrap();

        let bytes = std::fs::read(dir.path().join("out").join(PROPERTY_PV_FILE)).unwrap();
        let stored: Vec<PropertyPvRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(stored, vec![pv("A", None), pv("B", Some(vec!["y"]))]);
    }

    #[tokio::test]
    async fn test_inserts_append_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = DumpStore::new(dir.path(), vec![]);
        let code = ConceptCodeRecord {
            model: None,
            property: "p".to_string(),
            permissible_value: Some("v".to_string()),
            concept_code: "C1".to_string(),
        };

        store.insert_concept_codes(&[code.clone()]).await.unwrap();
        let written = store.insert_concept_codes(&[code]).await.unwrap();

        assert_eq!(written, 1);
        let bytes = std::fs::read(dir.path().join(CONCEPT_CODES_FILE)).unwrap();
        let stored: Vec<ConceptCodeRecord> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(stored.len(), 2);
        assert!(!dir.path().join(SYNONYMS_FILE).exists());
    }

    #[tokio::test]
    async fn test_corrupt_dump_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SYNONYMS_FILE), "{not json").unwrap();
        let store = DumpStore::new(dir.path(), vec![]);

        let result = store.insert_synonyms(&[]).await;

        assert!(matches!(result, Err(crate::error::PullerError::Json(_))));
    }
}
