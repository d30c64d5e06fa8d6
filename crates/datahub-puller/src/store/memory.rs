//! In-process vocabulary store

use super::VocabularyStore;
use crate::error::Result;
use crate::models::{ConceptCodeRecord, ConfigurationEntry, PropertyPvRecord, SynonymRecord};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Collections {
    property_pvs: Vec<PropertyPvRecord>,
    synonyms: Vec<SynonymRecord>,
    concept_codes: Vec<ConceptCodeRecord>,
}

/// Keeps everything in memory; configuration is fixed at construction
#[derive(Debug, Default)]
pub struct MemoryStore {
    configuration: Vec<ConfigurationEntry>,
    collections: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new(configuration: Vec<ConfigurationEntry>) -> Self {
        Self {
            configuration,
            collections: Mutex::default(),
        }
    }

    pub async fn property_pvs(&self) -> Vec<PropertyPvRecord> {
        self.collections.lock().await.property_pvs.clone()
    }

    pub async fn synonyms(&self) -> Vec<SynonymRecord> {
        self.collections.lock().await.synonyms.clone()
    }

    pub async fn concept_codes(&self) -> Vec<ConceptCodeRecord> {
        self.collections.lock().await.concept_codes.clone()
    }
}

/// Replace records sharing a key, append the rest
pub(crate) fn upsert_by_key(stored: &mut Vec<PropertyPvRecord>, records: &[PropertyPvRecord]) {
    for record in records {
        match stored.iter_mut().find(|s| s.key() == record.key()) {
            Some(existing) => *existing = record.clone(),
            None => stored.push(record.clone()),
        }
    }
}

#[async_trait]
impl VocabularyStore for MemoryStore {
    async fn get_configuration_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigurationEntry>> {
        Ok(self
            .configuration
            .iter()
            .filter(|entry| keys.contains(&entry.config_type.as_str()))
            .cloned()
            .collect())
    }

    async fn upsert_property_pv(&self, records: &[PropertyPvRecord]) -> Result<()> {
        let mut collections = self.collections.lock().await;
        upsert_by_key(&mut collections.property_pvs, records);
        Ok(())
    }

    async fn insert_synonyms(&self, records: &[SynonymRecord]) -> Result<usize> {
        self.collections
            .lock()
            .await
            .synonyms
            .extend_from_slice(records);
        Ok(records.len())
    }

    async fn insert_concept_codes(&self, records: &[ConceptCodeRecord]) -> Result<usize> {
        self.collections
            .lock()
            .await
            .concept_codes
            .extend_from_slice(records);
        Ok(records.len())
    }
}
