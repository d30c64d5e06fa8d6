//! MongoDB vocabulary store

use super::VocabularyStore;
use crate::error::Result;
use crate::models::{ConceptCodeRecord, ConfigurationEntry, PropertyPvRecord, SynonymRecord};
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Collection, Database};
use tracing::info;

pub const CONFIGURATION_COLLECTION: &str = "configuration";
pub const PROPERTY_PV_COLLECTION: &str = "property_pv";
pub const SYNONYM_COLLECTION: &str = "synonym";
pub const CONCEPT_CODE_COLLECTION: &str = "concept_code";

#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        info!("Connected to MongoDB database {}", database);
        Ok(Self {
            db: client.database(database),
        })
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

#[async_trait]
impl VocabularyStore for MongoStore {
    async fn get_configuration_by_keys(&self, keys: &[&str]) -> Result<Vec<ConfigurationEntry>> {
        let collection = self.collection::<ConfigurationEntry>(CONFIGURATION_COLLECTION);
        let mut cursor = collection.find(doc! { "type": { "$in": keys } }).await?;

        let mut entries = Vec::new();
        while cursor.advance().await? {
            entries.push(cursor.deserialize_current()?);
        }
        Ok(entries)
    }

    async fn upsert_property_pv(&self, records: &[PropertyPvRecord]) -> Result<()> {
        let collection = self.collection::<PropertyPvRecord>(PROPERTY_PV_COLLECTION);
        for record in records {
            let filter = doc! {
                "property": record.property.as_str(),
                "model": record.model.clone(),
                "version": record.version.clone(),
            };
            collection.replace_one(filter, record).upsert(true).await?;
        }
        Ok(())
    }

    async fn insert_synonyms(&self, records: &[SynonymRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection::<SynonymRecord>(SYNONYM_COLLECTION)
            .insert_many(records)
            .await?;
        Ok(result.inserted_ids.len())
    }

    async fn insert_concept_codes(&self, records: &[ConceptCodeRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection::<ConceptCodeRecord>(CONCEPT_CODE_COLLECTION)
            .insert_many(records)
            .await?;
        Ok(result.inserted_ids.len())
    }
}
