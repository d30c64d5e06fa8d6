//! Pulling property PVs, synonyms and concept codes from STS into storage

use crate::api::StsClient;
use crate::config::{PullerConfig, StsDataResource};
use crate::error::{PullerError, Result};
use crate::extract::{ExtractOptions, ExtractedVocabulary, VocabularyExtractor};
use crate::models::{ConfigurationEntry, RawTermRecord, DATA_COMMONS_LIST, HIDDEN_MODELS};
use crate::store::VocabularyStore;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// One persistence step of a pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PropertyPv,
    Synonyms,
    ConceptCodes,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PropertyPv => write!(f, "property PVs"),
            Stage::Synonyms => write!(f, "synonyms"),
            Stage::ConceptCodes => write!(f, "concept codes"),
        }
    }
}

/// What a pull saved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullSummary {
    pub properties: usize,
    pub synonyms: usize,
    pub concept_codes: usize,
    /// Records dropped for an unusable version
    pub skipped: usize,
    pub failed_stages: Vec<Stage>,
}

impl PullSummary {
    /// True when no stage failed to persist
    pub fn is_complete(&self) -> bool {
        self.failed_stages.is_empty()
    }
}

/// Models to pull: the data commons list minus hidden models
///
/// Both configuration documents must exist; otherwise nothing is pulled.
pub fn resolve_pv_models(entries: &[ConfigurationEntry]) -> Vec<String> {
    let find = |config_type: &str| entries.iter().find(|e| e.config_type == config_type);

    match (find(DATA_COMMONS_LIST), find(HIDDEN_MODELS)) {
        (Some(commons), Some(hidden)) => commons
            .key
            .iter()
            .filter(|model| !hidden.key.contains(model))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Fetch every model's properties from STS and deduplicate them
///
/// Fails when no model is configured. Returns `None` when STS returned
/// nothing usable.
pub async fn retrieve_all_properties(
    client: &StsClient,
    models: &[String],
    extractor: &VocabularyExtractor,
) -> Result<Option<ExtractedVocabulary>> {
    if models.is_empty() {
        return Err(PullerError::NoModelConfigured);
    }

    let urls = client.model_urls(models);
    info!("Retrieving cde from {:?}...", urls);

    let records: Vec<RawTermRecord> = client
        .fetch_all(&urls)
        .await
        .into_iter()
        .flatten()
        .flatten()
        .collect();
    if records.is_empty() {
        error!("No cde/pvs retrieve from STS API, {:?}.", urls);
        return Ok(None);
    }

    let vocabulary = extractor.extract(&records);
    info!("Retrieved CDE PVs from {:?}.", urls);
    Ok(vocabulary)
}

/// Read raw STS records from a JSON dump instead of the API
pub async fn load_dump_records(path: &Path) -> Result<Vec<RawTermRecord>> {
    let bytes = tokio::fs::read(path).await?;
    let records: Vec<RawTermRecord> = serde_json::from_slice(&bytes)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Pulls vocabularies for the models configured in storage
pub struct PvPuller {
    config: PullerConfig,
    store: Arc<dyn VocabularyStore>,
    extractor: VocabularyExtractor,
    pv_models: Vec<String>,
}

impl PvPuller {
    /// Resolve the models to pull from the store's configuration documents
    pub async fn new(config: PullerConfig, store: Arc<dyn VocabularyStore>) -> Result<Self> {
        let entries = store
            .get_configuration_by_keys(&[DATA_COMMONS_LIST, HIDDEN_MODELS])
            .await?;
        let pv_models = resolve_pv_models(&entries);
        info!("Models to pull: {:?}", pv_models);

        let extractor = VocabularyExtractor::new(ExtractOptions {
            properties_only: config.properties_only,
        })?;

        Ok(Self {
            config,
            store,
            extractor,
            pv_models,
        })
    }

    pub fn pv_models(&self) -> &[String] {
        &self.pv_models
    }

    async fn retrieve(&self) -> Result<Option<ExtractedVocabulary>> {
        match self.config.sts_data_resource {
            StsDataResource::Api => {
                let base_url = self.config.sts_api_all_url_v2.as_deref().ok_or_else(|| {
                    PullerError::config("sts_api_all_url_v2 is required for the api resource")
                })?;
                let client = StsClient::with_env_timeout(base_url)?;
                retrieve_all_properties(&client, &self.pv_models, &self.extractor).await
            },
            StsDataResource::File => {
                if self.pv_models.is_empty() {
                    return Err(PullerError::NoModelConfigured);
                }
                let path = self.config.sts_dump_file.as_deref().ok_or_else(|| {
                    PullerError::config("sts_dump_file is required for the file resource")
                })?;
                let records = load_dump_records(path).await?;
                Ok(self.extractor.extract(&records))
            },
        }
    }

    /// Retrieve, deduplicate and persist property PVs, synonyms and concept
    /// codes
    ///
    /// Each collection is saved on its own: a storage failure is logged and
    /// recorded in the summary, and the remaining collections are still
    /// saved. Nothing already written is rolled back.
    pub async fn pull_property_pv_synonym_concept_codes(&self) -> Result<PullSummary> {
        let Some(vocabulary) = self.retrieve().await? else {
            info!("No property found!");
            return Ok(PullSummary::default());
        };

        let mut summary = PullSummary {
            skipped: vocabulary.skipped,
            ..Default::default()
        };
        if vocabulary.skipped > 0 {
            warn!("{} properties skipped for an unusable version", vocabulary.skipped);
        }

        if vocabulary.properties.is_empty() {
            info!("No property found!");
            return Ok(summary);
        }
        info!("{} unique property are retrieved!", vocabulary.properties.len());
        match self.store.upsert_property_pv(&vocabulary.properties).await {
            Ok(()) => {
                summary.properties = vocabulary.properties.len();
                info!("Property PV are pulled and save successfully!");
            },
            Err(e) => {
                error!("Failed to pull and save Property PV! {}", e);
                summary.failed_stages.push(Stage::PropertyPv);
            },
        }

        if vocabulary.synonyms.is_empty() {
            info!("No synonym found!");
        } else {
            info!("{} unique synonyms are retrieved!", vocabulary.synonyms.len());
            match self.store.insert_synonyms(&vocabulary.synonyms).await {
                Ok(count) => {
                    summary.synonyms = count;
                    info!("Property Synonyms are pulled and save successfully!");
                },
                Err(e) => {
                    error!("Failed to pull and save Property Synonyms! {}", e);
                    summary.failed_stages.push(Stage::Synonyms);
                },
            }
        }

        if vocabulary.concept_codes.is_empty() {
            info!("No concept code found!");
        } else {
            info!("{} unique concept codes are retrieved!", vocabulary.concept_codes.len());
            match self.store.insert_concept_codes(&vocabulary.concept_codes).await {
                Ok(count) => {
                    summary.concept_codes = count;
                    info!("Property Concept Codes are pulled and save successfully!");
                },
                Err(e) => {
                    error!("Failed to pull and save Property Concept Codes! {}", e);
                    summary.failed_stages.push(Stage::ConceptCodes);
                },
            }
        }

        if summary.is_complete() {
            info!("All property PVs, Synonyms and Concept Codes are pulled and saved successfully!");
        } else {
            let failed: Vec<String> = summary.failed_stages.iter().map(Stage::to_string).collect();
            error!("Failed to save {}", failed.join(", "));
        }

        Ok(summary)
    }
}

/// Validate the configuration and run one pull, stopping on Ctrl-C
///
/// Configuration problems and fatal pull errors are logged as critical and
/// returned. An interrupted run returns [`PullerError::Cancelled`].
pub async fn pull_pv_lists(
    config: PullerConfig,
    store: Arc<dyn VocabularyStore>,
) -> Result<PullSummary> {
    if let Err(e) = config.validate() {
        error!(critical = true, "{}", e);
        return Err(e);
    }

    let run = async {
        let puller = PvPuller::new(config, store).await?;
        puller.pull_property_pv_synonym_concept_codes().await
    };

    let result = tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Task is stopped...");
            return Err(PullerError::Cancelled);
        }
    };

    if let Err(e) = &result {
        error!(critical = true, "{}", e);
        error!(
            critical = true,
            "Something wrong happened while pulling permissive values! Check debug log for details."
        );
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn entry(config_type: &str, keys: &[&str]) -> ConfigurationEntry {
        ConfigurationEntry::new(config_type, keys.iter().map(|k| k.to_string()).collect())
    }

    #[test]
    fn test_resolve_removes_hidden_models() {
        let entries = vec![
            entry(DATA_COMMONS_LIST, &["CDS", "ICDC", "CTDC"]),
            entry(HIDDEN_MODELS, &["ICDC"]),
        ];
        assert_eq!(resolve_pv_models(&entries), vec!["CDS", "CTDC"]);
    }

    #[test]
    fn test_resolve_order_of_documents_does_not_matter() {
        let entries = vec![entry(HIDDEN_MODELS, &[]), entry(DATA_COMMONS_LIST, &["CDS"])];
        assert_eq!(resolve_pv_models(&entries), vec!["CDS"]);
    }

    #[test]
    fn test_resolve_needs_both_documents() {
        assert!(resolve_pv_models(&[entry(DATA_COMMONS_LIST, &["CDS"])]).is_empty());
        assert!(resolve_pv_models(&[entry(HIDDEN_MODELS, &["CDS"])]).is_empty());
        assert!(resolve_pv_models(&[]).is_empty());
    }

    #[test]
    fn test_resolve_everything_hidden() {
        let entries = vec![
            entry(DATA_COMMONS_LIST, &["CDS"]),
            entry(HIDDEN_MODELS, &["CDS"]),
        ];
        assert!(resolve_pv_models(&entries).is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_without_models_fails() {
        let client = StsClient::new("http://localhost:9", std::time::Duration::from_secs(1)).unwrap();
        let extractor = VocabularyExtractor::new(ExtractOptions::default()).unwrap();

        let result = retrieve_all_properties(&client, &[], &extractor).await;

        assert!(matches!(result, Err(PullerError::NoModelConfigured)));
    }

    #[test]
    fn test_summary_completeness() {
        let mut summary = PullSummary::default();
        assert!(summary.is_complete());
        summary.failed_stages.push(Stage::Synonyms);
        assert!(!summary.is_complete());
        assert_eq!(Stage::ConceptCodes.to_string(), "concept codes");
    }
}
