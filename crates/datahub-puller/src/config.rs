//! Puller configuration
//!
//! Same layout as the uploader: a YAML file with settings under `Config:`,
//! then `DATAHUB_*` environment overrides, then command-line flags.

use crate::error::{PullerError, Result};
use crate::models::{ConfigurationEntry, DATA_COMMONS_LIST, HIDDEN_MODELS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_STS_API_URL: &str = "DATAHUB_STS_API_URL";
pub const ENV_MONGO_URI: &str = "DATAHUB_MONGO_URI";

/// Where raw STS records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StsDataResource {
    /// Query the STS API, one request per model
    #[default]
    Api,
    /// Read a JSON array of raw records from `sts_dump_file`
    File,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PullerConfig {
    /// Base of the STS "all properties" endpoint; the model name is appended
    #[serde(default)]
    pub sts_api_all_url_v2: Option<String>,

    #[serde(default)]
    pub sts_data_resource: StsDataResource,

    #[serde(default)]
    pub sts_dump_file: Option<PathBuf>,

    #[serde(default)]
    pub mongo_uri: Option<String>,

    #[serde(default)]
    pub mongo_database: Option<String>,

    /// Write JSON dumps here instead of MongoDB
    #[serde(default)]
    pub dump_dir: Option<PathBuf>,

    /// Data commons to pull, for stores without a configuration collection
    #[serde(default)]
    pub data_commons_list: Option<Vec<String>>,

    /// Models never pulled, for stores without a configuration collection
    #[serde(default)]
    pub hidden_models: Vec<String>,

    #[serde(default)]
    pub properties_only: bool,
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(rename = "Config")]
    config: PullerConfig,
}

impl PullerConfig {
    /// Load a YAML config file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PullerError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        dotenvy::dotenv().ok();

        let content = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded puller config");

        Ok(file.config.with_env_overrides())
    }

    /// Overlay `DATAHUB_STS_API_URL` and `DATAHUB_MONGO_URI`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_STS_API_URL) {
            self.sts_api_all_url_v2 = Some(url);
        }
        if let Ok(uri) = std::env::var(ENV_MONGO_URI) {
            self.mongo_uri = Some(uri);
        }
        self
    }

    /// Configuration documents served by stores that keep no collection of
    /// their own
    pub fn configuration_entries(&self) -> Vec<ConfigurationEntry> {
        let mut entries = Vec::new();
        if let Some(commons) = &self.data_commons_list {
            entries.push(ConfigurationEntry::new(DATA_COMMONS_LIST, commons.clone()));
            entries.push(ConfigurationEntry::new(
                HIDDEN_MODELS,
                self.hidden_models.clone(),
            ));
        }
        entries
    }

    /// Check that the configuration is usable, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        match self.sts_data_resource {
            StsDataResource::Api => {
                if self
                    .sts_api_all_url_v2
                    .as_deref()
                    .is_none_or(|url| url.trim().is_empty())
                {
                    problems.push("sts_api_all_url_v2 is required for the api resource".to_string());
                }
            },
            StsDataResource::File => match &self.sts_dump_file {
                None => problems.push("sts_dump_file is required for the file resource".to_string()),
                Some(path) if !path.is_file() => {
                    problems.push(format!("sts_dump_file '{}' does not exist", path.display()))
                },
                Some(_) => {},
            },
        }

        match (&self.mongo_uri, &self.dump_dir) {
            (None, None) => problems.push("either mongo_uri or dump_dir is required".to_string()),
            (Some(_), _) if self.mongo_database.is_none() => {
                problems.push("mongo_database is required with mongo_uri".to_string())
            },
            _ => {},
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(PullerError::config(problems.join("; ")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("puller.yml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    #[serial]
    fn test_load_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "Config:\n  sts_api_all_url_v2: https://sts.example.org/v2/terms/model-pvs\n  dump_dir: out\n  data_commons_list: [CDS, ICDC]\n  hidden_models: [ICDC]\n",
        );

        let config = PullerConfig::load(&path).unwrap();

        assert_eq!(
            config.sts_api_all_url_v2.as_deref(),
            Some("https://sts.example.org/v2/terms/model-pvs")
        );
        assert_eq!(config.sts_data_resource, StsDataResource::Api);
        assert_eq!(config.dump_dir, Some(PathBuf::from("out")));
        assert!(!config.properties_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ENV_STS_API_URL, "http://override");
        std::env::set_var(ENV_MONGO_URI, "mongodb://localhost:27017");
        let config = PullerConfig::default().with_env_overrides();
        std::env::remove_var(ENV_STS_API_URL);
        std::env::remove_var(ENV_MONGO_URI);

        assert_eq!(config.sts_api_all_url_v2.as_deref(), Some("http://override"));
        assert_eq!(config.mongo_uri.as_deref(), Some("mongodb://localhost:27017"));
    }

    #[test]
    #[serial]
    fn test_missing_file() {
        let err = PullerConfig::load("/no/such/puller.yml").unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let config = PullerConfig {
            sts_data_resource: StsDataResource::File,
            mongo_uri: Some("mongodb://db".to_string()),
            ..Default::default()
        };

        let message = config.validate().unwrap_err().to_string();

        assert!(message.contains("sts_dump_file is required"));
        assert!(message.contains("mongo_database is required"));
    }

    #[test]
    fn test_validate_requires_storage() {
        let config = PullerConfig {
            sts_api_all_url_v2: Some("http://sts".to_string()),
            ..Default::default()
        };

        let message = config.validate().unwrap_err().to_string();

        assert!(message.contains("either mongo_uri or dump_dir"));
        assert!(!message.contains("sts_api_all_url_v2"));
    }

    #[test]
    fn test_configuration_entries() {
        assert!(PullerConfig::default().configuration_entries().is_empty());

        let config = PullerConfig {
            data_commons_list: Some(vec!["CDS".to_string()]),
            ..Default::default()
        };
        let entries = config.configuration_entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].config_type, DATA_COMMONS_LIST);
        assert_eq!(entries[1], ConfigurationEntry::new(HIDDEN_MODELS, vec![]));
    }
}
