//! Uploader configuration
//!
//! Loaded from a YAML file whose settings live under a top-level `Config:`
//! key, then overlaid with `DATAHUB_*` environment variables and finally with
//! command-line flags.

use crate::error::{Result, UploaderError};
use crate::manifest::ManifestFields;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// Configuration Constants
// ============================================================================

pub const DEFAULT_FILE_NAME_FIELD: &str = "file_name";
pub const DEFAULT_FILE_SIZE_FIELD: &str = "file_size";
pub const DEFAULT_MD5_FIELD: &str = "md5sum";

pub const ENV_PRE_MANIFEST: &str = "DATAHUB_PRE_MANIFEST";
pub const ENV_FILE_DIR: &str = "DATAHUB_FILE_DIR";

/// What is being uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadType {
    /// Data files listed in a manifest
    #[default]
    File,
    /// Metadata TSV files
    Metadata,
}

/// Uploader settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploaderConfig {
    #[serde(default)]
    pub upload_type: UploadType,

    /// Path of the pre-upload manifest (TSV)
    #[serde(default)]
    pub pre_manifest: Option<PathBuf>,

    /// Directory the manifest file names are relative to
    #[serde(default)]
    pub file_dir: Option<PathBuf>,

    #[serde(default = "default_file_name_field")]
    pub file_name_field: String,

    #[serde(default = "default_file_size_field")]
    pub file_size_field: String,

    #[serde(default = "default_md5_field")]
    pub md5_field: String,
}

fn default_file_name_field() -> String {
    DEFAULT_FILE_NAME_FIELD.to_string()
}

fn default_file_size_field() -> String {
    DEFAULT_FILE_SIZE_FIELD.to_string()
}

fn default_md5_field() -> String {
    DEFAULT_MD5_FIELD.to_string()
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(rename = "Config")]
    config: UploaderConfig,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            upload_type: UploadType::File,
            pre_manifest: None,
            file_dir: None,
            file_name_field: default_file_name_field(),
            file_size_field: default_file_size_field(),
            md5_field: default_md5_field(),
        }
    }
}

impl UploaderConfig {
    /// Load a YAML config file and apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(UploaderError::FileNotFound(path.display().to_string()));
        }

        dotenvy::dotenv().ok();

        let content = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), "Loaded uploader config");

        Ok(file.config.with_env_overrides())
    }

    /// Overlay `DATAHUB_PRE_MANIFEST` and `DATAHUB_FILE_DIR`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(manifest) = std::env::var(ENV_PRE_MANIFEST) {
            self.pre_manifest = Some(PathBuf::from(manifest));
        }
        if let Ok(dir) = std::env::var(ENV_FILE_DIR) {
            self.file_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Column names used to read manifest rows
    pub fn manifest_fields(&self) -> ManifestFields {
        ManifestFields {
            file_name: self.file_name_field.clone(),
            file_size: self.file_size_field.clone(),
            md5: self.md5_field.clone(),
        }
    }

    /// Check that the configuration is usable.
    ///
    /// Every problem is collected so a user can fix them in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        match &self.pre_manifest {
            None => problems.push("pre_manifest is required".to_string()),
            Some(path) if !path.is_file() => {
                problems.push(format!("pre_manifest '{}' does not exist", path.display()))
            },
            Some(_) => {},
        }

        if self.upload_type == UploadType::File {
            match &self.file_dir {
                None => problems.push("file_dir is required for file uploads".to_string()),
                Some(dir) if !dir.is_dir() => {
                    problems.push(format!("file_dir '{}' is not a directory", dir.display()))
                },
                Some(_) => {},
            }
        }

        let fields = [
            ("file_name_field", &self.file_name_field),
            ("file_size_field", &self.file_size_field),
            ("md5_field", &self.md5_field),
        ];
        for (key, value) in &fields {
            if value.trim().is_empty() {
                problems.push(format!("{key} cannot be empty"));
            }
        }
        for (i, (key, value)) in fields.iter().enumerate() {
            if let Some((other, _)) = fields[i + 1..].iter().find(|(_, v)| v == value) {
                problems.push(format!("{key} and {other} both use column '{value}'"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(UploaderError::config(problems.join("; ")))
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
        let path = dir.path().join("config.yml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_validate_empty_config_fails() {
        let result = UploaderConfig::default().validate();
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("pre_manifest is required"));
        assert!(msg.contains("file_dir is required"));
    }

    #[test]
    #[serial]
    fn test_validate_complete_config_passes() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("manifest.tsv");
        std::fs::write(&manifest, "file_name\tfile_size\tmd5sum\n").unwrap();

        let path = write_config(
            &dir,
            &format!(
                "Config:\n  upload_type: file\n  pre_manifest: {}\n  file_dir: {}\n",
                manifest.display(),
                dir.path().display()
            ),
        );

        let config = UploaderConfig::load(&path).unwrap();
        assert_eq!(config.file_name_field, DEFAULT_FILE_NAME_FIELD);
        assert_eq!(config.md5_field, DEFAULT_MD5_FIELD);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_upload_time_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "Config:\n  upload_type: metadata\n  file_id_field: file_id\n  overwrite: true\n  dryrun: false\n",
        );

        let config = UploaderConfig::load(&path).unwrap();
        assert_eq!(config.upload_type, UploadType::Metadata);
    }

    #[test]
    fn test_metadata_upload_does_not_need_file_dir() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("metadata.tsv");
        std::fs::write(&manifest, "type\n").unwrap();

        let config = UploaderConfig {
            upload_type: UploadType::Metadata,
            pre_manifest: Some(manifest),
            ..UploaderConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_shared_columns() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("manifest.tsv");
        std::fs::write(&manifest, "name\n").unwrap();

        let config = UploaderConfig {
            pre_manifest: Some(manifest),
            file_dir: Some(dir.path().to_path_buf()),
            md5_field: "file_name".to_string(),
            ..UploaderConfig::default()
        };
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("file_name_field and md5_field both use column 'file_name'"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = UploaderConfig::load("/no/such/config.yml");
        assert!(matches!(result.unwrap_err(), UploaderError::FileNotFound(_)));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ENV_PRE_MANIFEST, "/tmp/from-env.tsv");
        std::env::set_var(ENV_FILE_DIR, "/tmp/files-from-env");

        let config = UploaderConfig::default().with_env_overrides();
        assert_eq!(config.pre_manifest, Some(PathBuf::from("/tmp/from-env.tsv")));
        assert_eq!(config.file_dir, Some(PathBuf::from("/tmp/files-from-env")));

        std::env::remove_var(ENV_PRE_MANIFEST);
        std::env::remove_var(ENV_FILE_DIR);
    }
}
