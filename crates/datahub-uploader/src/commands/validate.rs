//! `datahub-uploader validate` command implementation

use crate::config::UploaderConfig;
use crate::error::{Result, UploaderError};
use crate::manifest::Manifest;
use crate::validator::{FileValidationReport, FileValidator};
use std::path::PathBuf;
use tracing::{error, info};

/// Load the config and manifest, then validate.
///
/// Returns the report; manifest problems have already been logged.
pub fn run(
    config_path: PathBuf,
    manifest: Option<PathBuf>,
    file_dir: Option<PathBuf>,
    names_only: bool,
) -> Result<FileValidationReport> {
    let mut config = UploaderConfig::load(&config_path)?;
    if manifest.is_some() {
        config.pre_manifest = manifest;
    }
    if file_dir.is_some() {
        config.file_dir = file_dir;
    }
    config.validate()?;

    let manifest_path = config
        .pre_manifest
        .clone()
        .ok_or_else(|| UploaderError::config("pre_manifest is required"))?;
    let manifest = Manifest::load(&manifest_path)?;

    if !manifest.has_column(&config.file_name_field) {
        error!(
            column = %config.file_name_field,
            "Manifest has no file name column"
        );
    }

    let validator = FileValidator::from_config(&config, manifest);
    let report = validator.validate(names_only);

    if report.is_valid() {
        info!(
            manifest = %manifest_path.display(),
            files = report.files.len(),
            "Manifest is valid"
        );
    } else {
        error!(manifest = %manifest_path.display(), "Manifest is invalid, check the errors above");
    }

    Ok(report)
}
