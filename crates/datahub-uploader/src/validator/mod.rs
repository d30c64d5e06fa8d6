//! Pre-upload manifest validation
//!
//! [`FileValidator`] runs the checks over a loaded manifest and reports every
//! problem as an `error!` event. Callers only get a pass/fail answer back;
//! the log is the detailed report.

pub mod content;
pub mod file_name;

pub use content::{check_file_contents, ContentCheck, ContentProblem, ContentViolation, FileInfo};
pub use file_name::{check_file_names, FileNameProblem, FileNameViolation, RESERVED_CHARACTERS};

use crate::config::{UploadType, UploaderConfig};
use crate::manifest::{Manifest, ManifestFields};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Result of a full validation pass
#[derive(Debug, Default)]
pub struct FileValidationReport {
    pub names_valid: bool,
    /// `None` when content checks were skipped
    pub content_valid: Option<bool>,
    pub files: Vec<FileInfo>,
}

impl FileValidationReport {
    pub fn is_valid(&self) -> bool {
        self.names_valid && self.content_valid.unwrap_or(true)
    }
}

/// Validates the rows of one manifest
pub struct FileValidator {
    manifest: Manifest,
    fields: ManifestFields,
    file_dir: Option<PathBuf>,
    upload_type: UploadType,
}

impl FileValidator {
    pub fn new(manifest: Manifest, fields: ManifestFields, file_dir: Option<PathBuf>) -> Self {
        Self {
            manifest,
            fields,
            file_dir,
            upload_type: UploadType::File,
        }
    }

    pub fn from_config(config: &UploaderConfig, manifest: Manifest) -> Self {
        Self::new(manifest, config.manifest_fields(), config.file_dir.clone())
            .with_upload_type(config.upload_type)
    }

    /// Metadata uploads carry no data files, so only their names are checked
    pub fn with_upload_type(mut self, upload_type: UploadType) -> Self {
        self.upload_type = upload_type;
        self
    }

    /// Check every file name in the manifest.
    ///
    /// Logs one error per offending row and returns true when there were none.
    pub fn validate_file_name(&self) -> bool {
        info!("Start validating file names");
        let violations = check_file_names(&self.manifest.rows, &self.fields);
        for violation in &violations {
            error!(line = violation.line, "{}", violation);
        }
        info!(
            rows = self.manifest.len(),
            errors = violations.len(),
            "Completed validating file names"
        );
        violations.is_empty()
    }

    /// Check declared size and MD5 against the files under the file directory.
    pub fn validate_file_content(&self) -> (bool, Vec<FileInfo>) {
        let Some(file_dir) = &self.file_dir else {
            error!("No file directory configured, cannot validate file sizes and MD5s");
            return (false, Vec::new());
        };

        info!(dir = %file_dir.display(), "Start validating file contents");
        let ContentCheck { files, violations } =
            check_file_contents(&self.manifest.rows, &self.fields, file_dir);
        for violation in &violations {
            error!(line = violation.line, "{}", violation);
        }
        info!(
            verified = files.len(),
            errors = violations.len(),
            "Completed validating file contents"
        );
        (violations.is_empty(), files)
    }

    /// Validate names, then file contents when the names are clean and the
    /// upload carries data files.
    pub fn validate(&self, names_only: bool) -> FileValidationReport {
        let names_valid = self.validate_file_name();
        let mut report = FileValidationReport {
            names_valid,
            ..FileValidationReport::default()
        };

        if !names_valid {
            warn!("Skipping file content validation because of invalid file names");
            return report;
        }
        if names_only || self.upload_type == UploadType::Metadata {
            return report;
        }

        let (content_valid, files) = self.validate_file_content();
        report.content_valid = Some(content_valid);
        report.files = files;
        report
    }
}
