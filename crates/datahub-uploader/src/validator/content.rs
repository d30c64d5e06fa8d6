//! File size and MD5 checks against the files on disk

use super::file_name::{name_problem, row_file_name};
use crate::manifest::{line_number, ManifestFields, ManifestRow};
use datahub_common::checksum::verify_file_md5;
use datahub_common::DataHubError;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A manifest file that exists and matches its declared size and MD5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub line: usize,
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub md5: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentProblem {
    /// The name climbs out of the file directory with `..`
    OutsideFileDir,
    NotFound,
    NotAFile,
    MissingSize,
    InvalidSize(String),
    SizeMismatch { declared: u64, actual: u64 },
    MissingMd5,
    Md5Mismatch { declared: String, actual: String },
    Unreadable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentViolation {
    pub line: usize,
    pub name: String,
    pub problem: ContentProblem,
}

impl fmt::Display for ContentViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line;
        let name = &self.name;
        write!(f, "Line {line}: File \"{name}\" ")?;
        match &self.problem {
            ContentProblem::OutsideFileDir => write!(f, "is outside the file directory."),
            ContentProblem::NotFound => write!(f, "does not exist."),
            ContentProblem::NotAFile => write!(f, "is not a regular file."),
            ContentProblem::MissingSize => write!(f, "has no file size."),
            ContentProblem::InvalidSize(raw) => write!(f, "has an invalid file size \"{raw}\"."),
            ContentProblem::SizeMismatch { declared, actual } => write!(
                f,
                "file size {actual} does not match the manifest size {declared}."
            ),
            ContentProblem::MissingMd5 => write!(f, "has no MD5."),
            ContentProblem::Md5Mismatch { declared, actual } => write!(
                f,
                "MD5 {actual} does not match the manifest MD5 {declared}."
            ),
            ContentProblem::Unreadable(reason) => write!(f, "could not be read: {reason}."),
        }
    }
}

/// Outcome of checking file contents
#[derive(Debug, Default)]
pub struct ContentCheck {
    pub files: Vec<FileInfo>,
    pub violations: Vec<ContentViolation>,
}

/// Check each row's file under `file_dir`.
///
/// Rows whose name breaks a name rule are left to the name validator. A name
/// listed more than once is only checked the first time.
pub fn check_file_contents(
    rows: &[ManifestRow],
    fields: &ManifestFields,
    file_dir: &Path,
) -> ContentCheck {
    let mut result = ContentCheck::default();
    let mut checked: HashSet<&str> = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let name = row_file_name(row, fields);
        if name_problem(name).is_some() || !checked.insert(name) {
            continue;
        }

        let line = line_number(index);
        match check_row(line, row, fields, file_dir, name) {
            Ok(info) => {
                debug!(line, file = %info.name, size = info.size, "File verified");
                result.files.push(info);
            },
            Err(problem) => result.violations.push(ContentViolation {
                line,
                name: name.to_string(),
                problem,
            }),
        }
    }

    result
}

fn check_row(
    line: usize,
    row: &ManifestRow,
    fields: &ManifestFields,
    file_dir: &Path,
    name: &str,
) -> Result<FileInfo, ContentProblem> {
    let declared_size = match row.get(&fields.file_size).map(str::trim) {
        None | Some("") => return Err(ContentProblem::MissingSize),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ContentProblem::InvalidSize(raw.to_string()))?,
    };
    let declared_md5 = match row.get(&fields.md5).map(str::trim) {
        None | Some("") => return Err(ContentProblem::MissingMd5),
        Some(md5) => md5,
    };

    if Path::new(name)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(ContentProblem::OutsideFileDir);
    }

    let path = file_dir.join(name);
    let metadata = match std::fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ContentProblem::NotFound),
        Err(e) => return Err(ContentProblem::Unreadable(e.to_string())),
    };
    if !metadata.is_file() {
        return Err(ContentProblem::NotAFile);
    }
    if metadata.len() != declared_size {
        return Err(ContentProblem::SizeMismatch {
            declared: declared_size,
            actual: metadata.len(),
        });
    }

    verify_file_md5(&path, declared_md5).map_err(|e| match e {
        DataHubError::ChecksumMismatch { expected, actual } => ContentProblem::Md5Mismatch {
            declared: expected,
            actual,
        },
        other => ContentProblem::Unreadable(other.to_string()),
    })?;

    Ok(FileInfo {
        line,
        name: name.to_string(),
        path,
        size: declared_size,
        md5: declared_md5.to_ascii_lowercase(),
    })
}
