//! File name rules for manifest rows
//!
//! Each row is checked in a fixed order and reports at most one problem:
//! empty name, invalid encoding, absolute path, reserved characters, and
//! finally uniqueness against earlier rows. A bad row never stops the rows
//! after it from being checked.

use crate::manifest::{line_number, ManifestFields, ManifestRow};
use datahub_common::checksum::md5_matches;
use std::collections::HashMap;
use std::fmt;

/// Characters that may not appear anywhere in a file name.
///
/// Backslash is allowed, and so is `/` for relative sub-paths.
pub const RESERVED_CHARACTERS: &[char] = &['*', '|', '<', '>', '?', '"'];

/// What is wrong with a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNameProblem {
    Empty,
    InvalidEncoding,
    AbsolutePath,
    ReservedCharacters,
    /// Same name listed earlier with a different MD5
    NotUnique { first_line: usize },
}

/// A rejected manifest row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameViolation {
    /// Manifest line, counting the header as line 1
    pub line: usize,
    pub name: String,
    pub problem: FileNameProblem,
}

impl fmt::Display for FileNameViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let line = self.line;
        let name = &self.name;
        match &self.problem {
            FileNameProblem::Empty => write!(f, "Line {line}: File name is empty."),
            FileNameProblem::InvalidEncoding => write!(
                f,
                "Line {line}: File name \"{name}\" is invalid, it is not a valid UTF-8 string."
            ),
            FileNameProblem::AbsolutePath => write!(
                f,
                "Line {line}: File name \"{name}\" is invalid, no absolute path allowed."
            ),
            FileNameProblem::ReservedCharacters => write!(
                f,
                "Line {line}: File name \"{name}\" contains invalid characters."
            ),
            FileNameProblem::NotUnique { first_line } => write!(
                f,
                "Line {line}: File name \"{name}\" is not unique, it is also listed on line {first_line} with a different MD5."
            ),
        }
    }
}

/// Check the rules that only look at the name itself.
///
/// `name` is expected to be stripped already.
pub fn name_problem(name: &str) -> Option<FileNameProblem> {
    if name.is_empty() {
        Some(FileNameProblem::Empty)
    } else if name.contains(char::REPLACEMENT_CHARACTER) {
        Some(FileNameProblem::InvalidEncoding)
    } else if is_absolute(name) {
        Some(FileNameProblem::AbsolutePath)
    } else if name.contains(RESERVED_CHARACTERS) {
        Some(FileNameProblem::ReservedCharacters)
    } else {
        None
    }
}

/// Rooted paths: `/x`, `\x`, `C:\x` and `C:/x`
fn is_absolute(name: &str) -> bool {
    if name.starts_with('/') || name.starts_with('\\') {
        return true;
    }
    matches!(
        name.as_bytes(),
        [drive, b':', b'/' | b'\\', ..] if drive.is_ascii_alphabetic()
    )
}

/// The stripped file name of a row; a missing column reads as empty
pub fn row_file_name<'a>(row: &'a ManifestRow, fields: &ManifestFields) -> &'a str {
    row.get(&fields.file_name).map(str::trim).unwrap_or_default()
}

/// Check every row and return all violations in manifest order.
pub fn check_file_names(rows: &[ManifestRow], fields: &ManifestFields) -> Vec<FileNameViolation> {
    let mut violations = Vec::new();
    // name -> (first line, md5)
    let mut seen: HashMap<&str, (usize, Option<&str>)> = HashMap::new();

    for (index, row) in rows.iter().enumerate() {
        let line = line_number(index);
        let name = row_file_name(row, fields);

        if let Some(problem) = name_problem(name) {
            violations.push(FileNameViolation {
                line,
                name: name.to_string(),
                problem,
            });
            continue;
        }

        let md5 = row.get(&fields.md5).map(str::trim);
        match seen.get(name) {
            Some(&(first_line, first_md5)) if !same_md5(first_md5, md5) => {
                violations.push(FileNameViolation {
                    line,
                    name: name.to_string(),
                    problem: FileNameProblem::NotUnique { first_line },
                });
            },
            Some(_) => {},
            None => {
                seen.insert(name, (line, md5));
            },
        }
    }

    violations
}

fn same_md5(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => md5_matches(a, b),
        (None, None) => true,
        _ => false,
    }
}
