//! Pre-upload manifest handling
//!
//! A manifest is a tab-separated file with a header line followed by one row
//! per file to upload. Which columns hold the file name, size and MD5 is
//! configurable (see [`ManifestFields`]).

use crate::config::{DEFAULT_FILE_NAME_FIELD, DEFAULT_FILE_SIZE_FIELD, DEFAULT_MD5_FIELD};
use crate::error::{Result, UploaderError};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Manifest line of the first data row; the header is line 1.
pub const FIRST_DATA_LINE: usize = 2;

/// Column names the validators read from each row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFields {
    pub file_name: String,
    pub file_size: String,
    pub md5: String,
}

impl Default for ManifestFields {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_FILE_NAME_FIELD.to_string(),
            file_size: DEFAULT_FILE_SIZE_FIELD.to_string(),
            md5: DEFAULT_MD5_FIELD.to_string(),
        }
    }
}

/// One manifest row, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRow {
    fields: HashMap<String, String>,
}

impl ManifestRow {
    /// Build a row from column/value pairs, cleaning keys and values
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: clean_up_key_value(pairs.into_iter().map(|(k, v)| (k.into(), v.into()))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Strip whitespace around keys and values, dropping keys that end up empty.
///
/// Internal whitespace is kept, and so are empty values.
pub fn clean_up_key_value<I>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.trim();
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value.trim().to_string()))
            }
        })
        .collect()
}

/// A loaded manifest: header plus ordered rows
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub headers: Vec<String>,
    pub rows: Vec<ManifestRow>,
}

impl Manifest {
    /// Wrap rows that were parsed elsewhere
    pub fn from_rows(rows: Vec<ManifestRow>) -> Self {
        Self {
            headers: Vec::new(),
            rows,
        }
    }

    /// Load a tab-separated manifest.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD instead of
    /// failing the load, so the name validator can report the offending line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(UploaderError::FileNotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(UploaderError::invalid_manifest(format!(
                "'{}' has no header line",
                path.display()
            )));
        }

        let mut rows = Vec::new();
        for record in reader.byte_records() {
            let record = record?;
            let row = ManifestRow::from_pairs(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (h.clone(), String::from_utf8_lossy(v).into_owned())),
            );
            rows.push(row);
        }

        debug!(columns = headers.len(), "Parsed manifest header");
        info!(path = %path.display(), rows = rows.len(), "Loaded manifest");

        Ok(Self { headers, rows })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Manifest line number of the row at `index`
pub fn line_number(index: usize) -> usize {
    index + FIRST_DATA_LINE
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_clean_up_key_value_empty() {
        assert!(clean_up_key_value(Vec::new()).is_empty());
    }

    #[test]
    fn test_clean_up_key_value_strips_keys_and_values() {
        let result = clean_up_key_value(pairs(&[(" key1 ", " value1 "), ("\tkey2\n", "\nvalue2\t")]));
        assert_eq!(result.get("key1").unwrap(), "value1");
        assert_eq!(result.get("key2").unwrap(), "value2");
        assert!(!result.contains_key(" key1 "));
    }

    #[test]
    fn test_clean_up_key_value_drops_blank_keys() {
        let result = clean_up_key_value(pairs(&[("", "a"), ("   ", "b"), (" ", "c"), ("key", "d")]));
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("key").unwrap(), "d");
    }

    #[test]
    fn test_clean_up_key_value_keeps_internal_and_empty() {
        let result = clean_up_key_value(pairs(&[(" my key ", " my value "), ("k1", ""), ("k2", "  ")]));
        assert_eq!(result.get("my key").unwrap(), "my value");
        assert_eq!(result.get("k1").unwrap(), "");
        assert_eq!(result.get("k2").unwrap(), "");
    }

    #[test]
    fn test_clean_up_key_value_unicode() {
        let result = clean_up_key_value(pairs(&[(" café ", " naïve "), (" 日本 ", " 中国 ")]));
        assert_eq!(result.get("café").unwrap(), "naïve");
        assert_eq!(result.get("日本").unwrap(), "中国");
    }

    #[test]
    fn test_load_manifest() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "file_name\tfile_size\tmd5sum").unwrap();
        writeln!(file, " a.txt \t11\t5eb63bbbe01eeed093cb22bb8f5acdc3").unwrap();
        writeln!(file, "nested/b.txt\t0").unwrap();
        file.flush().unwrap();

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(manifest.headers, vec!["file_name", "file_size", "md5sum"]);
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.rows[0].get("file_name"), Some("a.txt"));
        assert_eq!(manifest.rows[0].get("file_size"), Some("11"));
        assert_eq!(manifest.rows[1].get("md5sum"), None);
        assert!(manifest.has_column("md5sum"));
    }

    #[test]
    fn test_load_manifest_with_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"file_name\tmd5sum\n\xffa.txt\tabc\n").unwrap();
        file.flush().unwrap();

        let manifest = Manifest::load(file.path()).unwrap();
        let name = manifest.rows[0].get("file_name").unwrap();
        assert!(name.contains(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn test_load_missing_manifest() {
        let result = Manifest::load("/no/such/manifest.tsv");
        assert!(matches!(result.unwrap_err(), UploaderError::FileNotFound(_)));
    }

    #[test]
    fn test_line_number() {
        assert_eq!(line_number(0), 2);
        assert_eq!(line_number(5), 7);
    }
}
