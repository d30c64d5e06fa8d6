//! MD5 utilities for manifest file verification
//!
//! Upload manifests declare an `md5sum` per file, so everything here is MD5,
//! rendered as lowercase hex.

use crate::error::{DataHubError, Result};
use std::io::Read;
use std::path::Path;

/// Read buffer used when hashing files.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Compute the MD5 of any readable source
pub fn compute_md5<R: Read>(reader: &mut R) -> Result<String> {
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Compute the MD5 of a file
pub fn compute_file_md5(path: impl AsRef<Path>) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_md5(&mut file)
}

/// Check a file against an expected MD5.
///
/// The comparison ignores case and surrounding whitespace of `expected`.
pub fn verify_file_md5(path: impl AsRef<Path>, expected: &str) -> Result<()> {
    let actual = compute_file_md5(path)?;
    if md5_matches(&actual, expected) {
        Ok(())
    } else {
        Err(DataHubError::ChecksumMismatch {
            expected: expected.trim().to_string(),
            actual,
        })
    }
}

/// Case-insensitive comparison of two hex digests
pub fn md5_matches(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_compute_md5() {
        let mut cursor = Cursor::new(b"hello world");
        let md5 = compute_md5(&mut cursor).unwrap();
        assert_eq!(md5, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[test]
    fn test_compute_md5_empty() {
        let mut cursor = Cursor::new(b"");
        let md5 = compute_md5(&mut cursor).unwrap();
        assert_eq!(md5, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_compute_md5_spans_chunks() {
        let data = vec![7u8; CHUNK_SIZE * 2 + 17];
        let streamed = compute_md5(&mut Cursor::new(&data)).unwrap();
        assert_eq!(streamed, format!("{:x}", md5::compute(&data)));
    }

    #[test]
    fn test_verify_file_md5() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"hello world").unwrap();
        temp_file.flush().unwrap();

        assert!(verify_file_md5(temp_file.path(), "5EB63BBBE01EEED093CB22BB8F5ACDC3").is_ok());

        let result = verify_file_md5(temp_file.path(), "00000000000000000000000000000000");
        assert!(matches!(result.unwrap_err(), DataHubError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = compute_file_md5("/definitely/not/here.bin");
        assert!(matches!(result.unwrap_err(), DataHubError::Io(_)));
    }
}
