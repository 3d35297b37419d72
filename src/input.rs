//! Source files: the unit the batch operates on.
//!
//! A [`SourceFile`] is a display name plus the raw PDF bytes, read once at
//! load time and immutable afterwards. [`SourceFile::from_path`] validates
//! the `%PDF` magic bytes up front so callers get a meaningful error
//! rather than a mid-run extraction failure on a mislabelled file.

use crate::error::BatchError;
use std::path::Path;
use tracing::debug;

/// One uploaded/loaded PDF: display name + raw content.
///
/// Identity within a batch is the name — the batch list rejects
/// duplicates, and the name labels the file's section in the merge.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source file from in-memory bytes (e.g. an upload).
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Load a PDF from disk, validating existence, readability, and the
    /// `%PDF` magic bytes.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BatchError> {
        let path = path.as_ref();

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(BatchError::PermissionDenied {
                    path: path.to_path_buf(),
                })
            }
            Err(_) => {
                return Err(BatchError::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
        };

        if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            let n = bytes.len().min(4);
            magic[..n].copy_from_slice(&bytes[..n]);
            return Err(BatchError::NotAPdf {
                path: path.to_path_buf(),
                magic,
            });
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.pdf")
            .to_string();

        debug!("Loaded '{}' ({} bytes)", name, bytes.len());
        Ok(Self { name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_path_accepts_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4 rest of file")
            .unwrap();

        let file = SourceFile::from_path(&path).unwrap();
        assert_eq!(file.name, "ok.pdf");
        assert!(file.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn from_path_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello world").unwrap();

        let err = SourceFile::from_path(&path);
        assert!(matches!(err, Err(BatchError::NotAPdf { .. })));
    }

    #[test]
    fn from_path_rejects_missing_file() {
        let err = SourceFile::from_path("/definitely/not/here.pdf");
        assert!(matches!(err, Err(BatchError::FileNotFound { .. })));
    }

    #[test]
    fn from_path_rejects_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pdf");
        std::fs::write(&path, b"%P").unwrap();

        let err = SourceFile::from_path(&path);
        assert!(matches!(err, Err(BatchError::NotAPdf { .. })));
    }
}
