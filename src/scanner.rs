//! Library directory scanning.
//!
//! The scanner reflects the directory's contents at call time; nothing is
//! cached. Entries are filtered by case-insensitive file name suffix;
//! anything else in the directory is ignored.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

use crate::error::{Result, ShelfError};

/// One candidate document observed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Document id: the bare file name.
    pub id: String,
    /// Modification time in Unix milliseconds.
    pub mtime_ms: i64,
}

/// Enumerate documents in the library directory. Single level:
/// subdirectories are not part of the library.
pub fn scan_library(root: &Path, extensions: &[String]) -> Result<Vec<ScanEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ShelfError::Scan {
            path: root.to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !has_document_suffix(name, extensions) {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| ShelfError::Scan {
            path: entry.path().to_path_buf(),
            source: e.into(),
        })?;

        entries.push(ScanEntry {
            id: name.to_string(),
            mtime_ms: mtime_millis(&metadata),
        });
    }

    // Sort for deterministic ordering
    entries.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(entries)
}

/// Resolve a document id to its on-disk path, refusing anything that could
/// escape the library root. Ids are bare file names: no separators, no
/// dot-dot, and a configured suffix.
pub fn resolve_document_path(root: &Path, id: &str, extensions: &[String]) -> Result<PathBuf> {
    if id.is_empty() || id.contains('/') || id.contains('\\') || id == "." || id == ".." {
        return Err(ShelfError::NotFound(id.to_string()));
    }
    if !has_document_suffix(id, extensions) {
        return Err(ShelfError::NotFound(id.to_string()));
    }

    let base = root.canonicalize().map_err(|e| ShelfError::Scan {
        path: root.to_path_buf(),
        source: e,
    })?;
    let path = base
        .join(id)
        .canonicalize()
        .map_err(|_| ShelfError::NotFound(id.to_string()))?;
    if !path.starts_with(&base) {
        return Err(ShelfError::NotFound(id.to_string()));
    }

    Ok(path)
}

fn has_document_suffix(name: &str, extensions: &[String]) -> bool {
    let lower = name.to_lowercase();
    extensions.iter().any(|ext| lower.ends_with(&ext.to_lowercase()))
}

fn mtime_millis(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pdf_exts() -> Vec<String> {
        vec![".pdf".to_string()]
    }

    #[test]
    fn scan_filters_by_suffix_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("a.pdf"), b"x").unwrap();
        std::fs::write(tmp.path().join("B.PDF"), b"x").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(tmp.path().join("sub.pdf")).unwrap();

        let entries = scan_library(tmp.path(), &pdf_exts()).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["B.PDF", "a.pdf"]);
    }

    #[test]
    fn scan_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("nope");
        let err = scan_library(&gone, &pdf_exts()).unwrap_err();
        assert!(matches!(err, ShelfError::Scan { .. }));
    }

    #[test]
    fn resolve_accepts_plain_name() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("doc.pdf"), b"x").unwrap();
        let path = resolve_document_path(tmp.path(), "doc.pdf", &pdf_exts()).unwrap();
        assert!(path.ends_with("doc.pdf"));
    }

    #[test]
    fn resolve_rejects_traversal_and_wrong_suffix() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("doc.pdf"), b"x").unwrap();

        for bad in ["../doc.pdf", "sub/doc.pdf", "doc.txt", "..", ""] {
            let err = resolve_document_path(tmp.path(), bad, &pdf_exts()).unwrap_err();
            assert!(matches!(err, ShelfError::NotFound(_)), "id: {:?}", bad);
        }
    }

    #[test]
    fn resolve_unknown_name_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_document_path(tmp.path(), "ghost.pdf", &pdf_exts()).unwrap_err();
        assert!(matches!(err, ShelfError::NotFound(_)));
    }
}
