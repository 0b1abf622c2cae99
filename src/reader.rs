//! Document readers: per-page text extraction.
//!
//! The sync engine only sees the [`DocumentReader`] trait, so extraction
//! failures stay contained to one document per pass and tests can substitute
//! canned page text. The shipped implementation reads PDFs.

use std::path::Path;
use thiserror::Error;

/// Extraction error. The pipeline skips the document and keeps going.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot open document: {0}")]
    Open(String),
    #[error("text extraction failed: {0}")]
    Extract(String),
}

/// Raw text of one page, 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait DocumentReader: Send + Sync {
    /// Extract every page of the document at `path`.
    fn read_pages(&self, path: &Path) -> Result<Vec<PageText>, ReadError>;
}

/// PDF extraction via `pdf-extract`.
pub struct PdfReader;

impl DocumentReader for PdfReader {
    fn read_pages(&self, path: &Path) -> Result<Vec<PageText>, ReadError> {
        let bytes = std::fs::read(path).map_err(|e| ReadError::Open(e.to_string()))?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| ReadError::Extract(e.to_string()))?;

        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| PageText {
                number: i as u32 + 1,
                text,
            })
            .collect())
    }
}

/// Collapse whitespace runs to single spaces and trim. Pages that clean to
/// an empty string carry no signal and are not indexed.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pdf_returns_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = PdfReader.read_pages(&path).unwrap_err();
        assert!(matches!(err, ReadError::Extract(_)));
    }

    #[test]
    fn missing_file_returns_open_error() {
        let err = PdfReader.read_pages(Path::new("/no/such/file.pdf")).unwrap_err();
        assert!(matches!(err, ReadError::Open(_)));
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a\t\tb\n\nc  "), "a b c");
        assert_eq!(clean_text("already clean"), "already clean");
        assert_eq!(clean_text(" \n\t "), "");
    }
}
