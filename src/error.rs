//! Error types for papershelf.
//!
//! One taxonomy for the whole library: callers match on the variant to decide
//! whether an input was bad, a document was unreadable, or the store itself
//! failed. The CLI binary wraps these in `anyhow` at its edges.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the papershelf library.
#[derive(Debug, Error)]
pub enum ShelfError {
    /// Bad pagination or document-id input. Rejected before the index is
    /// touched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Query text that cannot be compiled (empty after trimming).
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// One document failed extraction during a sync pass. Non-fatal to the
    /// pass; the document's previous index state is left untouched.
    #[error("unreadable document {id}: {reason}")]
    Unreadable { id: String, reason: String },

    /// Index read/write failure. A failed replace rolls back to the prior
    /// committed state.
    #[error("index store error: {0}")]
    Index(#[from] sqlx::Error),

    /// The library directory could not be scanned. A pass that cannot scan
    /// performs no mutations.
    #[error("cannot scan library directory {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document not found: {0}")]
    NotFound(String),
}

pub type Result<T, E = ShelfError> = std::result::Result<T, E>;
