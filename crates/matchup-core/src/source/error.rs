//! Source document error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading curated source documents.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A required file is absent.
    #[error("expected file not found: {}", path.display())]
    Missing { path: PathBuf },

    /// The document exists but violates the expected schema.
    #[error("invalid document {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
