//! Graph store error types.

use thiserror::Error;

/// Errors raised by the graph store adapter.
///
/// Every failure reported by the underlying engine is wrapped into the
/// `Store` kind carrying the original message.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failure reported by the graph store.
    #[error("store error: {0}")]
    Store(String),

    /// Statement parameters could not be encoded.
    #[error("parameter encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        StoreError::Store(err.to_string())
    }
}
