//! Query errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Error)]
pub enum QueryError {
    /// Store failure, passed through unchanged
    #[error("{0}")]
    Store(#[from] StoreError),

    /// A stored document does not have the shape of its collection's model
    #[error("Cannot decode {collection} document: {reason}")]
    Decode { collection: String, reason: String },
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Store(e) => e.code().code(),
            QueryError::Decode { .. } => "INSPECTDB_QUERY_DECODE_FAILED",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, QueryError::Store(e) if e.is_fatal())
    }
}
