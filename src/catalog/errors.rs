//! Ingestion errors

use thiserror::Error;

use crate::schema::{SchemaError, ValidationErrors};
use crate::store::StoreError;

/// Result type for catalog operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Why a document was not persisted
#[derive(Debug, Error)]
pub enum IngestError {
    /// Unknown collection or schema violations
    #[error("{0}")]
    Schema(#[from] SchemaError),

    /// The store refused or failed the insert
    #[error("{0}")]
    Store(#[from] StoreError),

    /// A typed model could not be turned into a document
    #[error("Cannot encode {collection} document: {reason}")]
    Encode { collection: String, reason: String },
}

impl IngestError {
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::Schema(e) => e.code().code(),
            IngestError::Store(e) => e.code().code(),
            IngestError::Encode { .. } => "INSPECTDB_ENCODE_FAILED",
        }
    }

    /// The violation list when the document failed validation
    pub fn violations(&self) -> Option<&ValidationErrors> {
        match self {
            IngestError::Schema(e) => e.violations(),
            _ => None,
        }
    }

    pub fn is_fatal(&self) -> bool {
        match self {
            IngestError::Schema(e) => e.is_fatal(),
            IngestError::Store(e) => e.is_fatal(),
            IngestError::Encode { .. } => false,
        }
    }
}
