//! Store error types
//!
//! Error codes:
//! - INSPECTDB_STORE_IO_ERROR (ERROR severity)
//! - INSPECTDB_STORE_WRITE_FAILED (ERROR severity)
//! - INSPECTDB_STORE_READ_FAILED (ERROR severity)
//! - INSPECTDB_STORE_INVALID_DOCUMENT (ERROR severity)
//! - INSPECTDB_DATA_CORRUPTION (FATAL severity)

use std::fmt;
use std::io;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, process continues
    Error,
    /// The record file cannot be trusted; stop using it
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Disk I/O failure or unusable store state
    StoreIoError,
    /// Document write failed
    StoreWriteFailed,
    /// Document read failed
    StoreReadFailed,
    /// Document cannot be stored as given (not an object, bad `_id`)
    StoreInvalidDocument,
    /// Record checksum or framing failure
    DataCorruption,
}

impl StoreErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::StoreIoError => "INSPECTDB_STORE_IO_ERROR",
            StoreErrorCode::StoreWriteFailed => "INSPECTDB_STORE_WRITE_FAILED",
            StoreErrorCode::StoreReadFailed => "INSPECTDB_STORE_READ_FAILED",
            StoreErrorCode::StoreInvalidDocument => "INSPECTDB_STORE_INVALID_DOCUMENT",
            StoreErrorCode::DataCorruption => "INSPECTDB_DATA_CORRUPTION",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::DataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with code, message and optional context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    /// Where the failure happened (byte offset, collection)
    details: Option<String>,
    source: Option<io::Error>,
}

impl StoreError {
    fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::StoreIoError, message)
        }
    }

    /// Store state is unusable (e.g. a poisoned lock); no I/O error to attach
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::StoreIoError, message)
    }

    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::StoreWriteFailed, message)
        }
    }

    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::StoreReadFailed, message)
        }
    }

    pub fn invalid_document(collection: &str, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("collection: {}", collection)),
            ..Self::new(StoreErrorCode::StoreInvalidDocument, reason)
        }
    }

    /// Create a data corruption error (FATAL)
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::DataCorruption, message)
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::new(StoreErrorCode::DataCorruption, reason)
        }
    }

    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether this error is fatal
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
