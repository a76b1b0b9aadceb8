//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::catalog::IngestError;
use crate::runner::QueryError;
use crate::schema::SchemaError;
use crate::store::StoreError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing, unparseable or invalid
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Input is not valid JSON
    InvalidJson,
    /// Data directory already initialized
    AlreadyInitialized,
    /// Data directory not initialized
    NotInitialized,
    /// Schemas or store could not be opened
    OpenFailed,
    /// A query or insert failed in a way the caller cannot recover from
    CommandFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "INSPECTDB_CLI_CONFIG_ERROR",
            Self::IoError => "INSPECTDB_CLI_IO_ERROR",
            Self::InvalidJson => "INSPECTDB_CLI_INVALID_JSON",
            Self::AlreadyInitialized => "INSPECTDB_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "INSPECTDB_CLI_NOT_INITIALIZED",
            Self::OpenFailed => "INSPECTDB_CLI_OPEN_FAILED",
            Self::CommandFailed => "INSPECTDB_CLI_COMMAND_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_json(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidJson, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "Data directory not initialized. Run 'inspectdb init' first.",
        )
    }

    pub fn open_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::OpenFailed, msg)
    }

    pub fn command_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::CommandFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::open_failed(e.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::open_failed(e.to_string())
    }
}

impl From<IngestError> for CliError {
    fn from(e: IngestError) -> Self {
        Self::command_failed(e.to_string())
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        Self::command_failed(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
