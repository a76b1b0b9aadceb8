//! Observable events
//!
//! Events are explicit and typed. Query lifecycles are logged through
//! [`ObservationScope`](super::ObservationScope) and carry their own
//! `<NAME>_BEGIN` / `_COMPLETE` / `_FAILED` names.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,
    SchemasLoaded,
    /// Schema files written by `init`
    SchemasWritten,

    // Store
    StoreOpened,
    /// Record file failed checksum or framing (FATAL)
    DataCorruption,

    // Ingestion
    DocumentValidated,
    DocumentRejected,
    DocumentInserted,
    InsertFailed,

    // Result shaping
    /// An aggregation row could not become a typed result and was dropped
    GroupRowSkipped,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::SchemasLoaded => "SCHEMAS_LOADED",
            Event::SchemasWritten => "SCHEMAS_WRITTEN",

            Event::StoreOpened => "STORE_OPENED",
            Event::DataCorruption => "DATA_CORRUPTION",

            Event::DocumentValidated => "DOCUMENT_VALIDATED",
            Event::DocumentRejected => "DOCUMENT_REJECTED",
            Event::DocumentInserted => "DOCUMENT_INSERTED",
            Event::InsertFailed => "INSERT_FAILED",

            Event::GroupRowSkipped => "GROUP_ROW_SKIPPED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::DataCorruption => Severity::Fatal,
            Event::InsertFailed => Severity::Error,
            Event::DocumentRejected | Event::GroupRowSkipped => Severity::Warn,
            Event::DocumentValidated => Severity::Trace,
            _ => Severity::Info,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
