//! Schema validation subsystem
//!
//! Schemas are declarative `$jsonSchema` documents, one per collection, that
//! every candidate document is checked against before it is persisted.
//!
//! # Design Principles
//!
//! - Validation collects every violation, not just the first
//! - No coercion, no defaults, no mutation of the input
//! - Deterministic error order
//! - Accepted documents are stored in a canonical form that re-validates

pub mod builtin;
mod canonical;
mod errors;
pub mod extjson;
mod json_schema;
mod registry;
mod types;
mod validator;

pub use canonical::canonicalize;
pub use errors::{
    Constraint, SchemaError, SchemaErrorCode, SchemaResult, Severity, ValidationError,
    ValidationErrors,
};
pub use registry::SchemaRegistry;
pub use types::{FieldDef, FieldType, ObjectShape, Schema};
pub use validator::{validate, SchemaValidator};
