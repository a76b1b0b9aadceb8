//! Schema error types
//!
//! Error codes:
//! - INSPECTDB_UNKNOWN_SCHEMA (REJECT)
//! - INSPECTDB_SCHEMA_VALIDATION_FAILED (REJECT)
//! - INSPECTDB_SCHEMA_IMMUTABLE (REJECT)
//! - INSPECTDB_SCHEMA_MALFORMED (FATAL)
//!
//! Document violations are collected as [`ValidationError`] values rather than
//! raised one at a time, so a caller can report every problem at once.

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
    /// Schema declarations are unusable, the process cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// No schema registered for the collection
    UnknownSchema,
    /// Document violates schema
    ValidationFailed,
    /// Attempt to replace a registered schema
    SchemaImmutable,
    /// Schema declaration cannot be parsed or read
    SchemaMalformed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::UnknownSchema => "INSPECTDB_UNKNOWN_SCHEMA",
            SchemaErrorCode::ValidationFailed => "INSPECTDB_SCHEMA_VALIDATION_FAILED",
            SchemaErrorCode::SchemaImmutable => "INSPECTDB_SCHEMA_IMMUTABLE",
            SchemaErrorCode::SchemaMalformed => "INSPECTDB_SCHEMA_MALFORMED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::SchemaMalformed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The schema keyword a value failed to satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// `bsonType`
    Type,
    /// `minLength`
    MinLength,
    /// `maxLength`
    MaxLength,
    /// `minimum`
    Minimum,
    /// `maximum`
    Maximum,
    /// `enum`
    Enum,
    /// `additionalProperties: false`
    AdditionalProperties,
}

impl Constraint {
    /// Returns the keyword as spelled in `$jsonSchema`
    pub fn keyword(&self) -> &'static str {
        match self {
            Constraint::Type => "bsonType",
            Constraint::MinLength => "minLength",
            Constraint::MaxLength => "maxLength",
            Constraint::Minimum => "minimum",
            Constraint::Maximum => "maximum",
            Constraint::Enum => "enum",
            Constraint::AdditionalProperties => "additionalProperties",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A single document violation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is absent
    MissingField {
        /// Field path (e.g. "address.city")
        field: String,
    },
    /// A present field violates its declared type, length, range or enumeration
    TypeOrRangeViolation {
        /// Field path
        field: String,
        /// Violated keyword
        constraint: Constraint,
        /// Expected type or condition
        expected: String,
        /// Actual value or type found
        actual: String,
    },
}

impl ValidationError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        ValidationError::MissingField {
            field: field.into(),
        }
    }

    pub fn violation(
        field: impl Into<String>,
        constraint: Constraint,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::TypeOrRangeViolation {
            field: field.into(),
            constraint,
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns the field path this error refers to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::TypeOrRangeViolation { field, .. } => field,
        }
    }

    /// Returns the violated constraint, `None` for missing fields
    pub fn constraint(&self) -> Option<Constraint> {
        match self {
            ValidationError::MissingField { .. } => None,
            ValidationError::TypeOrRangeViolation { constraint, .. } => Some(*constraint),
        }
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self, ValidationError::MissingField { .. })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField { field } => {
                write!(f, "field '{}': required field is missing", field)
            }
            ValidationError::TypeOrRangeViolation {
                field,
                constraint,
                expected,
                actual,
            } => write!(
                f,
                "field '{}': violates {}, expected {}, got {}",
                field, constraint, expected, actual
            ),
        }
    }
}

/// The complete, non-empty list of violations for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Wraps a list of errors. Returns `None` for an empty list.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Returns the paths of all missing required fields
    pub fn missing_fields(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.is_missing_field())
            .map(|e| e.field())
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Schema error type with full context
#[derive(Debug)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    collection: Option<String>,
    violations: Option<ValidationErrors>,
}

impl SchemaError {
    /// Create an unknown schema error
    pub fn unknown_schema(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            code: SchemaErrorCode::UnknownSchema,
            message: format!("No schema registered for collection '{}'", collection),
            collection: Some(collection),
            violations: None,
        }
    }

    /// Create a validation failed error carrying every violation
    pub fn validation_failed(collection: impl Into<String>, violations: ValidationErrors) -> Self {
        let collection = collection.into();
        Self {
            code: SchemaErrorCode::ValidationFailed,
            message: format!(
                "Document rejected by '{}' schema: {}",
                collection, violations
            ),
            collection: Some(collection),
            violations: Some(violations),
        }
    }

    /// Create a schema immutable error
    pub fn schema_immutable(collection: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            code: SchemaErrorCode::SchemaImmutable,
            message: format!("Schema for '{}' is already registered", collection),
            collection: Some(collection),
            violations: None,
        }
    }

    /// Create an error for a malformed schema declaration
    pub fn malformed_schema(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::SchemaMalformed,
            message: format!("Malformed schema '{}': {}", source.into(), reason.into()),
            collection: None,
            violations: None,
        }
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Returns the violations if this is a validation failure
    pub fn violations(&self) -> Option<&ValidationErrors> {
        self.violations.as_ref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
