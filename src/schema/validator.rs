//! Schema validator for candidate documents
//!
//! Validation semantics:
//! - Every required field is present
//! - Present fields match their declared bsonType exactly (no coercion)
//! - Strings respect minLength/maxLength, numbers respect minimum/maximum
//! - Enumerated fields hold one of the declared values
//! - Nested objects and array items are validated recursively
//! - Undeclared fields are accepted unless the shape is closed
//!
//! Validation never stops at the first problem: the full list of violations is
//! returned. It is deterministic and does not mutate the document.

use serde_json::{Map, Value};

use super::errors::{Constraint, SchemaError, SchemaResult, ValidationError, ValidationErrors};
use super::extjson;
use super::registry::SchemaRegistry;
use super::types::{FieldDef, FieldType, ObjectShape, Schema};

/// Validates a document against a schema.
///
/// Returns every violation found, or `Ok(())` if there are none.
pub fn validate(document: &Value, schema: &Schema) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    match document.as_object() {
        Some(obj) => validate_object(obj, &schema.root, "", &mut errors),
        None => errors.push(ValidationError::violation(
            "$root",
            Constraint::Type,
            "object",
            json_type_name(document),
        )),
    }

    match ValidationErrors::from_vec(errors) {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}

/// Validator that resolves schemas by collection name.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator backed by the given registry.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validates a document destined for `collection`.
    ///
    /// # Errors
    ///
    /// - `INSPECTDB_UNKNOWN_SCHEMA` if no schema guards the collection
    /// - `INSPECTDB_SCHEMA_VALIDATION_FAILED` carrying every violation
    pub fn validate_document(&self, collection: &str, document: &Value) -> SchemaResult<()> {
        let schema = self.registry.get(collection)?;
        validate(document, schema).map_err(|errors| SchemaError::validation_failed(collection, errors))
    }
}

fn validate_object(
    obj: &Map<String, Value>,
    shape: &ObjectShape,
    path_prefix: &str,
    errors: &mut Vec<ValidationError>,
) {
    for name in &shape.required {
        if !obj.contains_key(name) {
            errors.push(ValidationError::missing_field(make_path(path_prefix, name)));
        }
    }

    for (name, def) in &shape.properties {
        if let Some(value) = obj.get(name) {
            validate_value(value, def, &make_path(path_prefix, name), errors);
        }
    }

    if !shape.additional_properties {
        for key in obj.keys() {
            if key != "_id" && !shape.properties.contains_key(key) {
                errors.push(ValidationError::violation(
                    make_path(path_prefix, key),
                    Constraint::AdditionalProperties,
                    "no undeclared fields",
                    "extra field present",
                ));
            }
        }
    }
}

fn validate_value(value: &Value, def: &FieldDef, path: &str, errors: &mut Vec<ValidationError>) {
    // A value of the wrong type is not range-checked.
    if !type_matches(value, &def.field_type, path, errors) {
        return;
    }

    if let Value::String(s) = value {
        let len = s.chars().count();
        if let Some(min) = def.min_length {
            if len < min {
                errors.push(ValidationError::violation(
                    path,
                    Constraint::MinLength,
                    format!("length >= {}", min),
                    format!("length {}", len),
                ));
            }
        }
        if let Some(max) = def.max_length {
            if len > max {
                errors.push(ValidationError::violation(
                    path,
                    Constraint::MaxLength,
                    format!("length <= {}", max),
                    format!("length {}", len),
                ));
            }
        }
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = def.minimum {
            if n < min {
                errors.push(ValidationError::violation(
                    path,
                    Constraint::Minimum,
                    format!(">= {}", min),
                    value.to_string(),
                ));
            }
        }
        if let Some(max) = def.maximum {
            if n > max {
                errors.push(ValidationError::violation(
                    path,
                    Constraint::Maximum,
                    format!("<= {}", max),
                    value.to_string(),
                ));
            }
        }
    }

    if let Some(allowed) = &def.enum_values {
        if !allowed.contains(value) {
            let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
            errors.push(ValidationError::violation(
                path,
                Constraint::Enum,
                format!("one of [{}]", listed.join(", ")),
                value.to_string(),
            ));
        }
    }
}

/// Checks the bsonType of a value, recursing into objects and arrays.
///
/// Returns false (after recording a violation) if the type does not match.
fn type_matches(
    value: &Value,
    field_type: &FieldType,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> bool {
    let matches = match field_type {
        FieldType::Any => true,
        FieldType::String => value.is_string(),
        FieldType::Int => value
            .as_i64()
            .map_or(false, |n| i32::try_from(n).is_ok()),
        FieldType::Long => value.is_i64(),
        FieldType::Double | FieldType::Number => value.is_number(),
        FieldType::Bool => value.is_boolean(),
        FieldType::Date => extjson::parse_date(value).is_some(),
        FieldType::ObjectId => extjson::object_id_hex(value).is_some(),
        FieldType::Object(shape) => match value.as_object() {
            Some(obj) => {
                validate_object(obj, shape, path, errors);
                true
            }
            None => false,
        },
        FieldType::Array(items) => match value.as_array() {
            Some(arr) => {
                if let Some(item_def) = items {
                    for (i, elem) in arr.iter().enumerate() {
                        validate_value(elem, item_def, &format!("{}[{}]", path, i), errors);
                    }
                }
                true
            }
            None => false,
        },
    };

    if !matches {
        errors.push(ValidationError::violation(
            path,
            Constraint::Type,
            field_type.type_name(),
            json_type_name(value),
        ));
    }

    matches
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "double"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
