//! Canonical stored form for ObjectId and date fields
//!
//! Accepted documents are rewritten so that every declared `objectId` field
//! is a lowercase hex string and every `date` field is an RFC 3339 UTC string
//! with millisecond precision. Values that cannot be interpreted are left
//! untouched; the validator is what rejects them.

use serde_json::{Map, Value};

use super::extjson;
use super::types::{FieldDef, FieldType, ObjectShape, Schema};

/// Returns the canonical form of `document` under `schema`.
pub fn canonicalize(document: &Value, schema: &Schema) -> Value {
    match document {
        Value::Object(obj) => Value::Object(canonicalize_object(obj, &schema.root)),
        other => other.clone(),
    }
}

fn canonicalize_object(obj: &Map<String, Value>, shape: &ObjectShape) -> Map<String, Value> {
    obj.iter()
        .map(|(key, value)| {
            let value = match shape.properties.get(key) {
                Some(def) => canonicalize_value(value, def),
                None => value.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

fn canonicalize_value(value: &Value, def: &FieldDef) -> Value {
    match &def.field_type {
        FieldType::ObjectId => match extjson::object_id_hex(value) {
            Some(hex) => Value::String(hex.to_ascii_lowercase()),
            None => value.clone(),
        },
        FieldType::Date => match extjson::parse_date(value) {
            Some(date) => Value::String(extjson::canonical_date(&date)),
            None => value.clone(),
        },
        FieldType::Object(shape) => match value {
            Value::Object(obj) => Value::Object(canonicalize_object(obj, shape)),
            other => other.clone(),
        },
        FieldType::Array(Some(items)) => match value {
            Value::Array(arr) => Value::Array(arr.iter().map(|v| canonicalize_value(v, items)).collect()),
            other => other.clone(),
        },
        _ => value.clone(),
    }
}
