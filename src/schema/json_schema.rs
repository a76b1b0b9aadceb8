//! `$jsonSchema` declaration parsing and rendering
//!
//! Schema files hold the same validator documents a MongoDB collection would
//! be created with, either wrapped (`{"$jsonSchema": {...}}`) or bare.

use serde_json::{json, Map, Value};

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldType, ObjectShape, Schema};

const JSON_SCHEMA_KEY: &str = "$jsonSchema";

impl Schema {
    /// Parses a `$jsonSchema` declaration for `collection`.
    pub fn from_json_schema(collection: impl Into<String>, declaration: &Value) -> SchemaResult<Self> {
        let collection = collection.into();
        let root = declaration.get(JSON_SCHEMA_KEY).unwrap_or(declaration);

        let root_obj = root
            .as_object()
            .ok_or_else(|| SchemaError::malformed_schema(&collection, "declaration must be an object"))?;

        match root_obj.get("bsonType") {
            None => {}
            Some(Value::String(t)) if t == "object" => {}
            Some(other) => {
                return Err(SchemaError::malformed_schema(
                    &collection,
                    format!("root bsonType must be \"object\", found {}", other),
                ))
            }
        }

        let shape = parse_shape(root_obj, &collection, "")?;
        Ok(Schema::new(collection, shape))
    }

    /// Renders the schema as a wrapped `$jsonSchema` declaration.
    pub fn to_json_schema(&self) -> Value {
        let mut root = render_shape(&self.root);
        root.insert("bsonType".into(), json!("object"));
        json!({ JSON_SCHEMA_KEY: Value::Object(root) })
    }
}

fn parse_shape(obj: &Map<String, Value>, source: &str, path: &str) -> SchemaResult<ObjectShape> {
    let mut shape = ObjectShape::new();

    if let Some(required) = obj.get("required") {
        let names = required
            .as_array()
            .ok_or_else(|| malformed(source, path, "'required' must be an array"))?;
        for name in names {
            let name = name
                .as_str()
                .ok_or_else(|| malformed(source, path, "'required' entries must be strings"))?;
            shape.required.push(name.to_string());
        }
    }

    if let Some(properties) = obj.get("properties") {
        let properties = properties
            .as_object()
            .ok_or_else(|| malformed(source, path, "'properties' must be an object"))?;
        for (name, decl) in properties {
            let field_path = join(path, name);
            let def = parse_field(decl, source, &field_path)?;
            shape.properties.insert(name.clone(), def);
        }
    }

    if let Some(additional) = obj.get("additionalProperties") {
        shape.additional_properties = additional
            .as_bool()
            .ok_or_else(|| malformed(source, path, "'additionalProperties' must be a boolean"))?;
    }

    Ok(shape)
}

fn parse_field(decl: &Value, source: &str, path: &str) -> SchemaResult<FieldDef> {
    let obj = decl
        .as_object()
        .ok_or_else(|| malformed(source, path, "property declaration must be an object"))?;

    let field_type = match obj.get("bsonType") {
        None => FieldType::Any,
        Some(Value::String(name)) => match name.as_str() {
            "string" => FieldType::String,
            "int" => FieldType::Int,
            "long" => FieldType::Long,
            "double" => FieldType::Double,
            "number" => FieldType::Number,
            "bool" => FieldType::Bool,
            "date" => FieldType::Date,
            "objectId" => FieldType::ObjectId,
            "object" => FieldType::Object(parse_shape(obj, source, path)?),
            "array" => {
                let items = match obj.get("items") {
                    Some(items) => Some(Box::new(parse_field(items, source, &format!("{}[]", path))?)),
                    None => None,
                };
                FieldType::Array(items)
            }
            other => {
                return Err(malformed(source, path, &format!("unsupported bsonType '{}'", other)))
            }
        },
        Some(_) => return Err(malformed(source, path, "'bsonType' must be a string")),
    };

    let mut def = FieldDef::new(field_type);
    def.min_length = length_keyword(obj, "minLength", source, path)?;
    def.max_length = length_keyword(obj, "maxLength", source, path)?;
    def.minimum = number_keyword(obj, "minimum", source, path)?;
    def.maximum = number_keyword(obj, "maximum", source, path)?;

    if let Some(values) = obj.get("enum") {
        let values = values
            .as_array()
            .ok_or_else(|| malformed(source, path, "'enum' must be an array"))?;
        def.enum_values = Some(values.clone());
    }

    if let Some(description) = obj.get("description") {
        def.description = description.as_str().map(str::to_string);
    }

    Ok(def)
}

fn length_keyword(
    obj: &Map<String, Value>,
    key: &str,
    source: &str,
    path: &str,
) -> SchemaResult<Option<usize>> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| malformed(source, path, &format!("'{}' must be a non-negative integer", key))),
    }
}

fn number_keyword(
    obj: &Map<String, Value>,
    key: &str,
    source: &str,
    path: &str,
) -> SchemaResult<Option<f64>> {
    match obj.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| malformed(source, path, &format!("'{}' must be a number", key))),
    }
}

fn render_shape(shape: &ObjectShape) -> Map<String, Value> {
    let mut out = Map::new();

    if !shape.required.is_empty() {
        out.insert("required".into(), json!(shape.required));
    }

    let properties: Map<String, Value> = shape
        .properties
        .iter()
        .map(|(name, def)| (name.clone(), Value::Object(render_field(def))))
        .collect();
    out.insert("properties".into(), Value::Object(properties));

    if !shape.additional_properties {
        out.insert("additionalProperties".into(), json!(false));
    }

    out
}

fn render_field(def: &FieldDef) -> Map<String, Value> {
    let mut out = match &def.field_type {
        FieldType::Object(shape) => render_shape(shape),
        FieldType::Array(Some(items)) => {
            let mut m = Map::new();
            m.insert("items".into(), Value::Object(render_field(items)));
            m
        }
        _ => Map::new(),
    };

    if def.field_type != FieldType::Any {
        out.insert("bsonType".into(), json!(def.field_type.type_name()));
    }
    if let Some(n) = def.min_length {
        out.insert("minLength".into(), json!(n));
    }
    if let Some(n) = def.max_length {
        out.insert("maxLength".into(), json!(n));
    }
    if let Some(n) = def.minimum {
        out.insert("minimum".into(), number_value(n));
    }
    if let Some(n) = def.maximum {
        out.insert("maximum".into(), number_value(n));
    }
    if let Some(values) = &def.enum_values {
        out.insert("enum".into(), Value::Array(values.clone()));
    }
    if let Some(description) = &def.description {
        out.insert("description".into(), json!(description));
    }

    out
}

/// Integral bounds are written as integers (`1`, not `1.0`).
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn malformed(source: &str, path: &str, reason: &str) -> SchemaError {
    if path.is_empty() {
        SchemaError::malformed_schema(source, reason)
    } else {
        SchemaError::malformed_schema(source, format!("at '{}': {}", path, reason))
    }
}
