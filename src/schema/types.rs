//! Schema type definitions
//!
//! Mirrors the subset of `$jsonSchema` the two collection validators use:
//! - bsonType: object, string, int, long, double, number, bool, date, objectId, array
//! - required / properties / additionalProperties on objects
//! - minLength / maxLength on strings
//! - minimum / maximum on numbers
//! - enum on any value

use std::collections::BTreeMap;

use serde_json::Value;

/// Supported `bsonType` values
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// No `bsonType` declared, any value accepted
    Any,
    /// UTF-8 string
    String,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 64-bit floating point (integers accepted)
    Double,
    /// Any numeric value
    Number,
    /// Boolean
    Bool,
    /// Date/time value
    Date,
    /// 12-byte ObjectId
    ObjectId,
    /// Nested object with its own shape
    Object(ObjectShape),
    /// Array, optionally with an item definition
    Array(Option<Box<FieldDef>>),
}

impl FieldType {
    /// Returns the `bsonType` name
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Any => "any",
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Long => "long",
            FieldType::Double => "double",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Date => "date",
            FieldType::ObjectId => "objectId",
            FieldType::Object(_) => "object",
            FieldType::Array(_) => "array",
        }
    }
}

/// A single property declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub field_type: FieldType,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Allowed values, compared exactly
    pub enum_values: Option<Vec<Value>>,
    pub description: Option<String>,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            enum_values: None,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    /// A string of at least one character
    pub fn non_empty_string() -> Self {
        Self::string().with_min_length(1)
    }

    pub fn int() -> Self {
        Self::new(FieldType::Int)
    }

    pub fn date() -> Self {
        Self::new(FieldType::Date)
    }

    pub fn object_id() -> Self {
        Self::new(FieldType::ObjectId)
    }

    pub fn object(shape: ObjectShape) -> Self {
        Self::new(FieldType::Object(shape))
    }

    pub fn array(items: Option<FieldDef>) -> Self {
        Self::new(FieldType::Array(items.map(Box::new)))
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Shape of an object: required field names plus property declarations.
///
/// `required` may name fields that have no property declaration; presence is
/// all that is checked for those.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectShape {
    /// Required field names, in declaration order
    pub required: Vec<String>,
    /// Property declarations, in lexical order
    pub properties: BTreeMap<String, FieldDef>,
    /// Whether undeclared fields are accepted
    pub additional_properties: bool,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self {
            required: Vec::new(),
            properties: BTreeMap::new(),
            additional_properties: true,
        }
    }

    /// Declares a required property
    pub fn required(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, def);
        self
    }

    /// Declares an optional property
    pub fn optional(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.properties.insert(name.into(), def);
        self
    }

    /// Rejects undeclared fields
    pub fn closed(mut self) -> Self {
        self.additional_properties = false;
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

impl Default for ObjectShape {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation schema for one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Collection the schema guards
    pub collection: String,
    /// Top-level document shape
    pub root: ObjectShape,
}

impl Schema {
    pub fn new(collection: impl Into<String>, root: ObjectShape) -> Self {
        Self {
            collection: collection.into(),
            root,
        }
    }

    /// Looks up a property by dotted path (e.g. "address.city")
    pub fn field(&self, path: &str) -> Option<&FieldDef> {
        let mut shape = &self.root;
        let mut parts = path.split('.').peekable();

        while let Some(part) = parts.next() {
            let def = shape.properties.get(part)?;
            if parts.peek().is_none() {
                return Some(def);
            }
            match &def.field_type {
                FieldType::Object(inner) => shape = inner,
                _ => return None,
            }
        }

        None
    }
}
