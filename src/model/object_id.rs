//! ObjectId newtype

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::schema::extjson;

/// A 12-byte document identifier, held as 24 lowercase hex digits.
///
/// Deserializes from either a hex string or extended JSON `{"$oid": ...}`;
/// always serializes as the plain hex string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        let bytes = Uuid::new_v4().into_bytes();
        let hex: String = bytes[..12].iter().map(|b| format!("{:02x}", b)).collect();
        Self(hex)
    }

    /// Parses a 24-digit hex string.
    pub fn parse(s: &str) -> Option<Self> {
        extjson::is_object_id_hex(s).then(|| Self(s.to_ascii_lowercase()))
    }

    /// Reads an id in either encoding from a document value.
    pub fn from_value(value: &Value) -> Option<Self> {
        extjson::object_id_hex(value).and_then(Self::parse)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ObjectId::from_value(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid ObjectId: {}", value)))
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::String(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_ids_are_valid_and_distinct() {
        let a = ObjectId::generate();
        let b = ObjectId::generate();
        assert!(ObjectId::parse(a.as_str()).is_some());
        assert_eq!(a.as_str().len(), 24);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let id = ObjectId::parse("ABCDEF0123456789ABCDEF01").unwrap();
        assert_eq!(id.as_str(), "abcdef0123456789abcdef01");
        assert!(ObjectId::parse("abc").is_none());
    }

    #[test]
    fn test_deserialize_both_encodings() {
        let plain: ObjectId = serde_json::from_value(json!("65a1b2c3d4e5f60718293a4b")).unwrap();
        let ext: ObjectId =
            serde_json::from_value(json!({"$oid": "65a1b2c3d4e5f60718293a4b"})).unwrap();
        assert_eq!(plain, ext);
        assert_eq!(serde_json::to_value(&ext).unwrap(), json!("65a1b2c3d4e5f60718293a4b"));

        assert!(serde_json::from_value::<ObjectId>(json!(42)).is_err());
    }
}
