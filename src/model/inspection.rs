//! Inspection documents

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::object_id::ObjectId;

/// Outcome of an inspection. The serialized names are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionResult {
    Pass,
    #[serde(rename = "Violation Issued")]
    ViolationIssued,
    Fail,
}

impl InspectionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionResult::Pass => "Pass",
            InspectionResult::ViolationIssued => "Violation Issued",
            InspectionResult::Fail => "Fail",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pass" => Some(InspectionResult::Pass),
            "Violation Issued" => Some(InspectionResult::ViolationIssued),
            "Fail" => Some(InspectionResult::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for InspectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A document of the `inspections` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Logical reference to `restaurants._id`, not enforced
    pub restaurant_id: ObjectId,
    #[serde(with = "date_format")]
    pub date: DateTime<Utc>,
    pub result: InspectionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Inspection {
    pub fn new(restaurant_id: ObjectId, date: DateTime<Utc>, result: InspectionResult) -> Self {
        Self {
            id: None,
            restaurant_id,
            date,
            result,
            notes: None,
        }
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Dates serialize in canonical stored form and deserialize from either encoding.
mod date_format {
    use chrono::{DateTime, Utc};
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};
    use serde_json::Value;

    use crate::schema::extjson;

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&extjson::canonical_date(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        extjson::parse_date(&value).ok_or_else(|| de::Error::custom(format!("invalid date: {}", value)))
    }
}
