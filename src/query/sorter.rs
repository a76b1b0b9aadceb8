//! Result sorting
//!
//! Sorts documents by a single field. The sort is stable: documents with
//! equal keys keep their input order.

use std::cmp::Ordering;

use serde_json::Value;

use crate::schema::extjson;

use super::ast::{SortDirection, SortSpec};
use super::filters::field_at;

/// Sorts result documents
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts documents according to sort specification.
    pub fn sort(documents: &mut [Value], sort_spec: &SortSpec) {
        documents.sort_by(|a, b| {
            let a_val = field_at(a, &sort_spec.field);
            let b_val = field_at(b, &sort_spec.field);

            let ordering = Self::compare_values(a_val, b_val);

            match sort_spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - two dates compare in time order, whatever their encoding
    /// - two ObjectIds compare by hex digits, whatever their encoding
    /// - otherwise missing < null < bool < number < string < array < object
    /// - For same types, natural ordering
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                if let (Some(a_date), Some(b_date)) =
                    (extjson::parse_date(a_val), extjson::parse_date(b_val))
                {
                    return a_date.cmp(&b_date);
                }
                if let (Some(a_id), Some(b_id)) =
                    (extjson::object_id_hex(a_val), extjson::object_id_hex(b_val))
                {
                    return a_id.to_ascii_lowercase().cmp(&b_id.to_ascii_lowercase());
                }

                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);

                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(a_b), Value::Bool(b_b)) => a_b.cmp(b_b),
                    (Value::Number(a_n), Value::Number(b_n)) => {
                        let a_f = a_n.as_f64().unwrap_or(0.0);
                        let b_f = b_n.as_f64().unwrap_or(0.0);
                        a_f.partial_cmp(&b_f).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(a_s), Value::String(b_s)) => a_s.cmp(b_s),
                    _ => Ordering::Equal, // Arrays and objects not compared
                }
            }
        }
    }
}
