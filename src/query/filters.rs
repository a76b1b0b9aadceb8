//! Predicate filtering
//!
//! Filters documents strictly according to predicates.
//! No type coercion, exact match only; comparisons are defined between
//! numbers and between strings.

use std::cmp::Ordering;

use serde_json::Value;

use super::ast::{FilterOp, Predicate};

/// Evaluates predicates against documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a document matches all predicates
    pub fn matches(document: &Value, predicates: &[Predicate]) -> bool {
        // All predicates must match (AND semantics)
        predicates
            .iter()
            .all(|pred| Self::matches_predicate(document, pred))
    }

    /// Checks if a document matches a single predicate
    fn matches_predicate(document: &Value, predicate: &Predicate) -> bool {
        let field_value = match field_at(document, &predicate.field) {
            Some(v) => v,
            None => return false, // Missing field = no match
        };

        if field_value.is_null() {
            return false;
        }

        match &predicate.op {
            FilterOp::Eq(expected) => Self::eq_match(field_value, expected),
            FilterOp::Gte(bound) => Self::compare(field_value, bound).map_or(false, Ordering::is_ge),
            FilterOp::Gt(bound) => Self::compare(field_value, bound).map_or(false, Ordering::is_gt),
            FilterOp::Lte(bound) => Self::compare(field_value, bound).map_or(false, Ordering::is_le),
            FilterOp::Lt(bound) => Self::compare(field_value, bound).map_or(false, Ordering::is_lt),
        }
    }

    /// Exact equality match (no coercion, but 4 and 4.0 are the same number)
    fn eq_match(actual: &Value, expected: &Value) -> bool {
        match (actual, expected) {
            (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
                (Some(af), Some(bf)) => af == bf,
                _ => a == b,
            },
            _ => actual == expected,
        }
    }

    /// Orders two values of the same kind; `None` if they are not comparable
    fn compare(actual: &Value, bound: &Value) -> Option<Ordering> {
        match (actual, bound) {
            (Value::Number(a), Value::Number(b)) => {
                if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                    return Some(ai.cmp(&bi));
                }
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Resolves a dotted field path inside a document.
pub fn field_at<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(document, |current, part| current.get(part))
}
