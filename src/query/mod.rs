//! Query evaluation over in-memory documents
//!
//! # Evaluation order
//!
//! - find: filter by predicates, then sort (if specified)
//! - aggregate: each pipeline stage in declaration order
//!
//! # Invariants
//!
//! - Deterministic: same input order + same query = same output
//! - Sorting is stable
//! - No type coercion in predicates

mod aggregate;
mod ast;
mod filters;
mod sorter;

pub use aggregate::Aggregator;
pub use ast::{
    Accumulator, FilterOp, GroupSpec, LookupSpec, Pipeline, Predicate, SortDirection, SortSpec,
    Stage,
};
pub use filters::{field_at, PredicateFilter};
pub use sorter::ResultSorter;

use serde_json::Value;

/// Filters `documents` by `predicates` and applies `sort` if given.
pub fn find(documents: Vec<Value>, predicates: &[Predicate], sort: Option<&SortSpec>) -> Vec<Value> {
    let mut matched: Vec<Value> = documents
        .into_iter()
        .filter(|doc| PredicateFilter::matches(doc, predicates))
        .collect();

    if let Some(spec) = sort {
        ResultSorter::sort(&mut matched, spec);
    }

    matched
}
