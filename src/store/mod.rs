//! Document store
//!
//! The seam between ingestion/queries and wherever documents live. A store
//! keeps named collections of JSON documents, each with a unique `_id`.
//! Filtering, sorting, grouping and joins are evaluated by the query engine
//! over what `scan` returns, so a store only has to implement `insert` and
//! `scan`; a driver-backed store can override `find` and `aggregate` to push
//! the work down.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: collections behind an `RwLock`
//! - [`FileStore`]: one append-only, checksummed record file per data directory

mod checksum;
mod errors;
mod file;
mod memory;
mod reader;
mod record;
mod writer;

pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};
pub use file::{FileStore, RECORD_FILE};
pub use memory::MemoryStore;
pub use reader::RecordReader;
pub use record::DocumentRecord;
pub use writer::RecordWriter;

use serde_json::Value;

use crate::model::ObjectId;
use crate::query::{self, Aggregator, Pipeline, Predicate, SortSpec};

/// Collections of JSON documents.
///
/// Implementations must be safe to share between threads; queries only ever
/// take `&self`.
pub trait DocumentStore: Send + Sync {
    /// Stores `document` in `collection` and returns its `_id`.
    ///
    /// A missing `_id` is generated; an `_id` already used in the collection
    /// is rejected with `INSPECTDB_STORE_INVALID_DOCUMENT`.
    fn insert(&self, collection: &str, document: Value) -> StoreResult<ObjectId>;

    /// Every document in `collection`, in insertion order. An unknown
    /// collection is empty.
    fn scan(&self, collection: &str) -> StoreResult<Vec<Value>>;

    /// Documents of `collection` matching all `predicates`, sorted by `sort`.
    fn find(
        &self,
        collection: &str,
        predicates: &[Predicate],
        sort: Option<&SortSpec>,
    ) -> StoreResult<Vec<Value>> {
        Ok(query::find(self.scan(collection)?, predicates, sort))
    }

    /// Runs `pipeline` over `collection`; lookups scan their foreign collection.
    fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> StoreResult<Vec<Value>> {
        Aggregator::run(self.scan(collection)?, pipeline, |from| self.scan(from))
    }
}

/// Checks that `document` is an object and fixes its `_id`.
///
/// An existing `_id` (plain hex or `{"$oid": ...}`) is normalized to
/// lowercase hex; a missing one is generated.
pub(crate) fn assign_id(collection: &str, document: Value) -> StoreResult<(ObjectId, Value)> {
    let mut object = match document {
        Value::Object(object) => object,
        other => {
            return Err(StoreError::invalid_document(
                collection,
                format!("document must be an object, got {}", json_kind(&other)),
            ))
        }
    };

    let id = match object.get("_id") {
        None => ObjectId::generate(),
        Some(raw) => ObjectId::from_value(raw).ok_or_else(|| {
            StoreError::invalid_document(collection, format!("invalid _id: {}", raw))
        })?,
    };

    object.insert("_id".into(), id.clone().into());
    Ok((id, Value::Object(object)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
