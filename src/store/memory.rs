//! In-process document store

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::{assign_id, DocumentStore};
use crate::model::ObjectId;

/// Collections held in memory, guarded by a single `RwLock`.
///
/// Readers run concurrently; an insert briefly excludes them.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub fn len(&self, collection: &str) -> StoreResult<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::unavailable("Lock poisoned"))?;
        Ok(collections.get(collection).map_or(0, Vec::len))
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, collection: &str, document: Value) -> StoreResult<ObjectId> {
        let (id, document) = assign_id(collection, document)?;

        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::unavailable("Lock poisoned"))?;
        let docs = collections.entry(collection.to_string()).or_default();

        let taken = docs
            .iter()
            .any(|doc| doc.get("_id").and_then(Value::as_str) == Some(id.as_str()));
        if taken {
            return Err(StoreError::invalid_document(
                collection,
                format!("duplicate _id: {}", id),
            ));
        }

        docs.push(document);
        Ok(id)
    }

    fn scan(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::unavailable("Lock poisoned"))?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }
}
