//! Validate-then-persist ingestion
//!
//! The catalog owns the schema registry and the store. Every document goes
//! through the same steps before it is acknowledged:
//!
//! 1. Resolve the schema for the target collection
//! 2. Validate, collecting every violation
//! 3. Rewrite ObjectIds and dates to the canonical stored form
//! 4. Insert (the store assigns `_id` when absent)
//!
//! A rejected document never reaches the store.

mod errors;

pub use errors::{IngestError, IngestResult};

use serde::Serialize;
use serde_json::Value;

use crate::model::{Inspection, ObjectId, Restaurant};
use crate::observability::{log_event, Event};
use crate::runner::QueryRunner;
use crate::schema::{builtin, canonicalize, SchemaRegistry, SchemaValidator};
use crate::store::DocumentStore;

pub struct Catalog<S> {
    registry: SchemaRegistry,
    store: S,
}

impl<S: DocumentStore> Catalog<S> {
    pub fn new(registry: SchemaRegistry, store: S) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read-only queries over this catalog's store
    pub fn runner(&self) -> QueryRunner<'_, S> {
        QueryRunner::new(&self.store)
    }

    /// Validates `document` for `collection` without storing it.
    pub fn validate(&self, collection: &str, document: &Value) -> IngestResult<()> {
        let result = SchemaValidator::new(&self.registry).validate_document(collection, document);

        match &result {
            Ok(()) => log_event(Event::DocumentValidated, &[("collection", collection)]),
            Err(e) => {
                let violations = e.violations().map_or(0, |v| v.len()).to_string();
                log_event(
                    Event::DocumentRejected,
                    &[
                        ("code", e.code().code()),
                        ("collection", collection),
                        ("reason", e.message()),
                        ("violations", violations.as_str()),
                    ],
                );
            }
        }

        Ok(result?)
    }

    /// Validates, canonicalizes and stores `document`; returns its `_id`.
    pub fn insert(&self, collection: &str, document: Value) -> IngestResult<ObjectId> {
        self.validate(collection, &document)?;

        let schema = self.registry.get(collection)?;
        let canonical = canonicalize(&document, schema);

        match self.store.insert(collection, canonical) {
            Ok(id) => {
                log_event(
                    Event::DocumentInserted,
                    &[("collection", collection), ("id", id.as_str())],
                );
                Ok(id)
            }
            Err(e) => {
                let event = if e.is_fatal() {
                    Event::DataCorruption
                } else {
                    Event::InsertFailed
                };
                log_event(
                    event,
                    &[
                        ("code", e.code().code()),
                        ("collection", collection),
                        ("reason", e.message()),
                    ],
                );
                Err(e.into())
            }
        }
    }

    pub fn insert_restaurant(&self, restaurant: &Restaurant) -> IngestResult<ObjectId> {
        self.insert_model(builtin::RESTAURANTS, restaurant)
    }

    pub fn insert_inspection(&self, inspection: &Inspection) -> IngestResult<ObjectId> {
        self.insert_model(builtin::INSPECTIONS, inspection)
    }

    fn insert_model<T: Serialize>(&self, collection: &str, model: &T) -> IngestResult<ObjectId> {
        let document = serde_json::to_value(model).map_err(|e| IngestError::Encode {
            collection: collection.to_string(),
            reason: e.to_string(),
        })?;
        self.insert(collection, document)
    }
}
