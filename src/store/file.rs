//! File-backed document store
//!
//! All collections share `<data_dir>/data/documents.dat`. Appends are
//! serialized through one writer; each scan opens its own reader and stops at
//! the last record that was fully appended when the scan began.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::reader::RecordReader;
use super::record::DocumentRecord;
use super::writer::RecordWriter;
use super::{assign_id, DocumentStore};
use crate::model::ObjectId;

/// Record file name under `<data_dir>/data/`
pub const RECORD_FILE: &str = "documents.dat";

pub struct FileStore {
    path: PathBuf,
    writer: Mutex<RecordWriter>,
}

impl FileStore {
    /// Opens (or creates) the store under `data_dir`.
    ///
    /// Existing records are checksum-verified before this returns.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        let path = data_dir.join("data").join(RECORD_FILE);
        let writer = RecordWriter::open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        Ok(self.writer()?.count(collection))
    }

    fn writer(&self) -> StoreResult<MutexGuard<'_, RecordWriter>> {
        self.writer
            .lock()
            .map_err(|_| StoreError::unavailable("Lock poisoned"))
    }
}

impl DocumentStore for FileStore {
    fn insert(&self, collection: &str, document: Value) -> StoreResult<ObjectId> {
        let (id, document) = assign_id(collection, document)?;
        let record = DocumentRecord::from_document(collection, id.as_str(), &document)
            .map_err(|e| StoreError::invalid_document(collection, e.to_string()))?;

        self.writer()?.append(&record)?;
        Ok(id)
    }

    fn scan(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let end_offset = self.writer()?.current_offset();
        if end_offset == 0 {
            return Ok(Vec::new());
        }

        let mut reader = RecordReader::open_until(&self.path, end_offset)?;
        let mut documents = Vec::new();
        while let Some(record) = reader.read_next()? {
            if record.collection != collection {
                continue;
            }
            let document = record.document().map_err(|e| {
                StoreError::data_corruption(format!(
                    "Unparseable document {} in {}: {}",
                    record.document_id, collection, e
                ))
            })?;
            documents.push(document);
        }

        Ok(documents)
    }
}
