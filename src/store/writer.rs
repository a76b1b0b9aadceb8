//! Append-only record writer
//!
//! Records are appended and fsynced one at a time; nothing is ever
//! rewritten in place. An insert is not acknowledged until its fsync returns.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::reader::RecordReader;
use super::record::DocumentRecord;

/// Writer for `<data_dir>/data/documents.dat`.
pub struct RecordWriter {
    path: PathBuf,
    file: File,
    current_offset: u64,
    /// Document ids per collection, rebuilt on open
    ids: HashMap<String, HashSet<String>>,
}

impl RecordWriter {
    /// Opens or creates the record file, creating parent directories.
    ///
    /// Existing records are scanned once so a corrupt file fails here rather
    /// than on the first query.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to create data directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                StoreError::write_failed(
                    format!("Failed to open record file: {}", path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StoreError::write_failed("Failed to read file metadata", e))?
            .len();

        let mut ids: HashMap<String, HashSet<String>> = HashMap::new();
        if current_offset > 0 {
            for record in RecordReader::open(path)?.read_all()? {
                ids.entry(record.collection).or_default().insert(record.document_id);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            current_offset,
            ids,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Number of documents written for `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.ids.get(collection).map_or(0, HashSet::len)
    }

    pub fn contains(&self, collection: &str, document_id: &str) -> bool {
        self.ids
            .get(collection)
            .map_or(false, |ids| ids.contains(document_id))
    }

    /// Appends one record and fsyncs.
    ///
    /// Returns the byte offset the record was written at. A record whose id
    /// already exists in its collection is rejected without touching the file.
    pub fn append(&mut self, record: &DocumentRecord) -> StoreResult<u64> {
        if self.contains(&record.collection, &record.document_id) {
            return Err(StoreError::invalid_document(
                &record.collection,
                format!("duplicate _id: {}", record.document_id),
            ));
        }

        let serialized = record.serialize();
        let offset = self.current_offset;

        self.file.write_all(&serialized).map_err(|e| {
            StoreError::write_failed(
                format!("Failed to write document: {}", record.document_id),
                e,
            )
        })?;

        self.file.sync_all().map_err(|e| {
            StoreError::write_failed(
                format!("fsync failed after writing document: {}", record.document_id),
                e,
            )
        })?;

        self.current_offset += serialized.len() as u64;
        self.ids
            .entry(record.collection.clone())
            .or_default()
            .insert(record.document_id.clone());

        Ok(offset)
    }
}
