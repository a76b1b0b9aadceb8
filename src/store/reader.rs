//! Sequential record reader
//!
//! Every record's checksum is verified as it is read. Any framing or
//! checksum failure aborts the read with `INSPECTDB_DATA_CORRUPTION`.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::errors::{StoreError, StoreResult};
use super::record::{DocumentRecord, MIN_RECORD_SIZE};

/// Reads records front to back from a record file.
pub struct RecordReader {
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl RecordReader {
    /// Opens the record file for reading.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_until(path, u64::MAX)
    }

    /// Opens the record file, reading no further than `end_offset`.
    ///
    /// Lets a scan stop at the last fully appended record while a writer is
    /// still active.
    pub fn open_until(path: &Path, end_offset: u64) -> StoreResult<Self> {
        let file = File::open(path).map_err(|e| {
            StoreError::read_failed(format!("Failed to open record file: {}", path.display()), e)
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StoreError::read_failed("Failed to read file metadata", e))?
            .len()
            .min(end_offset);

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Byte offset of the next record
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` at end of file. The file size is fixed when the
    /// reader opens, so records appended afterwards are not seen.
    pub fn read_next(&mut self) -> StoreResult<Option<DocumentRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated record file: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 || record_length > remaining {
            return Err(StoreError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Invalid record length {} ({} bytes remaining)",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StoreError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = DocumentRecord::deserialize(&record_buf)
            .map_err(|e| StoreError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;
        Ok(Some(record))
    }

    /// Reads every remaining record; any corruption fails the whole read.
    pub fn read_all(&mut self) -> StoreResult<Vec<DocumentRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }
}
