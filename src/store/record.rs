//! On-disk document record
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record)
//! +------------------+
//! | Collection       | (length-prefixed string)
//! +------------------+
//! | Document ID      | (length-prefixed string)
//! +------------------+
//! | Document Body    | (length-prefixed JSON bytes)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Read};

use serde_json::Value;

use super::checksum::compute_checksum;

/// len + collection len + id len + body len + checksum
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 4 + 4 + 4;

/// One stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub collection: String,
    /// The document's `_id` in canonical hex form
    pub document_id: String,
    /// Serialized JSON document, `_id` included
    pub body: Vec<u8>,
}

impl DocumentRecord {
    /// Builds a record for `document`, which must already carry `_id`.
    pub fn from_document(
        collection: impl Into<String>,
        document_id: impl Into<String>,
        document: &Value,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            collection: collection.into(),
            document_id: document_id.into(),
            body: serde_json::to_vec(document)?,
        })
    }

    /// Parses the body back into a JSON document.
    pub fn document(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }

    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(12 + self.collection.len() + self.document_id.len() + self.body.len());

        buf.extend_from_slice(&(self.collection.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.collection.as_bytes());

        buf.extend_from_slice(&(self.document_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.document_id.as_bytes());

        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);

        buf
    }

    /// Serializes the complete framed record.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserializes a record, verifying its checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Record too short"));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
            let mut len_buf = [0u8; 4];
            reader.read_exact(&mut len_buf)?;
            let mut buf = vec![0u8; u32::from_le_bytes(len_buf) as usize];
            reader.read_exact(&mut buf)?;
            Ok(buf)
        }

        fn read_string<R: Read>(reader: &mut R) -> io::Result<String> {
            String::from_utf8(read_bytes(reader)?).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
            })
        }

        let collection = read_string(&mut cursor)?;
        let document_id = read_string(&mut cursor)?;
        let body = read_bytes(&mut cursor)?;

        Ok((
            Self {
                collection,
                document_id,
                body,
            },
            record_length,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> DocumentRecord {
        DocumentRecord::from_document(
            "restaurants",
            "0123456789abcdef01234567",
            &json!({"_id": "0123456789abcdef01234567", "name": "Golden Dragon"}),
        )
        .unwrap()
    }

    #[test]
    fn test_record_survives_framing() {
        let record = sample_record();
        let serialized = record.serialize();
        let (parsed, consumed) = DocumentRecord::deserialize(&serialized).unwrap();

        assert_eq!(parsed, record);
        assert_eq!(consumed, serialized.len());
        assert_eq!(parsed.document().unwrap()["name"], json!("Golden Dragon"));
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut serialized = sample_record().serialize();
        let mid = serialized.len() / 2;
        serialized[mid] ^= 0xFF;

        let err = DocumentRecord::deserialize(&serialized).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let serialized = sample_record().serialize();
        let err = DocumentRecord::deserialize(&serialized[..serialized.len() - 3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_deserialize_consumes_only_first_record() {
        let mut bytes = sample_record().serialize();
        let first_len = bytes.len();
        bytes.extend_from_slice(&sample_record().serialize());

        let (_, consumed) = DocumentRecord::deserialize(&bytes).unwrap();
        assert_eq!(consumed, first_len);
    }
}
