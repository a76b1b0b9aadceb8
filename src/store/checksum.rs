//! CRC32 checksums for record framing
//!
//! Every record read from disk is checked; a mismatch is corruption.

use crc32fast::Hasher;

/// CRC32 (IEEE) over `data`.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
