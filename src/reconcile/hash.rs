//! Content hashing and hash indexes.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::error::{CardsyncError, Result};
use crate::record::Record;

/// Maps a record key to its content hash.
pub type HashIndex = BTreeMap<String, String>;

/// Separator placed between hashed fields.
pub const FIELD_SEPARATOR: &str = "|";

/// Default number of records hashed per batch.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// SHA-256 over `field_1 | field_2 | ... | field_n`, hex-encoded.
///
/// No per-process seeding: the same fields hash the same way on every run.
pub fn content_hash<S: AsRef<str>>(fields: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            hasher.update(FIELD_SEPARATOR.as_bytes());
        }
        hasher.update(field.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Build a key → hash index from `records`, hashing `chunk_size` at a time.
///
/// Two records with the same key and the same hash are the same record
/// listed twice and collapse into one entry. The same key with different
/// hashes fails with [`CardsyncError::DuplicateKey`].
pub fn build_hash_index<R: Record>(records: &[R], chunk_size: usize) -> Result<HashIndex> {
    let chunk_size = chunk_size.max(1);
    let mut index = HashIndex::new();

    for (batch, chunk) in records.chunks(chunk_size).enumerate() {
        tracing::debug!(batch, size = chunk.len(), table = R::TABLE, "hashing batch");

        for record in chunk {
            let hash = record.content_hash();
            match index.get(record.key()) {
                Some(existing) if *existing != hash => {
                    return Err(CardsyncError::DuplicateKey {
                        key: record.key().to_string(),
                    });
                }
                Some(_) => {
                    tracing::debug!(key = record.key(), "identical duplicate collapsed");
                }
                None => {
                    index.insert(record.key().to_string(), hash);
                }
            }
        }
    }

    Ok(index)
}
