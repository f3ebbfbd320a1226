//! Persistent record storage.
//!
//! [`RecordStore`] is the interface the cache resolver and the
//! reconciliation engine consume. Two backends are provided:
//!
//! - [`MemoryStore`] keeps tables in process memory
//! - [`JsonStore`] keeps one JSON document per table on disk
//!
//! Every upsert is atomic per row: readers see either the previous row or
//! the new one, never a partial write.

pub mod json;
pub mod memory;
pub mod table;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use table::Tables;

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::Attachment;
use crate::error::Result;
use crate::reconcile::HashIndex;
use crate::record::Record;
use crate::search::SearchQuery;

/// Key-based lookup, upsert, and bulk enumeration of records.
pub trait RecordStore<R: Record>: Send + Sync {
    /// First stored record satisfying the query, with attachments.
    fn get_by_filters(&self, query: &SearchQuery) -> Result<Option<R>>;

    /// Record by natural key, with attachments.
    fn get(&self, key: &str) -> Result<Option<R>>;

    /// Insert or update a record row and every attachment it carries.
    fn upsert(&self, record: &R) -> Result<()>;

    /// Insert or update one attachment of an existing record.
    fn upsert_attachment(&self, record_key: &str, kind: &str, attachment: &Attachment) -> Result<()>;

    /// Remove a record and its attachments. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// All records in key order.
    fn list(&self) -> Result<Vec<R>>;

    /// Remove every record, returning how many were removed.
    fn clear(&self) -> Result<usize>;

    /// Key → content hash for every stored record.
    fn list_hash_index(&self) -> Result<HashIndex> {
        Ok(self
            .list()?
            .iter()
            .map(|r| (r.key().to_string(), r.content_hash()))
            .collect())
    }
}

impl<R: Record, S: RecordStore<R> + ?Sized> RecordStore<R> for Arc<S> {
    fn get_by_filters(&self, query: &SearchQuery) -> Result<Option<R>> {
        (**self).get_by_filters(query)
    }

    fn get(&self, key: &str) -> Result<Option<R>> {
        (**self).get(key)
    }

    fn upsert(&self, record: &R) -> Result<()> {
        (**self).upsert(record)
    }

    fn upsert_attachment(&self, record_key: &str, kind: &str, attachment: &Attachment) -> Result<()> {
        (**self).upsert_attachment(record_key, kind, attachment)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn list(&self) -> Result<Vec<R>> {
        (**self).list()
    }

    fn clear(&self) -> Result<usize> {
        (**self).clear()
    }

    fn list_hash_index(&self) -> Result<HashIndex> {
        (**self).list_hash_index()
    }
}

/// Get the default store directory.
pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardsync")
}
