//! In-process store.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{RecordStore, Tables};
use crate::cache::Attachment;
use crate::error::{CardsyncError, Result};
use crate::record::Record;
use crate::search::SearchQuery;

/// Store backed by process memory. Used by tests and embedders that bring
/// their own persistence.
#[derive(Debug)]
pub struct MemoryStore<R> {
    tables: RwLock<Tables<R>>,
}

impl<R: Record> MemoryStore<R> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a store pre-populated with records.
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let mut tables = Tables::default();
        for record in records {
            tables.upsert(&record);
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables<R>>> {
        self.tables
            .read()
            .map_err(|_| CardsyncError::storage(format!("{} table lock poisoned", R::TABLE)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables<R>>> {
        self.tables
            .write()
            .map_err(|_| CardsyncError::storage(format!("{} table lock poisoned", R::TABLE)))
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> for MemoryStore<R> {
    fn get_by_filters(&self, query: &SearchQuery) -> Result<Option<R>> {
        Ok(self.read()?.find(query))
    }

    fn get(&self, key: &str) -> Result<Option<R>> {
        Ok(self.read()?.get(key))
    }

    fn upsert(&self, record: &R) -> Result<()> {
        self.write()?.upsert(record);
        Ok(())
    }

    fn upsert_attachment(&self, record_key: &str, kind: &str, attachment: &Attachment) -> Result<()> {
        self.write()?.upsert_attachment(record_key, kind, attachment)
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.write()?.remove(key))
    }

    fn list(&self) -> Result<Vec<R>> {
        Ok(self.read()?.list())
    }

    fn clear(&self) -> Result<usize> {
        Ok(self.write()?.clear())
    }
}
