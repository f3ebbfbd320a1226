//! File-backed store: one JSON document per table.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::table::SCHEMA_VERSION;
use super::{RecordStore, Tables};
use crate::cache::Attachment;
use crate::error::{CardsyncError, Result};
use crate::record::Record;
use crate::search::SearchQuery;

/// Distinguishes temp files of writers within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Store persisting each table to `<root>/<table>.json`.
///
/// Every operation re-reads the document, so reads observe the latest
/// committed write. Mutations hold an in-process lock across
/// load-modify-save and commit by renaming a writer-unique temp file, so a
/// reader never sees a torn document. Nothing locks across processes: two
/// processes mutating one table concurrently may each commit a whole
/// document, and the later rename wins.
pub struct JsonStore<R> {
    root: PathBuf,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> JsonStore<R> {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// Get the store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of this record type's table document.
    pub fn table_path(&self) -> PathBuf {
        self.root.join(format!("{}.json", R::TABLE))
    }

    /// Size of the table document in bytes, zero if absent.
    pub fn size_bytes(&self) -> Result<u64> {
        match fs::metadata(self.table_path()) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(CardsyncError::storage_with(
                format!("cannot stat {}", self.table_path().display()),
                e,
            )),
        }
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| CardsyncError::storage(format!("{} store lock poisoned", R::TABLE)))
    }

    fn load(&self) -> Result<Tables<R>> {
        let path = self.table_path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Tables::default()),
            Err(e) => {
                return Err(CardsyncError::storage_with(
                    format!("cannot read {}", path.display()),
                    e,
                ))
            }
        };

        let tables: Tables<R> = serde_json::from_str(&content).map_err(|e| {
            CardsyncError::storage_with(format!("corrupt table document {}", path.display()), e)
        })?;

        if tables.version > SCHEMA_VERSION {
            return Err(CardsyncError::storage(format!(
                "{} was written by a newer schema (version {})",
                path.display(),
                tables.version
            )));
        }

        Ok(tables)
    }

    /// Save using write-to-temp-then-rename so a crash never leaves a
    /// partially written document.
    fn save(&self, tables: &Tables<R>) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            CardsyncError::storage_with(format!("cannot create {}", self.root.display()), e)
        })?;

        let path = self.table_path();
        let content = serde_json::to_string_pretty(tables)
            .map_err(|e| CardsyncError::storage_with(format!("cannot encode {}", R::TABLE), e))?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, &content)
            .and_then(|_| fs::rename(&temp_path, &path))
            .map_err(|e| {
                fs::remove_file(&temp_path).ok();
                CardsyncError::storage_with(format!("cannot write {}", path.display()), e)
            })
    }

    /// Temp file unique to this process and write.
    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.tmp", R::TABLE, std::process::id(), seq))
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut Tables<R>) -> Result<T>) -> Result<T> {
        let _held = self.guard()?;
        let mut tables = self.load()?;
        let out = f(&mut tables)?;
        self.save(&tables)?;
        Ok(out)
    }
}

impl<R: Record> RecordStore<R> for JsonStore<R> {
    fn get_by_filters(&self, query: &SearchQuery) -> Result<Option<R>> {
        Ok(self.load()?.find(query))
    }

    fn get(&self, key: &str) -> Result<Option<R>> {
        Ok(self.load()?.get(key))
    }

    fn upsert(&self, record: &R) -> Result<()> {
        self.mutate(|tables| {
            tables.upsert(record);
            Ok(())
        })
    }

    fn upsert_attachment(&self, record_key: &str, kind: &str, attachment: &Attachment) -> Result<()> {
        self.mutate(|tables| tables.upsert_attachment(record_key, kind, attachment))
    }

    fn remove(&self, key: &str) -> Result<bool> {
        self.mutate(|tables| Ok(tables.remove(key)))
    }

    fn list(&self) -> Result<Vec<R>> {
        Ok(self.load()?.list())
    }

    fn clear(&self) -> Result<usize> {
        self.mutate(|tables| Ok(tables.clear()))
    }
}
