//! Reconciliation of a local mirror against the remote source.
//!
//! [`diff`] compares the remote record set with the store's hash index and
//! partitions every key into exactly one of add, update, or delete. The
//! diff never touches the store; [`apply_patch`] is the separate step that
//! commits a patch.
//!
//! ```
//! use cardsync::reconcile::{diff, HashIndex};
//! use cardsync::record::Symbol;
//!
//! let remote = vec![Symbol::new("{T}", "tap this permanent")];
//! let local = HashIndex::from([("{Q}".to_string(), "stale".to_string())]);
//!
//! let patch = diff(&remote, &local, 100).unwrap();
//! assert_eq!(patch.add, vec!["{T}"]);
//! assert_eq!(patch.delete, vec!["{Q}"]);
//! ```

pub mod apply;
pub mod hash;

pub use apply::{apply_patch, ApplySummary};
pub use hash::{build_hash_index, content_hash, HashIndex, DEFAULT_CHUNK_SIZE};

use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;

use crate::error::{CardsyncError, Result};
use crate::record::Record;
use crate::remote::RemoteSource;
use crate::store::RecordStore;

/// Keys to add, update, and delete. Each list is sorted and the three are
/// disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub add: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
}

impl Patch {
    /// True when local and remote already agree.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// Total number of keys touched.
    pub fn len(&self) -> usize {
        self.add.len() + self.update.len() + self.delete.len()
    }

    /// One-line description, e.g. "3 to add, 1 to update, 0 to delete".
    pub fn summary(&self) -> String {
        format!(
            "{} to add, {} to update, {} to delete",
            self.add.len(),
            self.update.len(),
            self.delete.len()
        )
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Partition the union of remote and local keys.
///
/// A key only in `remote` is an add, one only in `local` is a delete, and
/// one in both with differing hashes is an update. Keys whose hashes agree
/// appear nowhere.
///
/// # Errors
///
/// [`CardsyncError::DuplicateKey`] if `remote` lists one key with two
/// different contents.
pub fn diff<R: Record>(remote: &[R], local: &HashIndex, chunk_size: usize) -> Result<Patch> {
    let remote_index = build_hash_index(remote, chunk_size)?;
    let mut patch = Patch::default();

    for (key, hash) in &remote_index {
        match local.get(key) {
            None => patch.add.push(key.clone()),
            Some(local_hash) if local_hash != hash => patch.update.push(key.clone()),
            Some(_) => {}
        }
    }

    patch.delete = local
        .keys()
        .filter(|key| !remote_index.contains_key(*key))
        .cloned()
        .collect();

    tracing::debug!(
        table = R::TABLE,
        remote = remote_index.len(),
        local = local.len(),
        add = patch.add.len(),
        update = patch.update.len(),
        delete = patch.delete.len(),
        "diff computed"
    );

    Ok(patch)
}

/// Reconciler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Records hashed per batch.
    pub chunk_size: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ReconcileConfig {
    /// Create a config, rejecting a zero chunk size.
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(CardsyncError::ConfigValidationError {
                message: "reconcile.chunk_size must be at least 1".to_string(),
            });
        }
        Ok(Self { chunk_size })
    }
}

/// A patch together with the remote snapshot it was computed from.
#[derive(Debug, Clone)]
pub struct PatchPlan<R> {
    pub patch: Patch,
    pub remote: Vec<R>,
}

/// Computes and applies patches for one record type.
pub struct Reconciler<R, S, F> {
    store: S,
    remote: F,
    config: ReconcileConfig,
    _record: PhantomData<fn() -> R>,
}

impl<R, S, F> Reconciler<R, S, F>
where
    R: Record,
    S: RecordStore<R>,
    F: RemoteSource<R>,
{
    pub fn new(store: S, remote: F, config: ReconcileConfig) -> Self {
        Self {
            store,
            remote,
            config,
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch the remote set and diff it against the store. Read-only.
    pub fn compute_update_patch(&self) -> Result<PatchPlan<R>> {
        let remote = self
            .remote
            .list_all()
            .map_err(|source| CardsyncError::Fetch {
                query: format!("all {}", R::TABLE),
                source,
            })?;
        let local = self.store.list_hash_index()?;
        let patch = diff(&remote, &local, self.config.chunk_size)?;
        Ok(PatchPlan { patch, remote })
    }

    /// Commit a previously computed plan.
    pub fn apply_patch(&self, plan: &PatchPlan<R>) -> Result<ApplySummary> {
        apply_patch(&self.store, &plan.patch, &plan.remote)
    }
}
