//! Committing a patch to the store.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::Patch;
use crate::error::{CardsyncError, Result};
use crate::record::Record;
use crate::store::RecordStore;

/// Counts of rows written by [`apply_patch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl ApplySummary {
    pub fn total(&self) -> usize {
        self.added + self.updated + self.deleted
    }
}

impl fmt::Display for ApplySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} updated, {} deleted",
            self.added, self.updated, self.deleted
        )
    }
}

/// Apply `patch` using the records of the snapshot it was computed from.
///
/// Adds and updates upsert the full remote record, attachments included.
/// Deletes remove the record and cascade to its attachments. A deleted key
/// that is already gone is not an error.
///
/// # Errors
///
/// [`CardsyncError::Storage`] if an add or update key is absent from
/// `remote`, or if the store fails.
pub fn apply_patch<R, S>(store: &S, patch: &Patch, remote: &[R]) -> Result<ApplySummary>
where
    R: Record,
    S: RecordStore<R> + ?Sized,
{
    let by_key: HashMap<&str, &R> = remote.iter().map(|r| (r.key(), r)).collect();
    let snapshot = |key: &str| {
        by_key.get(key).copied().ok_or_else(|| {
            CardsyncError::storage(format!(
                "{} patch names '{}' but the remote snapshot does not contain it",
                R::TABLE,
                key
            ))
        })
    };

    // Resolve every key before writing anything.
    let adds = patch
        .add
        .iter()
        .map(|key| snapshot(key.as_str()))
        .collect::<Result<Vec<_>>>()?;
    let updates = patch
        .update
        .iter()
        .map(|key| snapshot(key.as_str()))
        .collect::<Result<Vec<_>>>()?;

    let mut summary = ApplySummary::default();

    for record in adds {
        store.upsert(record)?;
        summary.added += 1;
    }
    for record in updates {
        store.upsert(record)?;
        summary.updated += 1;
    }
    for key in &patch.delete {
        if store.remove(key)? {
            summary.deleted += 1;
        } else {
            tracing::debug!(key = key.as_str(), table = R::TABLE, "delete target already gone");
        }
    }

    tracing::info!(table = R::TABLE, %summary, "patch applied");
    Ok(summary)
}
