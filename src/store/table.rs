//! In-memory table pair shared by the store backends.
//!
//! Mirrors the persisted schema: a primary table keyed by natural id and a
//! dependent attachment table keyed by `(record_key, kind)`. Record rows are
//! kept without their attachments; reads join the two back together.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cache::Attachment;
use crate::error::{CardsyncError, Result};
use crate::record::{Attachments, Record};
use crate::search::{SchemeKind, SearchQuery};

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Primary and attachment tables for one record type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "R: Serialize", deserialize = "R: DeserializeOwned"))]
pub struct Tables<R> {
    pub version: u32,
    pub records: BTreeMap<String, R>,
    #[serde(default)]
    pub attachments: BTreeMap<String, Attachments>,
}

impl<R> Default for Tables<R> {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            records: BTreeMap::new(),
            attachments: BTreeMap::new(),
        }
    }
}

impl<R: Record> Tables<R> {
    /// Get a record by key with its attachments joined in.
    pub fn get(&self, key: &str) -> Option<R> {
        self.records.get(key).map(|row| self.join(row))
    }

    /// First record satisfying the query.
    pub fn find(&self, query: &SearchQuery) -> Option<R> {
        // Id queries carry the natural key as their only value.
        if query.kind == SchemeKind::Id {
            let direct = query
                .fields
                .values()
                .next()
                .and_then(|key| self.records.get(key))
                .filter(|row| row.matches(query));
            if let Some(row) = direct {
                return Some(self.join(row));
            }
        }

        self.records
            .values()
            .find(|row| row.matches(query))
            .map(|row| self.join(row))
    }

    /// Insert or replace the record row and upsert each attachment it carries.
    ///
    /// Attachment kinds the record does not carry are left in place.
    pub fn upsert(&mut self, record: &R) {
        let mut row = record.clone();
        let attachments = std::mem::take(row.attachments_mut());
        let key = row.key().to_string();

        self.records.insert(key.clone(), row);
        let slot = self.attachments.entry(key).or_default();
        slot.extend(attachments);
    }

    /// Insert or replace one attachment. The owning record must exist.
    pub fn upsert_attachment(&mut self, record_key: &str, kind: &str, attachment: &Attachment) -> Result<()> {
        if !self.records.contains_key(record_key) {
            return Err(CardsyncError::storage(format!(
                "cannot attach '{}' to missing record '{}' in {}",
                kind,
                record_key,
                R::TABLE
            )));
        }

        self.attachments
            .entry(record_key.to_string())
            .or_default()
            .insert(kind.to_string(), attachment.clone());
        Ok(())
    }

    /// Remove a record and, by cascade, its attachments.
    pub fn remove(&mut self, key: &str) -> bool {
        self.attachments.remove(key);
        self.records.remove(key).is_some()
    }

    /// All records, joined, in key order.
    pub fn list(&self) -> Vec<R> {
        self.records.values().map(|row| self.join(row)).collect()
    }

    /// Drop everything, returning the number of records removed.
    pub fn clear(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        self.attachments.clear();
        count
    }

    fn join(&self, row: &R) -> R {
        let mut record = row.clone();
        if let Some(attachments) = self.attachments.get(row.key()) {
            record.attachments_mut().extend(
                attachments
                    .iter()
                    .map(|(kind, a)| (kind.clone(), a.clone())),
            );
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Card;

    fn card_with(kind: &str, uri: &str) -> Card {
        let mut card = Card::new("c1", "Opt", "xln", "65");
        card.attachments.insert(kind.into(), Attachment::new(uri));
        card
    }

    #[test]
    fn upsert_splits_rows_and_attachments() {
        let mut tables = Tables::<Card>::default();
        tables.upsert(&card_with("normal", "n.jpg"));

        assert!(tables.records["c1"].attachments.is_empty());
        assert_eq!(tables.attachments["c1"]["normal"].uri, "n.jpg");
        assert_eq!(tables.get("c1").unwrap().attachments.len(), 1);
    }

    #[test]
    fn upsert_keeps_other_attachment_kinds() {
        let mut tables = Tables::<Card>::default();
        tables.upsert(&card_with("normal", "n.jpg"));
        tables.upsert(&card_with("large", "l.jpg"));

        let card = tables.get("c1").unwrap();
        assert_eq!(card.attachments.len(), 2);
    }

    #[test]
    fn attachment_requires_record() {
        let mut tables = Tables::<Card>::default();
        let err = tables
            .upsert_attachment("ghost", "normal", &Attachment::new("x"))
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn attachment_is_unique_per_kind() {
        let mut tables = Tables::<Card>::default();
        tables.upsert(&Card::new("c1", "Opt", "xln", "65"));
        tables
            .upsert_attachment("c1", "normal", &Attachment::new("old"))
            .unwrap();
        tables
            .upsert_attachment("c1", "normal", &Attachment::new("new"))
            .unwrap();

        let card = tables.get("c1").unwrap();
        assert_eq!(card.attachments.len(), 1);
        assert_eq!(card.attachments["normal"].uri, "new");
    }

    #[test]
    fn remove_cascades() {
        let mut tables = Tables::<Card>::default();
        tables.upsert(&card_with("normal", "n.jpg"));

        assert!(tables.remove("c1"));
        assert!(tables.attachments.is_empty());
        assert!(!tables.remove("c1"));
    }

    #[test]
    fn find_by_name() {
        let mut tables = Tables::<Card>::default();
        tables.upsert(&card_with("normal", "n.jpg"));

        let q = SearchQuery::new(SchemeKind::Name, [("name", "OPT")]);
        assert_eq!(tables.find(&q).unwrap().attachments.len(), 1);
    }
}
