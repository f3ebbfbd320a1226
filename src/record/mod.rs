//! Reference records: cards and symbols.
//!
//! Every record has a stable natural key, an ordered list of
//! comparison-relevant fields (hashed by [`crate::reconcile::content_hash`]),
//! and a map of [`Attachment`]s keyed by kind.

pub mod card;
pub mod symbol;

pub use card::{Card, IMAGE_KINDS};
pub use symbol::{Symbol, SVG_KIND};

pub use crate::cache::Attachment;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::search::{SchemeSet, SearchQuery};

/// Attachments on a record, keyed by kind.
pub type Attachments = BTreeMap<String, Attachment>;

/// A cacheable domain entity with a stable natural key.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table name used by stores.
    const TABLE: &'static str;

    /// The natural key. Same logical entity ⇒ same key across fetches.
    fn key(&self) -> &str;

    /// Comparison-relevant fields in their documented hash order.
    fn content_fields(&self) -> Vec<String>;

    /// Deterministic digest of [`Record::content_fields`].
    fn content_hash(&self) -> String {
        crate::reconcile::content_hash(&self.content_fields())
    }

    /// Whether this record satisfies a normalized lookup.
    fn matches(&self, query: &SearchQuery) -> bool;

    /// Lookup schemes for this record type, highest priority first.
    fn schemes() -> SchemeSet;

    fn attachments(&self) -> &Attachments;

    fn attachments_mut(&mut self) -> &mut Attachments;

    /// Get one attachment by kind.
    fn attachment(&self, kind: &str) -> Option<&Attachment> {
        self.attachments().get(kind)
    }
}

/// Case-insensitive, whitespace-trimmed equality.
pub(crate) fn loose_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
