//! Search schemes and filter normalization.
//!
//! A lookup arrives as a loose map of filter fields. Each record type
//! declares an ordered [`SchemeSet`]; the first scheme whose required fields
//! are all present (and non-blank) wins, and the filters are narrowed to a
//! [`SearchQuery`] carrying only that scheme's fields.
//!
//! # Example
//!
//! ```
//! use cardsync::search::{Filters, SchemeKind, SchemeSet};
//!
//! let mut filters = Filters::new();
//! filters.insert("id".into(), "X".into());
//! filters.insert("name".into(), "Y".into());
//! filters.insert("set".into(), "Z".into());
//!
//! let query = SchemeSet::cards().select(&filters).unwrap();
//! assert_eq!(query.kind, SchemeKind::Id);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{CardsyncError, Result};

/// Raw filter fields supplied by a caller.
pub type Filters = BTreeMap<String, String>;

/// Identifies a search scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    /// Exact natural-key lookup.
    Id,
    /// Lookup by an external numeric catalog id.
    Multiverse,
    /// Set code plus collector number, optionally a language.
    Collector,
    /// Name lookup, the most permissive.
    Name,
}

impl SchemeKind {
    /// Short lowercase name used in logs and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Multiverse => "multiverse",
            Self::Collector => "collector",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition of one scheme: which fields it needs and which it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeDef {
    pub kind: SchemeKind,
    pub required: Vec<String>,
    pub optional: Vec<String>,
}

impl SchemeDef {
    /// Create a definition from field names.
    pub fn new(kind: SchemeKind, required: &[&str], optional: &[&str]) -> Self {
        Self {
            kind,
            required: required.iter().map(|s| s.to_string()).collect(),
            optional: optional.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// A filter set satisfies the scheme only if every required field is a
    /// non-empty string.
    pub fn is_satisfied_by(&self, filters: &Filters) -> bool {
        self.required
            .iter()
            .all(|field| filter_value(filters, field).is_some())
    }
}

/// Ordered list of schemes; earlier entries have higher priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeSet {
    defs: Vec<SchemeDef>,
}

impl SchemeSet {
    /// Build a scheme set, rejecting empty sets, duplicated kinds, and
    /// schemes without required fields.
    pub fn new(defs: Vec<SchemeDef>) -> Result<Self> {
        if defs.is_empty() {
            return Err(CardsyncError::ConfigValidationError {
                message: "search scheme set is empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for def in &defs {
            if !seen.insert(def.kind) {
                return Err(CardsyncError::ConfigValidationError {
                    message: format!("search scheme '{}' is defined twice", def.kind),
                });
            }
            if def.required.is_empty() || def.required.iter().any(|f| f.trim().is_empty()) {
                return Err(CardsyncError::ConfigValidationError {
                    message: format!("search scheme '{}' has no usable required fields", def.kind),
                });
            }
        }

        Ok(Self { defs })
    }

    /// Card lookup schemes.
    pub fn cards() -> Self {
        Self {
            defs: vec![
                SchemeDef::new(SchemeKind::Id, &["id"], &[]),
                SchemeDef::new(SchemeKind::Multiverse, &["multiverse_id"], &[]),
                SchemeDef::new(SchemeKind::Collector, &["set", "collector_number"], &["lang"]),
                SchemeDef::new(SchemeKind::Name, &["name"], &["set"]),
            ],
        }
    }

    /// Symbol lookup schemes.
    pub fn symbols() -> Self {
        Self {
            defs: vec![
                SchemeDef::new(SchemeKind::Id, &["symbol"], &[]),
                SchemeDef::new(SchemeKind::Name, &["english"], &[]),
            ],
        }
    }

    /// Schemes in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemeDef> {
        self.defs.iter()
    }

    /// Pick the highest-priority scheme the filters satisfy.
    pub fn select(&self, filters: &Filters) -> Result<SearchQuery> {
        let def = self
            .defs
            .iter()
            .find(|def| def.is_satisfied_by(filters))
            .ok_or_else(|| CardsyncError::InvalidFilter {
                filters: describe_filters(filters),
            })?;

        let fields = def
            .required
            .iter()
            .chain(def.optional.iter())
            .filter_map(|field| {
                filter_value(filters, field).map(|value| (field.clone(), value.to_string()))
            })
            .collect();

        Ok(SearchQuery {
            kind: def.kind,
            fields,
        })
    }
}

/// A normalized lookup: one scheme and only its fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    pub kind: SchemeKind,
    pub fields: BTreeMap<String, String>,
}

impl SearchQuery {
    /// Build a query directly, bypassing scheme selection.
    pub fn new<K, V>(kind: SchemeKind, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get a field's value.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Stable string identifying this query, used for in-flight de-duplication.
    pub fn cache_key(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.to_lowercase()))
            .collect();
        format!("{}:{}", self.kind, fields.join("&"))
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{}({})", self.kind, fields.join(", "))
    }
}

fn filter_value<'a>(filters: &'a Filters, field: &str) -> Option<&'a str> {
    filters
        .get(field)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn describe_filters(filters: &Filters) -> String {
    if filters.is_empty() {
        return "(none)".to_string();
    }
    filters
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
