//! Symbol catalog records (mana and rules-text symbols).

use serde::{Deserialize, Serialize};

use super::{loose_eq, Attachments, Record};
use crate::search::{SchemeKind, SchemeSet, SearchQuery};

/// Attachment kind holding a symbol's SVG.
pub const SVG_KIND: &str = "svg";

/// One entry of the symbol catalog, keyed by its textual form (`{T}`, `{W/U}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol: String,
    /// English description, e.g. "tap this permanent".
    pub english: String,
    #[serde(default)]
    pub svg_uri: Option<String>,
    #[serde(default)]
    pub loose_variant: Option<String>,
    #[serde(default)]
    pub mana_value: Option<f64>,
    #[serde(default)]
    pub represents_mana: bool,
    #[serde(default)]
    pub appears_in_mana_costs: bool,
    #[serde(default)]
    pub funny: bool,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Attachments::is_empty")]
    pub attachments: Attachments,
}

impl Symbol {
    pub fn new(symbol: impl Into<String>, english: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            english: english.into(),
            svg_uri: None,
            loose_variant: None,
            mana_value: None,
            represents_mana: false,
            appears_in_mana_costs: false,
            funny: false,
            colors: Vec::new(),
            attachments: Attachments::new(),
        }
    }
}

impl Record for Symbol {
    const TABLE: &'static str = "symbols";

    fn key(&self) -> &str {
        &self.symbol
    }

    /// `symbol | english | svg_uri | loose_variant | mana_value |
    /// represents_mana | appears_in_mana_costs | funny | colors`
    fn content_fields(&self) -> Vec<String> {
        vec![
            self.symbol.clone(),
            self.english.clone(),
            self.svg_uri.clone().unwrap_or_default(),
            self.loose_variant.clone().unwrap_or_default(),
            self.mana_value.map(|v| v.to_string()).unwrap_or_default(),
            self.represents_mana.to_string(),
            self.appears_in_mana_costs.to_string(),
            self.funny.to_string(),
            self.colors.join(","),
        ]
    }

    fn matches(&self, query: &SearchQuery) -> bool {
        match query.kind {
            SchemeKind::Id => query.get("symbol") == Some(self.symbol.as_str()),
            SchemeKind::Name => query.get("english").is_some_and(|e| loose_eq(e, &self.english)),
            SchemeKind::Multiverse | SchemeKind::Collector => false,
        }
    }

    fn schemes() -> SchemeSet {
        SchemeSet::symbols()
    }

    fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }
}
