//! Card records.

use serde::{Deserialize, Serialize};

use super::{loose_eq, Attachments, Record};
use crate::search::{SchemeKind, SchemeSet, SearchQuery};

/// Image attachment kinds a card may carry.
pub const IMAGE_KINDS: &[&str] = &["small", "normal", "large", "png", "art_crop", "border_crop"];

/// Language assumed when a collector lookup omits one.
pub const DEFAULT_LANG: &str = "en";

/// A single card printing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Printing id (natural key).
    pub id: String,
    #[serde(default)]
    pub oracle_id: Option<String>,
    pub name: String,
    /// Set code, e.g. `neo`.
    pub set: String,
    #[serde(default)]
    pub set_name: String,
    pub collector_number: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub rarity: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multiverse_ids: Vec<u64>,
    /// Image URIs by kind (see [`IMAGE_KINDS`]).
    #[serde(default, skip_serializing_if = "Attachments::is_empty")]
    pub attachments: Attachments,
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

impl Card {
    /// Create a card with the fields needed to identify it.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        set: impl Into<String>,
        collector_number: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            oracle_id: None,
            name: name.into(),
            set: set.into(),
            set_name: String::new(),
            collector_number: collector_number.into(),
            lang: default_lang(),
            mana_cost: None,
            type_line: None,
            oracle_text: None,
            rarity: String::new(),
            multiverse_ids: Vec::new(),
            attachments: Attachments::new(),
        }
    }

    /// Faces of a multi-faced card name ("Front // Back"), or the name itself.
    pub fn face_names(&self) -> impl Iterator<Item = &str> {
        self.name.split(" // ")
    }

    fn name_matches(&self, wanted: &str) -> bool {
        loose_eq(&self.name, wanted) || self.face_names().any(|face| loose_eq(face, wanted))
    }
}

impl Record for Card {
    const TABLE: &'static str = "cards";

    fn key(&self) -> &str {
        &self.id
    }

    /// `id | oracle_id | name | set | collector_number | lang | mana_cost |
    /// type_line | oracle_text | rarity`
    fn content_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.oracle_id.clone().unwrap_or_default(),
            self.name.clone(),
            self.set.clone(),
            self.collector_number.clone(),
            self.lang.clone(),
            self.mana_cost.clone().unwrap_or_default(),
            self.type_line.clone().unwrap_or_default(),
            self.oracle_text.clone().unwrap_or_default(),
            self.rarity.clone(),
        ]
    }

    fn matches(&self, query: &SearchQuery) -> bool {
        match query.kind {
            SchemeKind::Id => query.get("id") == Some(self.id.as_str()),
            SchemeKind::Multiverse => query
                .get("multiverse_id")
                .and_then(|v| v.parse::<u64>().ok())
                .is_some_and(|id| self.multiverse_ids.contains(&id)),
            SchemeKind::Collector => {
                let set_ok = query.get("set").is_some_and(|s| loose_eq(s, &self.set));
                let number_ok = query
                    .get("collector_number")
                    .is_some_and(|n| n.trim() == self.collector_number);
                let lang = query.get("lang").unwrap_or(DEFAULT_LANG);
                set_ok && number_ok && loose_eq(lang, &self.lang)
            }
            SchemeKind::Name => {
                let name_ok = query.get("name").is_some_and(|n| self.name_matches(n));
                let set_ok = query.get("set").is_none_or(|s| loose_eq(s, &self.set));
                name_ok && set_ok
            }
        }
    }

    fn schemes() -> SchemeSet {
        SchemeSet::cards()
    }

    fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Attachment;

    fn opt() -> Card {
        let mut card = Card::new("c-opt", "Opt", "xln", "65");
        card.multiverse_ids = vec![435173];
        card
    }

    #[test]
    fn matches_by_id() {
        let q = SearchQuery::new(SchemeKind::Id, [("id", "c-opt")]);
        assert!(opt().matches(&q));

        let q = SearchQuery::new(SchemeKind::Id, [("id", "other")]);
        assert!(!opt().matches(&q));
    }

    #[test]
    fn matches_by_multiverse_id() {
        let q = SearchQuery::new(SchemeKind::Multiverse, [("multiverse_id", "435173")]);
        assert!(opt().matches(&q));

        let q = SearchQuery::new(SchemeKind::Multiverse, [("multiverse_id", "nope")]);
        assert!(!opt().matches(&q));
    }

    #[test]
    fn collector_lookup_defaults_to_english() {
        let q = SearchQuery::new(
            SchemeKind::Collector,
            [("set", "XLN"), ("collector_number", "65")],
        );
        assert!(opt().matches(&q));

        let mut japanese = opt();
        japanese.lang = "ja".into();
        assert!(!japanese.matches(&q));

        let q = SearchQuery::new(
            SchemeKind::Collector,
            [("set", "xln"), ("collector_number", "65"), ("lang", "ja")],
        );
        assert!(japanese.matches(&q));
    }

    #[test]
    fn name_lookup_is_case_insensitive_and_face_aware() {
        let q = SearchQuery::new(SchemeKind::Name, [("name", "opt")]);
        assert!(opt().matches(&q));

        let dfc = Card::new("c-dfc", "Delver of Secrets // Insectile Aberration", "isd", "51");
        let q = SearchQuery::new(SchemeKind::Name, [("name", "insectile aberration")]);
        assert!(dfc.matches(&q));
    }

    #[test]
    fn name_lookup_respects_optional_set() {
        let q = SearchQuery::new(SchemeKind::Name, [("name", "Opt"), ("set", "dom")]);
        assert!(!opt().matches(&q));
    }

    #[test]
    fn hash_ignores_attachments() {
        let plain = opt();
        let mut with_image = opt();
        with_image
            .attachments
            .insert("normal".into(), Attachment::new("https://img/opt.jpg").stamped(chrono::Utc::now(), 60));

        assert_eq!(plain.content_hash(), with_image.content_hash());
    }

    #[test]
    fn hash_tracks_oracle_text() {
        let before = opt();
        let mut after = opt();
        after.oracle_text = Some("Scry 1. Draw a card.".into());

        assert_ne!(before.content_hash(), after.content_hash());
    }

    #[test]
    fn deserializes_with_defaults() {
        let card: Card = serde_json::from_str(
            r#"{"id":"x","name":"Opt","set":"xln","collector_number":"65"}"#,
        )
        .unwrap();
        assert_eq!(card.lang, "en");
        assert!(card.attachments.is_empty());
    }
}
