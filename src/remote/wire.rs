//! Wire payloads of the remote card API and their mapping to records.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::cache::Attachment;
use crate::record::{Card, Record, Symbol, IMAGE_KINDS, SVG_KIND};
use crate::search::{SchemeKind, SearchQuery};

/// A request against the remote API: path segments plus query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub segments: Vec<String>,
    pub params: Vec<(String, String)>,
}

impl ResourceRequest {
    fn path<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            params: Vec::new(),
        }
    }

    fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((name.to_string(), value.into()));
        self
    }
}

/// A record type the HTTP source knows how to fetch.
pub trait RemoteResource: Record {
    /// Wire representation of one record.
    type Payload: DeserializeOwned;

    /// Request for a single-record lookup. `None` means the API has no
    /// direct endpoint and the source scans [`RemoteResource::list_request`].
    fn lookup_request(query: &SearchQuery) -> Option<ResourceRequest>;

    /// Request for the full listing, if the API offers one.
    fn list_request() -> Option<ResourceRequest>;

    fn from_payload(payload: Self::Payload) -> Self;
}

/// Paginated list envelope.
#[derive(Debug, Deserialize)]
pub struct ListPayload<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<String>,
}

/// Card as served by the API.
#[derive(Debug, Deserialize)]
pub struct CardPayload {
    pub id: String,
    #[serde(default)]
    pub oracle_id: Option<String>,
    pub name: String,
    pub set: String,
    #[serde(default)]
    pub set_name: String,
    pub collector_number: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub rarity: String,
    #[serde(default)]
    pub multiverse_ids: Vec<u64>,
    #[serde(default)]
    pub image_uris: BTreeMap<String, String>,
    /// Multi-faced cards carry images per face instead of at the top level.
    #[serde(default)]
    pub card_faces: Vec<CardFacePayload>,
}

#[derive(Debug, Deserialize)]
pub struct CardFacePayload {
    #[serde(default)]
    pub image_uris: BTreeMap<String, String>,
}

/// Symbol as served by the API.
#[derive(Debug, Deserialize)]
pub struct SymbolPayload {
    pub symbol: String,
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub svg_uri: Option<String>,
    #[serde(default)]
    pub loose_variant: Option<String>,
    #[serde(default, alias = "cmc")]
    pub mana_value: Option<f64>,
    #[serde(default)]
    pub represents_mana: bool,
    #[serde(default)]
    pub appears_in_mana_costs: bool,
    #[serde(default)]
    pub funny: bool,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl RemoteResource for Card {
    type Payload = CardPayload;

    fn lookup_request(query: &SearchQuery) -> Option<ResourceRequest> {
        let request = match query.kind {
            SchemeKind::Id => ResourceRequest::path(["cards", query.get("id")?]),
            SchemeKind::Multiverse => {
                ResourceRequest::path(["cards", "multiverse", query.get("multiverse_id")?])
            }
            SchemeKind::Collector => {
                let mut segments = vec![
                    "cards".to_string(),
                    query.get("set")?.to_lowercase(),
                    query.get("collector_number")?.to_string(),
                ];
                if let Some(lang) = query.get("lang") {
                    segments.push(lang.to_lowercase());
                }
                ResourceRequest::path(segments)
            }
            SchemeKind::Name => {
                let request = ResourceRequest::path(["cards", "named"])
                    .param("fuzzy", query.get("name")?);
                match query.get("set") {
                    Some(set) => request.param("set", set.to_lowercase()),
                    None => request,
                }
            }
        };
        Some(request)
    }

    fn list_request() -> Option<ResourceRequest> {
        None
    }

    fn from_payload(payload: CardPayload) -> Self {
        // Top-level images win; otherwise use the front face.
        let images = if payload.image_uris.is_empty() {
            payload
                .card_faces
                .into_iter()
                .map(|face| face.image_uris)
                .find(|uris| !uris.is_empty())
                .unwrap_or_default()
        } else {
            payload.image_uris
        };

        let attachments = images
            .into_iter()
            .filter(|(kind, _)| IMAGE_KINDS.contains(&kind.as_str()))
            .map(|(kind, uri)| (kind, Attachment::new(uri)))
            .collect();

        Card {
            id: payload.id,
            oracle_id: payload.oracle_id,
            name: payload.name,
            set: payload.set,
            set_name: payload.set_name,
            collector_number: payload.collector_number,
            lang: payload.lang.unwrap_or_else(|| crate::record::card::DEFAULT_LANG.to_string()),
            mana_cost: payload.mana_cost,
            type_line: payload.type_line,
            oracle_text: payload.oracle_text,
            rarity: payload.rarity,
            multiverse_ids: payload.multiverse_ids,
            attachments,
        }
    }
}

impl RemoteResource for Symbol {
    type Payload = SymbolPayload;

    fn lookup_request(_query: &SearchQuery) -> Option<ResourceRequest> {
        None
    }

    fn list_request() -> Option<ResourceRequest> {
        Some(ResourceRequest::path(["symbology"]))
    }

    fn from_payload(payload: SymbolPayload) -> Self {
        let mut symbol = Symbol::new(payload.symbol, payload.english);
        if let Some(uri) = &payload.svg_uri {
            symbol
                .attachments
                .insert(SVG_KIND.to_string(), Attachment::new(uri.clone()));
        }
        symbol.svg_uri = payload.svg_uri;
        symbol.loose_variant = payload.loose_variant;
        symbol.mana_value = payload.mana_value;
        symbol.represents_mana = payload.represents_mana;
        symbol.appears_in_mana_costs = payload.appears_in_mana_costs;
        symbol.funny = payload.funny;
        symbol.colors = payload.colors;
        symbol
    }
}
