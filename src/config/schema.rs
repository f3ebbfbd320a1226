//! Configuration schema types.
//!
//! Every section is optional in YAML; omitted keys take the defaults
//! below.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cache::{DEFAULT_ATTACHMENT_TTL, WriteThrough};
use crate::reconcile::DEFAULT_CHUNK_SIZE;
use crate::remote::http::DEFAULT_BASE_URL;

/// Root configuration (`.cardsync/config.yml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardsyncConfig {
    /// Remote API connection
    pub remote: RemoteSettings,

    /// Local store location
    pub store: StoreSettings,

    /// Read-through cache behavior
    pub cache: CacheSettings,

    /// Reconciliation tuning
    pub reconcile: ReconcileSettings,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Base URL of a Scryfall-compatible API
    pub base_url: String,

    /// Request timeout, e.g. "30s" or "2m"
    pub timeout: String,

    /// User-Agent header. Defaults to `cardsync/<version>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: "30s".to_string(),
            user_agent: None,
        }
    }
}

/// Store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Directory holding the table files. Defaults to the platform data
    /// directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Which attachments a fetch writes back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteThroughSetting {
    #[default]
    All,
    Requested,
}

impl From<WriteThroughSetting> for WriteThrough {
    fn from(setting: WriteThroughSetting) -> Self {
        match setting {
            WriteThroughSetting::All => WriteThrough::All,
            WriteThroughSetting::Requested => WriteThrough::RequestedOnly,
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// How long a cached attachment stays fresh, e.g. "7d"
    pub attachment_ttl: String,

    pub write_through: WriteThroughSetting,

    /// De-duplicate concurrent fetches of the same lookup
    pub single_flight: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            attachment_ttl: format!("{}d", DEFAULT_ATTACHMENT_TTL / 86_400),
            write_through: WriteThroughSetting::All,
            single_flight: false,
        }
    }
}

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileSettings {
    /// Records hashed per batch
    pub chunk_size: usize,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: CardsyncConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CardsyncConfig::default());
        assert_eq!(config.cache.attachment_ttl, "7d");
        assert_eq!(config.reconcile.chunk_size, 100);
        assert_eq!(config.remote.base_url, "https://api.scryfall.com");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r#"
cache:
  write_through: requested
remote:
  timeout: 5s
"#;
        let config: CardsyncConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.cache.write_through, WriteThroughSetting::Requested);
        assert_eq!(config.cache.attachment_ttl, "7d");
        assert_eq!(config.remote.timeout, "5s");
        assert_eq!(config.remote.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn write_through_maps_to_resolver_mode() {
        assert_eq!(WriteThrough::from(WriteThroughSetting::All), WriteThrough::All);
        assert_eq!(
            WriteThrough::from(WriteThroughSetting::Requested),
            WriteThrough::RequestedOnly
        );
    }

    #[test]
    fn unknown_write_through_is_rejected() {
        let yaml = "cache:\n  write_through: sometimes\n";
        assert!(serde_yaml::from_str::<CardsyncConfig>(yaml).is_err());
    }
}
