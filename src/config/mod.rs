//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layer merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use cardsync::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".cardsync");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "cache:\n  attachment_ttl: 1d\n").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! let components = config.validate().unwrap();
//! assert_eq!(components.resolver.attachment_ttl, 86_400);
//! ```
//!
//! # Configuration File Locations
//!
//! Layers are merged in this order:
//! 1. Project config (`.cardsync/config.yml`)
//! 2. Local overrides (`.cardsync/config.local.yml`)
//!
//! `--config PATH` loads a single file instead.

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use loader::{load_config, load_config_file, load_merged_config, parse_config, ConfigPaths};
pub use merger::{deep_merge, merge_configs};
pub use schema::{
    CacheSettings, CardsyncConfig, ReconcileSettings, RemoteSettings, StoreSettings,
    WriteThroughSetting,
};
pub use validator::{validate, validate_config, ComponentConfigs, ValidationError};
