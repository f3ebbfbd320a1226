//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::merger::merge_configs;
use crate::config::schema::CardsyncConfig;
use crate::error::{CardsyncError, Result};

/// Directory holding project configuration.
pub const CONFIG_DIR: &str = ".cardsync";

/// Configuration files in merge order (later overrides earlier).
///
/// 1. Project config (`.cardsync/config.yml`)
/// 2. Local overrides (`.cardsync/config.local.yml`)
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub project: Option<PathBuf>,
    pub project_local: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files under `root`.
    pub fn discover(root: &Path) -> Self {
        let existing = |name: &str| {
            let path = root.join(CONFIG_DIR).join(name);
            path.is_file().then_some(path)
        };
        Self {
            project: existing("config.yml"),
            project_local: existing("config.local.yml"),
        }
    }

    /// Existing paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        self.project.iter().chain(&self.project_local).collect()
    }
}

/// Parse YAML content into a config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<CardsyncConfig> {
    if content.trim().is_empty() {
        return Ok(CardsyncConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| CardsyncError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CardsyncError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CardsyncError::Io(e)
        }
    })
}

/// Load a single config file.
///
/// # Errors
///
/// `ConfigNotFound` if the file doesn't exist, `ConfigParseError` if the
/// YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<CardsyncConfig> {
    parse_config(&read_config(path)?, path)
}

/// Load a config file as a raw YAML value for merging.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = read_config(path)?;
    if content.trim().is_empty() {
        return Ok(serde_yaml::Value::Mapping(Default::default()));
    }
    serde_yaml::from_str(&content).map_err(|e| CardsyncError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Discover and merge the config layers under `root`. No files at all
/// yields the defaults.
pub fn load_merged_config(root: &Path) -> Result<CardsyncConfig> {
    let paths = ConfigPaths::discover(root);
    let existing = paths.all_existing();
    if existing.is_empty() {
        tracing::debug!(root = %root.display(), "no config files, using defaults");
        return Ok(CardsyncConfig::default());
    }

    let layers = existing
        .into_iter()
        .map(|path| load_config_value(path))
        .collect::<Result<Vec<_>>>()?;

    serde_yaml::from_value(merge_configs(&layers)).map_err(|e| CardsyncError::ConfigParseError {
        path: root.join(CONFIG_DIR).join("config.yml"),
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with an optional explicit path.
///
/// An explicit path is loaded alone and must exist. Otherwise the layers
/// under `root` are discovered and merged.
pub fn load_config(root: &Path, config_override: Option<&Path>) -> Result<CardsyncConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_merged_config(root),
    }
}
