//! Configuration validation.
//!
//! Checks every setting and, when all pass, builds the typed component
//! configs the resolver, reconciler, and HTTP source consume.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{parse_ttl, ResolverConfig};
use crate::config::schema::CardsyncConfig;
use crate::error::{CardsyncError, Result};
use crate::reconcile::ReconcileConfig;
use crate::remote::HttpSourceConfig;
use crate::store::default_store_dir;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key
    pub field: String,
    pub message: String,
}

/// Component configs built from a valid [`CardsyncConfig`].
#[derive(Debug, Clone)]
pub struct ComponentConfigs {
    pub resolver: ResolverConfig,
    pub reconcile: ReconcileConfig,
    pub http: HttpSourceConfig,
    pub store_dir: PathBuf,
}

/// Collect every validation error rather than stopping at the first.
pub fn validate_config(config: &CardsyncConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut fail = |field: &str, message: String| {
        errors.push(ValidationError {
            field: field.to_string(),
            message,
        })
    };

    match parse_ttl(&config.cache.attachment_ttl) {
        Ok(ttl) if ttl.num_seconds() < 0 => fail(
            "cache.attachment_ttl",
            format!("'{}' must not be negative", config.cache.attachment_ttl),
        ),
        Ok(_) => {}
        Err(e) => fail("cache.attachment_ttl", e.to_string()),
    }

    match parse_ttl(&config.remote.timeout) {
        Ok(timeout) if timeout.num_seconds() <= 0 => fail(
            "remote.timeout",
            format!("'{}' must be positive", config.remote.timeout),
        ),
        Ok(_) => {}
        Err(e) => fail("remote.timeout", e.to_string()),
    }

    if reqwest::Url::parse(&config.remote.base_url).is_err() {
        fail(
            "remote.base_url",
            format!("'{}' is not a valid URL", config.remote.base_url),
        );
    }

    if config.reconcile.chunk_size == 0 {
        fail("reconcile.chunk_size", "must be at least 1".to_string());
    }

    errors
}

/// Validate `config` and build the component configs.
///
/// # Errors
///
/// `ConfigValidationError` listing every failed check.
pub fn validate(config: &CardsyncConfig) -> Result<ComponentConfigs> {
    let errors = validate_config(config);
    if !errors.is_empty() {
        let message = errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(CardsyncError::ConfigValidationError { message });
    }

    let ttl = parse_ttl(&config.cache.attachment_ttl)?;
    let timeout = parse_ttl(&config.remote.timeout)?;

    let resolver = ResolverConfig::new()
        .with_attachment_ttl(u64::try_from(ttl.num_seconds()).unwrap_or_default())
        .with_write_through(config.cache.write_through.into())
        .with_single_flight(config.cache.single_flight);

    let mut http = HttpSourceConfig {
        base_url: config.remote.base_url.clone(),
        timeout: Duration::from_secs(u64::try_from(timeout.num_seconds()).unwrap_or_default()),
        ..HttpSourceConfig::default()
    };
    if let Some(agent) = &config.remote.user_agent {
        http.user_agent = agent.clone();
    }

    Ok(ComponentConfigs {
        resolver,
        reconcile: ReconcileConfig::new(config.reconcile.chunk_size)?,
        http,
        store_dir: config.store.dir.clone().unwrap_or_else(default_store_dir),
    })
}

impl CardsyncConfig {
    /// See [`validate`].
    pub fn validate(&self) -> Result<ComponentConfigs> {
        validate(self)
    }
}
