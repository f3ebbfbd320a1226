//! Error types for cardsync operations.
//!
//! This module defines [`CardsyncError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `CardsyncError` for domain-specific errors that need distinct handling
//! - Collaborators (remote sources, file I/O helpers) return `anyhow::Error`,
//!   which is wrapped into a domain variant at the resolver/reconciler boundary
//! - A cache miss is not an error; see [`crate::cache::Lookup`]

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cardsync operations.
#[derive(Debug, Error)]
pub enum CardsyncError {
    /// No search scheme matched the supplied filters.
    #[error("No search scheme matches filters: {filters}")]
    InvalidFilter { filters: String },

    /// Neither the store nor the remote source produced a match.
    #[error("No record found for {query}")]
    NotFound { query: String },

    /// The remote source failed.
    #[error("Remote fetch failed for {query}: {source:#}")]
    Fetch {
        query: String,
        #[source]
        source: anyhow::Error,
    },

    /// The remote record set lists one key with two different contents.
    #[error("Duplicate key in remote record set: {key}")]
    DuplicateKey { key: String },

    /// The persistence layer failed.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardsyncError {
    /// Build a storage error from a message alone.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Build a storage error wrapping an underlying cause.
    pub fn storage_with(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Result type alias for cardsync operations.
pub type Result<T> = std::result::Result<T, CardsyncError>;
