//! Remote data sources.
//!
//! The remote source is the authoritative copy of card and symbol data.
//! It is consumed through [`RemoteSource`]; [`HttpSource`] talks to a
//! Scryfall-compatible HTTP API.

pub mod http;
pub mod wire;

pub use http::{HttpSource, HttpSourceConfig};
pub use wire::RemoteResource;

use anyhow::Result;
use std::sync::Arc;

use crate::record::Record;
use crate::search::SearchQuery;

/// Authoritative source of records.
///
/// Errors are transport or parse failures; "no such record" is `Ok(None)`.
/// Retries and timeouts belong to the implementation.
pub trait RemoteSource<R: Record>: Send + Sync {
    /// Fetch the single record matching `query`.
    fn fetch_record(&self, query: &SearchQuery) -> Result<Option<R>>;

    /// Fetch the full record set, following any pagination.
    fn list_all(&self) -> Result<Vec<R>>;
}

impl<R: Record, F: RemoteSource<R> + ?Sized> RemoteSource<R> for Arc<F> {
    fn fetch_record(&self, query: &SearchQuery) -> Result<Option<R>> {
        (**self).fetch_record(query)
    }

    fn list_all(&self) -> Result<Vec<R>> {
        (**self).list_all()
    }
}
