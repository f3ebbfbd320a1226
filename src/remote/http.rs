//! HTTP remote source.
//!
//! Provides a blocking client for a Scryfall-compatible card API with
//! list pagination.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::wire::{ListPayload, RemoteResource, ResourceRequest};
use super::RemoteSource;
use crate::search::SearchQuery;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.scryfall.com";

/// Upper bound on followed list pages.
const MAX_PAGES: usize = 500;

/// Connection settings for [`HttpSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("cardsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches records over HTTP/HTTPS.
pub struct HttpSource {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpSource {
    /// Create a source against the given API.
    pub fn new(config: &HttpSourceConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid remote base URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("Remote base URL cannot carry paths: {}", config.base_url);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout,
        })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, request: &ResourceRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("Remote base URL cannot carry paths: {}", self.base_url))?;
            segments.pop_if_empty();
            segments.extend(&request.segments);
        }
        if !request.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.params);
        }
        Ok(url)
    }

    /// GET a JSON document. `Ok(None)` on 404.
    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>> {
        tracing::debug!(%url, "remote GET");

        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let body = response
            .text()
            .with_context(|| format!("Failed to read response from {}", url))?;
        let parsed = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected response shape from {}", url))?;
        Ok(Some(parsed))
    }

    fn list_pages<R: RemoteResource>(&self, request: &ResourceRequest) -> Result<Vec<R>> {
        let mut url = self.url_for(request)?;
        let mut records = Vec::new();

        for page in 1..=MAX_PAGES {
            let payload: ListPayload<R::Payload> = self
                .get_json(&url)?
                .ok_or_else(|| anyhow!("Listing not found at {}", url))?;

            tracing::debug!(page, count = payload.data.len(), table = R::TABLE, "remote page");
            records.extend(payload.data.into_iter().map(R::from_payload));

            match (payload.has_more, payload.next_page) {
                (true, Some(next)) => {
                    url = Url::parse(&next)
                        .with_context(|| format!("Invalid next_page link: {}", next))?;
                }
                (true, None) => {
                    tracing::warn!(%url, "listing reports more pages but gives no link");
                    return Ok(records);
                }
                (false, _) => return Ok(records),
            }
        }

        bail!("Listing at {} exceeded {} pages", request.segments.join("/"), MAX_PAGES)
    }
}

impl<R: RemoteResource> RemoteSource<R> for HttpSource {
    fn fetch_record(&self, query: &SearchQuery) -> Result<Option<R>> {
        match R::lookup_request(query) {
            Some(request) => {
                let url = self.url_for(&request)?;
                Ok(self.get_json::<R::Payload>(&url)?.map(R::from_payload))
            }
            // No direct endpoint: scan the listing.
            None => Ok(<Self as RemoteSource<R>>::list_all(self)?
                .into_iter()
                .find(|record| record.matches(query))),
        }
    }

    fn list_all(&self) -> Result<Vec<R>> {
        let request = R::list_request()
            .ok_or_else(|| anyhow!("Remote API offers no full listing of {}", R::TABLE))?;
        self.list_pages(&request)
    }
}
