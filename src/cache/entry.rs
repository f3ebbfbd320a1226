//! Cached attachment type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ttl;

/// A secondary, independently-expiring piece of data on a record
/// (an image URI, a symbol SVG).
///
/// Attachments are keyed by `(record_key, kind)`; the kind lives in the
/// owning map, not on the attachment itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Where the attachment's content lives.
    pub uri: String,
    /// When this attachment was written to the store, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    /// Freshness period in seconds.
    #[serde(default)]
    pub ttl_seconds: u64,
}

impl Attachment {
    /// Create an attachment that has not been cached yet.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            cached_at: None,
            ttl_seconds: 0,
        }
    }

    /// Mark this attachment as cached at `now` with the given period.
    pub fn stamp(&mut self, now: DateTime<Utc>, ttl_seconds: u64) {
        self.cached_at = Some(now);
        self.ttl_seconds = ttl_seconds;
    }

    /// Builder form of [`Attachment::stamp`].
    pub fn stamped(mut self, now: DateTime<Utc>, ttl_seconds: u64) -> Self {
        self.stamp(now, ttl_seconds);
        self
    }

    /// Whether the attachment has been written through a cache fetch.
    pub fn is_cached(&self) -> bool {
        self.cached_at.is_some()
    }

    /// Check expiry at `now`. Never-cached attachments are not expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        ttl::is_expired(self.cached_at, self.ttl_seconds, now)
    }

    /// Check expiry against the wall clock.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Age of the cached copy, if cached.
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.cached_at.map(|at| now.signed_duration_since(at))
    }

    /// Calculate remaining TTL in seconds.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> i64 {
        ttl::remaining_ttl(self.cached_at, self.ttl_seconds, now)
    }
}
