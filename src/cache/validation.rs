//! Attachment freshness checks and TTL string helpers.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};

use crate::record::Record;

/// Result of checking a record's attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    /// Attachment exists, was cached, and is within its TTL.
    Fresh,
    /// Attachment exists but its TTL has elapsed.
    Expired,
    /// The record has no attachment of this kind.
    Missing,
    /// Attachment exists but carries no cache timestamp.
    NeverCached,
}

impl ValidationResult {
    /// Only fresh attachments may be served from the store.
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Check the attachment `kind` on `record` at `now`.
///
/// The existence check comes first: a missing or never-cached attachment
/// needs a fetch even though [`super::ttl::is_expired`] would call it
/// unexpired.
pub fn validate_attachment<R: Record>(record: &R, kind: &str, now: DateTime<Utc>) -> ValidationResult {
    let Some(attachment) = record.attachment(kind) else {
        return ValidationResult::Missing;
    };

    if !attachment.is_cached() {
        return ValidationResult::NeverCached;
    }

    if attachment.is_expired_at(now) {
        ValidationResult::Expired
    } else {
        ValidationResult::Fresh
    }
}

/// Count `(fresh, expired)` cached attachments across records.
pub fn attachment_counts<R: Record>(records: &[R], now: DateTime<Utc>) -> (usize, usize) {
    records
        .iter()
        .flat_map(|r| r.attachments().values())
        .filter(|a| a.is_cached())
        .fold((0, 0), |(fresh, expired), a| {
            if a.is_expired_at(now) {
                (fresh, expired + 1)
            } else {
                (fresh + 1, expired)
            }
        })
}

/// Parse a TTL string like "7d", "24h", "30m".
///
/// Values too large for a [`Duration`] are an error rather than a panic.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let normalized = ttl.trim().to_lowercase();

    let (digits, to_duration): (&str, fn(i64) -> Option<Duration>) =
        if let Some(days) = normalized.strip_suffix('d') {
            (days, Duration::try_days)
        } else if let Some(hours) = normalized.strip_suffix('h') {
            (hours, Duration::try_hours)
        } else if let Some(mins) = normalized.strip_suffix('m') {
            (mins, Duration::try_minutes)
        } else if let Some(secs) = normalized.strip_suffix('s') {
            (secs, Duration::try_seconds)
        } else {
            // Assume seconds if no suffix
            (normalized.as_str(), Duration::try_seconds)
        };

    let n: i64 = digits
        .parse()
        .with_context(|| format!("'{}' is not a duration like 7d, 24h, 30m", ttl.trim()))?;
    to_duration(n).ok_or_else(|| anyhow!("'{}' is out of range", ttl.trim()))
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();

    if secs >= 86400 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
