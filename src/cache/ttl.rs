//! Expiration arithmetic for cached attachments.
//!
//! [`is_expired`] is the single source of truth for attachment freshness.
//! An attachment that has never been cached is reported as *not expired*:
//! "absent" and "stale" are different states, and callers that need to know
//! whether a fetch is required check for existence separately (see
//! [`super::validation::validate_attachment`]).

use chrono::{DateTime, Duration, Utc};

/// Whether an attachment cached at `cached_at` has outlived `period_seconds`.
///
/// - `None` is never expired.
/// - A zero period expires as soon as any time has elapsed (`now > cached_at`).
/// - Otherwise the entry expires strictly after `cached_at + period_seconds`.
pub fn is_expired(cached_at: Option<DateTime<Utc>>, period_seconds: u64, now: DateTime<Utc>) -> bool {
    let Some(cached_at) = cached_at else {
        return false;
    };

    match expires_at(cached_at, period_seconds) {
        Some(deadline) => now > deadline,
        // Deadline beyond chrono's range.
        None => false,
    }
}

/// The instant after which an entry cached at `cached_at` is expired.
///
/// Returns `None` when the period is too large to represent.
pub fn expires_at(cached_at: DateTime<Utc>, period_seconds: u64) -> Option<DateTime<Utc>> {
    let seconds = i64::try_from(period_seconds).ok()?;
    let period = Duration::try_seconds(seconds)?;
    cached_at.checked_add_signed(period)
}

/// Seconds left before expiry, clamped at zero.
///
/// Entries that were never cached report their full period.
pub fn remaining_ttl(cached_at: Option<DateTime<Utc>>, period_seconds: u64, now: DateTime<Utc>) -> i64 {
    let full = i64::try_from(period_seconds).unwrap_or(i64::MAX);
    let Some(cached_at) = cached_at else {
        return full;
    };

    match expires_at(cached_at, period_seconds) {
        Some(deadline) => deadline.signed_duration_since(now).num_seconds().max(0),
        None => full,
    }
}
