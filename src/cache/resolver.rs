//! Read-through cache resolver.
//!
//! [`CacheResolver::locate`] answers a lookup from the persistent store when
//! it can, and otherwise makes exactly one remote fetch, writes the result
//! through to the store, and returns it.
//!
//! A store lookup yields a tagged [`Lookup`]; a miss is an ordinary value
//! the resolver branches on, never an error.

use chrono::{DateTime, Utc};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use super::single_flight::KeyedGate;
use super::validation::{validate_attachment, ValidationResult};
use crate::error::{CardsyncError, Result};
use crate::record::Record;
use crate::remote::RemoteSource;
use crate::search::{Filters, SchemeSet, SearchQuery};
use crate::store::RecordStore;

/// Default attachment TTL: one week.
pub const DEFAULT_ATTACHMENT_TTL: u64 = 604_800;

/// What to persist after a remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteThrough {
    /// The record row and every attachment it carries.
    #[default]
    All,
    /// The record row and only the requested attachment.
    RequestedOnly,
}

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Seconds a freshly cached attachment stays valid.
    pub attachment_ttl: u64,
    pub write_through: WriteThrough,
    /// Collapse concurrent misses for the same query into one fetch.
    pub single_flight: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            attachment_ttl: DEFAULT_ATTACHMENT_TTL,
            write_through: WriteThrough::All,
            single_flight: false,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attachment TTL in seconds.
    pub fn with_attachment_ttl(mut self, seconds: u64) -> Self {
        self.attachment_ttl = seconds;
        self
    }

    pub fn with_write_through(mut self, mode: WriteThrough) -> Self {
        self.write_through = mode;
        self
    }

    /// Enable or disable in-flight de-duplication.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }
}

/// Why a store lookup could not be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// No stored record matches the query.
    NotStored,
    /// The record lacks the requested attachment.
    MissingAttachment,
    /// The attachment exists but was never cached.
    NeverCached,
    /// The attachment's TTL has elapsed.
    Expired,
}

/// Outcome of consulting the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<R> {
    Hit(R),
    Miss(MissReason),
}

impl<R> Lookup<R> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Snapshot of resolver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
}

/// Read-through cache over a store and a remote source.
pub struct CacheResolver<R, S, F> {
    store: S,
    remote: F,
    config: ResolverConfig,
    schemes: SchemeSet,
    gate: Option<KeyedGate>,
    counters: Counters,
    _record: PhantomData<fn() -> R>,
}

impl<R, S, F> CacheResolver<R, S, F>
where
    R: Record,
    S: RecordStore<R>,
    F: RemoteSource<R>,
{
    /// Create a resolver using the record type's own search schemes.
    pub fn new(store: S, remote: F, config: ResolverConfig) -> Self {
        let gate = config.single_flight.then(KeyedGate::new);
        Self {
            store,
            remote,
            config,
            schemes: R::schemes(),
            gate,
            counters: Counters::default(),
            _record: PhantomData,
        }
    }

    /// Replace the search schemes used to normalize filters.
    pub fn with_schemes(mut self, schemes: SchemeSet) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current hit/miss/fetch counters.
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
        }
    }

    /// Resolve `filters` to a record, requiring a fresh `required_attachment`
    /// when one is named.
    ///
    /// # Errors
    ///
    /// - [`CardsyncError::InvalidFilter`] if no search scheme matches
    /// - [`CardsyncError::NotFound`] if the remote has no match either
    /// - [`CardsyncError::Fetch`] if the remote call fails
    /// - [`CardsyncError::Storage`] if the store fails
    pub fn locate(&self, filters: &Filters, required_attachment: Option<&str>) -> Result<R> {
        let query = self.schemes.select(filters)?;
        self.locate_query(&query, required_attachment)
    }

    /// [`CacheResolver::locate`] for an already-normalized query.
    pub fn locate_query(&self, query: &SearchQuery, required_attachment: Option<&str>) -> Result<R> {
        match self.lookup(query, required_attachment, Utc::now())? {
            Lookup::Hit(record) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%query, key = record.key(), "cache hit");
                return Ok(record);
            }
            Lookup::Miss(reason) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%query, ?reason, "cache miss");
            }
        }

        match &self.gate {
            Some(gate) => gate.run(&query.cache_key(), || {
                // Another caller may have filled the store while we waited.
                if let Lookup::Hit(record) = self.lookup(query, required_attachment, Utc::now())? {
                    tracing::debug!(%query, "filled by concurrent fetch");
                    return Ok(record);
                }
                self.fetch_and_store(query, required_attachment)
            }),
            None => self.fetch_and_store(query, required_attachment),
        }
    }

    /// Consult the store only. Store failures are errors; everything that
    /// merely prevents serving from the store is a [`Lookup::Miss`].
    pub fn lookup(
        &self,
        query: &SearchQuery,
        required_attachment: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Lookup<R>> {
        let Some(record) = self.store.get_by_filters(query)? else {
            return Ok(Lookup::Miss(MissReason::NotStored));
        };

        let Some(kind) = required_attachment else {
            return Ok(Lookup::Hit(record));
        };

        Ok(match validate_attachment(&record, kind, now) {
            ValidationResult::Fresh => Lookup::Hit(record),
            ValidationResult::Expired => Lookup::Miss(MissReason::Expired),
            ValidationResult::Missing => Lookup::Miss(MissReason::MissingAttachment),
            ValidationResult::NeverCached => Lookup::Miss(MissReason::NeverCached),
        })
    }

    fn fetch_and_store(&self, query: &SearchQuery, required_attachment: Option<&str>) -> Result<R> {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%query, "remote fetch");

        let fetched = self
            .remote
            .fetch_record(query)
            .map_err(|source| CardsyncError::Fetch {
                query: query.to_string(),
                source,
            })?;

        let Some(mut record) = fetched else {
            return Err(CardsyncError::NotFound {
                query: query.to_string(),
            });
        };

        let now = Utc::now();
        for attachment in record.attachments_mut().values_mut() {
            attachment.stamp(now, self.config.attachment_ttl);
        }

        if let Some(kind) = required_attachment {
            if record.attachment(kind).is_none() {
                tracing::warn!(key = record.key(), kind, "remote record lacks requested attachment");
            }
        }

        self.write_through(&record, required_attachment)?;
        Ok(record)
    }

    fn write_through(&self, record: &R, required_attachment: Option<&str>) -> Result<()> {
        match (self.config.write_through, required_attachment) {
            (WriteThrough::RequestedOnly, Some(kind)) => {
                let mut row = record.clone();
                let attachments = std::mem::take(row.attachments_mut());
                self.store.upsert(&row)?;
                if let Some(attachment) = attachments.get(kind) {
                    self.store.upsert_attachment(record.key(), kind, attachment)?;
                }
            }
            _ => self.store.upsert(record)?,
        }
        tracing::debug!(key = record.key(), table = R::TABLE, "written through");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Attachment;
    use crate::record::Card;
    use crate::store::MemoryStore;
    use anyhow::anyhow;
    use chrono::Duration;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    /// Remote double that counts calls and serves a fixed response.
    struct StubRemote {
        card: Mutex<Option<Card>>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubRemote {
        fn serving(card: Card) -> Self {
            Self {
                card: Mutex::new(Some(card)),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                card: Mutex::new(None),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::empty()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RemoteSource<Card> for StubRemote {
        fn fetch_record(&self, _query: &SearchQuery) -> anyhow::Result<Option<Card>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.card.lock().unwrap().clone())
        }

        fn list_all(&self) -> anyhow::Result<Vec<Card>> {
            Ok(self.card.lock().unwrap().clone().into_iter().collect())
        }
    }

    fn remote_opt() -> Card {
        let mut card = Card::new("c-opt", "Opt", "xln", "65");
        card.oracle_text = Some("Scry 1. Draw a card.".into());
        card.attachments
            .insert("normal".into(), Attachment::new("https://img/new-normal.jpg"));
        card.attachments
            .insert("large".into(), Attachment::new("https://img/new-large.jpg"));
        card
    }

    fn stored_opt(cached_at: chrono::DateTime<Utc>, ttl: u64) -> Card {
        let mut card = Card::new("c-opt", "Opt", "xln", "65");
        card.attachments.insert(
            "normal".into(),
            Attachment::new("https://img/old-normal.jpg").stamped(cached_at, ttl),
        );
        card
    }

    fn by_id() -> Filters {
        Filters::from([("id".to_string(), "c-opt".to_string())])
    }

    fn resolver(
        store: MemoryStore<Card>,
        remote: Arc<StubRemote>,
        config: ResolverConfig,
    ) -> CacheResolver<Card, MemoryStore<Card>, Arc<StubRemote>> {
        CacheResolver::new(store, remote, config)
    }

    #[test]
    fn fresh_record_never_calls_remote() {
        let store = MemoryStore::with_records([stored_opt(Utc::now(), 3600)]);
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(store, Arc::clone(&remote), ResolverConfig::default());

        let card = resolver.locate(&by_id(), Some("normal")).unwrap();

        assert_eq!(remote.calls(), 0);
        assert_eq!(card.attachments["normal"].uri, "https://img/old-normal.jpg");
        assert_eq!(resolver.stats().hits, 1);
    }

    #[test]
    fn stored_record_without_required_attachment_is_a_hit() {
        let store = MemoryStore::with_records([Card::new("c-opt", "Opt", "xln", "65")]);
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(store, Arc::clone(&remote), ResolverConfig::default());

        resolver.locate(&by_id(), None).unwrap();
        assert_eq!(remote.calls(), 0);
    }

    #[test]
    fn expired_attachment_fetches_exactly_once() {
        let store = MemoryStore::with_records([stored_opt(Utc::now() - Duration::hours(2), 3600)]);
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(store, Arc::clone(&remote), ResolverConfig::default());

        let card = resolver.locate(&by_id(), Some("normal")).unwrap();

        assert_eq!(remote.calls(), 1);
        assert_eq!(card.attachments["normal"].uri, "https://img/new-normal.jpg");
        assert_eq!(card.oracle_text.as_deref(), Some("Scry 1. Draw a card."));
        assert!(!card.attachments["normal"].is_expired());
    }

    #[test]
    fn missing_attachment_fetches_exactly_once() {
        let store = MemoryStore::with_records([stored_opt(Utc::now(), 3600)]);
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(store, Arc::clone(&remote), ResolverConfig::default());

        let card = resolver.locate(&by_id(), Some("large")).unwrap();

        assert_eq!(remote.calls(), 1);
        assert_eq!(card.attachments["large"].uri, "https://img/new-large.jpg");
    }

    #[test]
    fn never_cached_attachment_is_a_miss() {
        let mut stored = Card::new("c-opt", "Opt", "xln", "65");
        stored
            .attachments
            .insert("normal".into(), Attachment::new("https://img/unstamped.jpg"));
        let store = MemoryStore::with_records([stored]);
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(store, Arc::clone(&remote), ResolverConfig::default());

        let lookup = resolver
            .lookup(
                &SearchQuery::new(crate::search::SchemeKind::Id, [("id", "c-opt")]),
                Some("normal"),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(lookup, Lookup::Miss(MissReason::NeverCached));

        resolver.locate(&by_id(), Some("normal")).unwrap();
        assert_eq!(remote.calls(), 1);
    }

    #[test]
    fn miss_writes_through_then_hits() {
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(MemoryStore::new(), Arc::clone(&remote), ResolverConfig::default());

        resolver.locate(&by_id(), Some("normal")).unwrap();
        resolver.locate(&by_id(), Some("normal")).unwrap();

        assert_eq!(remote.calls(), 1);
        let stored = resolver.store().get("c-opt").unwrap().unwrap();
        assert_eq!(stored.attachments.len(), 2);
        assert!(stored.attachments.values().all(|a| a.is_cached()));
        assert_eq!(
            resolver.stats(),
            ResolverStats {
                hits: 1,
                misses: 1,
                fetches: 1
            }
        );
    }

    #[test]
    fn write_through_stamps_configured_ttl() {
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let config = ResolverConfig::new().with_attachment_ttl(90);
        let resolver = resolver(MemoryStore::new(), remote, config);

        let card = resolver.locate(&by_id(), None).unwrap();
        assert!(card.attachments.values().all(|a| a.ttl_seconds == 90));
    }

    #[test]
    fn requested_only_writes_one_attachment() {
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let config = ResolverConfig::new().with_write_through(WriteThrough::RequestedOnly);
        let resolver = resolver(MemoryStore::new(), remote, config);

        let returned = resolver.locate(&by_id(), Some("large")).unwrap();
        assert_eq!(returned.attachments.len(), 2);

        let stored = resolver.store().get("c-opt").unwrap().unwrap();
        assert_eq!(stored.attachments.keys().collect::<Vec<_>>(), vec!["large"]);
    }

    #[test]
    fn requested_only_without_requirement_writes_everything() {
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let config = ResolverConfig::new().with_write_through(WriteThrough::RequestedOnly);
        let resolver = resolver(MemoryStore::new(), remote, config);

        resolver.locate(&by_id(), None).unwrap();
        let stored = resolver.store().get("c-opt").unwrap().unwrap();
        assert_eq!(stored.attachments.len(), 2);
    }

    #[test]
    fn refetch_resets_timestamp() {
        let stale_at = Utc::now() - Duration::days(30);
        let store = MemoryStore::with_records([stored_opt(stale_at, 60)]);
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(store, remote, ResolverConfig::default());

        resolver.locate(&by_id(), Some("normal")).unwrap();

        let stored = resolver.store().get("c-opt").unwrap().unwrap();
        assert!(stored.attachments["normal"].cached_at.unwrap() > stale_at);
    }

    #[test]
    fn remote_without_match_is_not_found() {
        let remote = Arc::new(StubRemote::empty());
        let resolver = resolver(MemoryStore::new(), Arc::clone(&remote), ResolverConfig::default());

        let err = resolver.locate(&by_id(), None).unwrap_err();
        assert!(matches!(err, CardsyncError::NotFound { .. }));
        assert_eq!(remote.calls(), 1);
    }

    #[test]
    fn remote_failure_is_fetch_error_with_cause() {
        let remote = Arc::new(StubRemote::failing());
        let resolver = resolver(MemoryStore::new(), Arc::clone(&remote), ResolverConfig::default());

        let err = resolver.locate(&by_id(), None).unwrap_err();
        assert!(matches!(err, CardsyncError::Fetch { .. }));
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(remote.calls(), 1);
    }

    #[test]
    fn unusable_filters_never_reach_store_or_remote() {
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let resolver = resolver(MemoryStore::new(), Arc::clone(&remote), ResolverConfig::default());

        let filters = Filters::from([("lang".to_string(), "en".to_string())]);
        let err = resolver.locate(&filters, None).unwrap_err();

        assert!(matches!(err, CardsyncError::InvalidFilter { .. }));
        assert_eq!(remote.calls(), 0);
        assert_eq!(resolver.stats(), ResolverStats::default());
    }

    #[test]
    fn id_scheme_wins_when_filters_overlap() {
        let store = MemoryStore::with_records([stored_opt(Utc::now(), 3600)]);
        let remote = Arc::new(StubRemote::empty());
        let resolver = resolver(store, Arc::clone(&remote), ResolverConfig::default());

        let filters = Filters::from([
            ("id".to_string(), "c-opt".to_string()),
            ("name".to_string(), "Something Else".to_string()),
            ("set".to_string(), "zzz".to_string()),
        ]);
        let card = resolver.locate(&filters, None).unwrap();

        assert_eq!(card.id, "c-opt");
        assert_eq!(remote.calls(), 0);
    }

    #[test]
    fn single_flight_collapses_concurrent_misses() {
        let remote = Arc::new(StubRemote::serving(remote_opt()));
        let config = ResolverConfig::new().with_single_flight(true);
        let resolver = Arc::new(resolver(MemoryStore::new(), Arc::clone(&remote), config));
        let barrier = Arc::new(std::sync::Barrier::new(6));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    resolver.locate(&by_id(), Some("normal")).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().id, "c-opt");
        }
        assert_eq!(remote.calls(), 1);
    }
}
