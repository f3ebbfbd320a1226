//! cardsync - a local mirror of trading-card data that stays fresh.
//!
//! cardsync keeps card printings and the symbol catalog in a local store.
//! Card lookups are served from the store while their images are fresh and
//! refetched from a Scryfall-compatible API otherwise. The symbol catalog
//! is kept in line with the remote one by a content-hash diff that yields a
//! minimal add/update/delete patch.
//!
//! # Modules
//!
//! - [`cache`] - Attachment TTLs and the read-through cache resolver
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`reconcile`] - Content hashing, diffing, and patch application
//! - [`record`] - Card and symbol records
//! - [`remote`] - Remote sources, including the HTTP API client
//! - [`search`] - Lookup schemes and filter normalization
//! - [`store`] - Persistent record stores
//! - [`ui`] - Prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use cardsync::cache::{CacheResolver, ResolverConfig};
//! use cardsync::record::Symbol;
//! use cardsync::remote::RemoteSource;
//! use cardsync::search::{Filters, SearchQuery};
//! use cardsync::store::MemoryStore;
//!
//! struct Offline;
//!
//! impl RemoteSource<Symbol> for Offline {
//!     fn fetch_record(&self, _: &SearchQuery) -> anyhow::Result<Option<Symbol>> {
//!         Ok(None)
//!     }
//!     fn list_all(&self) -> anyhow::Result<Vec<Symbol>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let store = MemoryStore::with_records([Symbol::new("{T}", "tap this permanent")]);
//! let resolver = CacheResolver::new(store, Offline, ResolverConfig::default());
//!
//! let filters = Filters::from([("symbol".to_string(), "{T}".to_string())]);
//! let tap = resolver.locate(&filters, None).unwrap();
//! assert_eq!(tap.english, "tap this permanent");
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod record;
pub mod remote;
pub mod search;
pub mod store;
pub mod ui;

pub use error::{CardsyncError, Result};
