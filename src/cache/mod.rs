//! Attachment freshness and the read-through cache.
//!
//! Attachments (image or SVG URIs) are stamped when cached and expire after
//! a fixed period. [`CacheResolver`] serves records from the store while
//! their attachments are fresh and refetches them from the remote otherwise.

pub mod entry;
pub mod resolver;
pub mod single_flight;
pub mod ttl;
pub mod validation;

pub use entry::Attachment;
pub use resolver::{
    CacheResolver, Lookup, MissReason, ResolverConfig, ResolverStats, WriteThrough,
    DEFAULT_ATTACHMENT_TTL,
};
pub use single_flight::KeyedGate;
pub use ttl::{expires_at, is_expired, remaining_ttl};
pub use validation::{format_duration, parse_ttl, validate_attachment, ValidationResult};
