//! Larder Cache - Stale-Aware Result Cache
//!
//! An in-process, key-addressed cache that stores the result of an arbitrary
//! producer operation alongside a time-based staleness marker, and guarantees
//! that a producer is not invoked again for a key while fresher data is still
//! valid or a refresh for that key is already underway.
//!
//! The data model lives in `larder-core`; this crate adds the behavior:
//!
//! - **Key-matching store**: exact and prefix lookup, unconditional `set`,
//!   `remove`/`invalidate` sweeps, `clear`, independent `dump()` snapshots.
//! - **Refresh orchestrator**: [`CacheStore::cache`] (async) and
//!   [`CacheStore::cache_sync`] decide hit/miss/stale, run the caller's
//!   producer at most once per key while an entry exists, and keep the
//!   pending set consistent whether the producer succeeds, fails, or its
//!   future is dropped.
//!
//! # Example
//!
//! ```
//! use larder_cache::CacheStore;
//!
//! # #[derive(Debug, thiserror::Error)]
//! # #[error("unreachable")]
//! # struct FetchError;
//! # fn main() {
//! let store = CacheStore::new();
//!
//! let value: u32 = store
//!     .cache_sync("answer", || Ok::<_, FetchError>(42), None)
//!     .expect("producer cannot fail");
//! assert_eq!(value, 42);
//!
//! // Within the staleness window the producer is not consulted again.
//! let cached: u32 = store
//!     .cache_sync("answer", || Err(FetchError), None)
//!     .expect("served from cache");
//! assert_eq!(cached, 42);
//! # }
//! ```

mod refresh;
mod stats;
mod store;

pub use stats::CacheStats;
pub use store::CacheStore;

// Re-export the core data model so most callers need only this crate.
pub use larder_core::{
    create_key, resolve_config, CacheConfig, CacheError, CodecError, ConfigOverride, DurationMs,
    Entry, Key, KeyPart, Storage, Timestamp, DEFAULT_STALE_TIME_MS, KEY_SEPARATOR,
};
