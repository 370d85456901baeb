//! Larder Core - Cache Data Types
//!
//! Pure data structures with no behavior beyond pure functions. The cache
//! store and refresh orchestrator live in `larder-cache`; this crate contains
//! only the entry model, configuration (with its pure resolver), composite
//! key building, and error types.

use chrono::{DateTime, Utc};

pub mod config;
pub mod entry;
pub mod error;
pub mod key;

pub use config::{resolve_config, CacheConfig, ConfigOverride, DEFAULT_STALE_TIME_MS};
pub use entry::{Entry, Storage};
pub use error::{CacheError, CodecError};
pub use key::{create_key, KeyPart, KEY_SEPARATOR};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Opaque identifier for a cached value. Composite keys are built with
/// [`create_key`].
pub type Key = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Duration in milliseconds for staleness windows.
pub type DurationMs = i64;
