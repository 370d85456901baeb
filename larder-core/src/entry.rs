//! The per-key cache entry.
//!
//! Values are stored serialized as [`serde_json::Value`], which lets one
//! store hold heterogeneous value types and makes `dump()` output and
//! warm-start snapshots serializable.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::{CacheConfig, DurationMs, Key, Timestamp};

/// A cached value with its metadata.
///
/// Entries are owned exclusively by the store; the only way they leave it is
/// as part of an independent `dump()` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The cached value, serialized.
    pub data: Value,
    /// Config resolved at the time of the last successful write.
    pub config: CacheConfig,
    /// Instant of the last successful write.
    pub timestamp: Timestamp,
    /// Set by `invalidate` or a failed refresh; cleared only by the next
    /// successful write.
    pub is_stale: bool,
}

/// The full key-to-entry mapping, as stored and as dumped.
pub type Storage = HashMap<Key, Entry>;

impl Entry {
    /// Create an entry written now. A zero staleness window marks the entry
    /// stale immediately.
    pub fn new(data: Value, config: CacheConfig) -> Self {
        Self {
            data,
            config,
            timestamp: Utc::now(),
            is_stale: config.stale_time_ms == 0,
        }
    }

    /// Whether the entry's staleness window has elapsed at `now`, measured
    /// against the given (resolved) window rather than the stored one.
    pub fn is_expired_at(&self, now: Timestamp, stale_time_ms: DurationMs) -> bool {
        match self
            .timestamp
            .checked_add_signed(Duration::milliseconds(stale_time_ms))
        {
            Some(deadline) => now >= deadline,
            // Window too large to represent: never expires.
            None => false,
        }
    }

    /// Explicit stale flag or elapsed window.
    pub fn is_effectively_stale_at(&self, now: Timestamp, stale_time_ms: DurationMs) -> bool {
        self.is_stale || self.is_expired_at(now, stale_time_ms)
    }
}
