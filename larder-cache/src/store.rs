//! In-memory key-matching store.
//!
//! One [`CacheStore`] owns its mapping and pending set behind a single
//! mutex, so the hit/miss decision and the pending-set mutation in the
//! refresh orchestrator are atomic with respect to every store-mutating
//! operation here. There is no hidden process-wide instance; construct as
//! many isolated stores as needed.

use std::collections::HashSet;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use larder_core::{
    resolve_config, CacheConfig, CodecError, ConfigOverride, Entry, Key, Storage,
};

use crate::stats::CacheStats;

/// Mapping plus transient refresh markers, guarded as one unit.
pub(crate) struct CacheState {
    pub(crate) storage: Storage,
    pub(crate) pending: HashSet<Key>,
    pub(crate) stats: CacheStats,
}

/// Key-addressed cache of serialized values with per-entry staleness.
///
/// Values cross a serde boundary on the way in and out, which lets one store
/// hold heterogeneous types and keeps [`CacheStore::dump`] snapshots
/// serializable. Non-exact operations match by key prefix, composing with
/// [`larder_core::create_key`] namespacing.
pub struct CacheStore {
    pub(crate) state: Mutex<CacheState>,
    pub(crate) default_config: CacheConfig,
}

impl CacheStore {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Create an empty store with an instance-level default config.
    ///
    /// A negative default staleness window is invalid and replaced by
    /// [`larder_core::DEFAULT_STALE_TIME_MS`].
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_storage(config, Storage::new())
    }

    /// Create a store preloaded with a storage snapshot (warm start or
    /// testing). The snapshot becomes the store's private state.
    pub fn with_storage(config: CacheConfig, storage: Storage) -> Self {
        let default_config = if config.stale_time_ms < 0 {
            CacheConfig::default()
        } else {
            config
        };
        Self {
            state: Mutex::new(CacheState {
                storage,
                pending: HashSet::new(),
                stats: CacheStats::default(),
            }),
            default_config,
        }
    }

    /// The instance-level default configuration.
    pub fn default_config(&self) -> CacheConfig {
        self.default_config
    }

    /// Look up a stored value. `None` for unknown keys and for values that
    /// do not decode as `T`. No side effects.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.state.lock();
        let entry = state.storage.get(key)?;
        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => Some(value),
            Err(error) => {
                trace!(key, %error, "cached value does not decode to requested type");
                None
            }
        }
    }

    /// Unconditionally create or overwrite the entry for `key`.
    ///
    /// The entry config resolves from the instance default plus the given
    /// override; a previously stored config is deliberately not consulted.
    /// The write stamps `timestamp = now` and marks the entry stale
    /// immediately when the resolved window is zero.
    pub fn set<T: Serialize>(
        &self,
        key: impl Into<Key>,
        data: &T,
        config: Option<ConfigOverride>,
    ) -> Result<(), CodecError> {
        let key = key.into();
        let resolved = resolve_config(self.default_config, None, config);
        let value = serde_json::to_value(data).map_err(|source| CodecError {
            key: key.clone(),
            source,
        })?;
        let mut state = self.state.lock();
        state.storage.insert(key, Entry::new(value, resolved));
        Ok(())
    }

    /// Delete the entry for exactly `key`. Returns whether it was present;
    /// unknown keys are a no-op.
    pub fn remove(&self, key: &str) -> bool {
        self.state.lock().storage.remove(key).is_some()
    }

    /// Delete every entry whose key starts with `prefix`. Returns the number
    /// of entries removed; zero matches are not an error.
    pub fn remove_by_prefix(&self, prefix: &str) -> usize {
        let mut state = self.state.lock();
        let before = state.storage.len();
        state.storage.retain(|key, _| !key.starts_with(prefix));
        let removed = before - state.storage.len();
        if removed > 0 {
            debug!(prefix, removed, "removed entries by prefix");
        }
        removed
    }

    /// Mark the entry for exactly `key` stale. Returns whether it was
    /// present; unknown keys are a no-op.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        match state.storage.get_mut(key) {
            Some(entry) => {
                entry.is_stale = true;
                true
            }
            None => false,
        }
    }

    /// Mark every entry whose key starts with `prefix` stale. Returns the
    /// number of entries touched.
    pub fn invalidate_by_prefix(&self, prefix: &str) -> usize {
        let mut state = self.state.lock();
        let mut touched = 0;
        for (key, entry) in state.storage.iter_mut() {
            if key.starts_with(prefix) {
                entry.is_stale = true;
                touched += 1;
            }
        }
        if touched > 0 {
            debug!(prefix, touched, "invalidated entries by prefix");
        }
        touched
    }

    /// Clear the mapping and the pending set entirely.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.storage.clear();
        state.pending.clear();
        debug!("cache cleared");
    }

    /// An independent snapshot of the full mapping, for inspection and
    /// rendering. Mutating the snapshot does not affect the store.
    pub fn dump(&self) -> Storage {
        self.state.lock().storage.clone()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.state.lock().storage.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry exists for exactly `key`, stale or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.state.lock().storage.contains_key(key)
    }

    /// Usage counters plus the current entry count.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entry_count: state.storage.len() as u64,
            ..state.stats.clone()
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}
