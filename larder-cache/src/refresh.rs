//! Refresh orchestration: the `cache` / `cache_sync` read-through path.
//!
//! The algorithm is identical for both variants; only suspension differs.
//! The hit/miss decision and the pending-set insertion happen under the
//! store lock in one step, so two callers can never both observe "not
//! pending" for a key that has an entry. The lock is never held while the
//! producer runs.
//!
//! Settling is driven by [`RefreshGuard`]: success overwrites the entry and
//! clears the pending marker; failure, an undecodable result, or a dropped
//! future clear the marker and leave the existing entry marked stale so the
//! next call retries.

use std::future::Future;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use larder_core::{
    resolve_config, CacheConfig, CacheError, CodecError, ConfigOverride, Entry, Key,
};

use crate::store::CacheStore;

/// Outcome of the locked hit/miss decision.
enum ReadDecision {
    /// Serve this stored value; the producer is not consulted.
    Hit(Value),
    /// The key is now marked pending; run the producer under this resolved
    /// config.
    Refresh(CacheConfig),
}

/// Clears the pending marker exactly once however the refresh settles.
///
/// Dropping the guard while armed is the failure path: the entry (if any)
/// is kept but forced stale, and the marker is removed. This also covers
/// panicking producers and `cache` futures dropped mid-refresh.
struct RefreshGuard<'a> {
    store: &'a CacheStore,
    key: &'a Key,
    armed: bool,
}

impl<'a> RefreshGuard<'a> {
    fn new(store: &'a CacheStore, key: &'a Key) -> Self {
        Self {
            store,
            key,
            armed: true,
        }
    }

    /// Store the produced value and clear the marker.
    fn commit<T, E>(mut self, data: T, config: CacheConfig) -> Result<T, CacheError<E>>
    where
        T: Serialize,
    {
        match serde_json::to_value(&data) {
            Ok(value) => {
                self.armed = false;
                self.store.finish_refresh(self.key, value, config);
                Ok(data)
            }
            Err(source) => Err(CacheError::Codec(CodecError {
                key: self.key.clone(),
                source,
            })),
        }
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.fail_refresh(self.key);
        }
    }
}

fn decode<T, E>(key: &Key, value: Value) -> Result<T, CacheError<E>>
where
    T: DeserializeOwned,
{
    serde_json::from_value(value).map_err(|source| {
        CacheError::Codec(CodecError {
            key: key.clone(),
            source,
        })
    })
}

impl CacheStore {
    /// Return the cached value for `key`, or run the async `producer` to
    /// refresh it.
    ///
    /// The stored value is served without invoking the producer when it is
    /// still within its staleness window, and also while a refresh for the
    /// key is already in flight: concurrent callers are not joined to the
    /// in-flight result, they receive the previously stored (possibly
    /// stale) value. On producer failure the error propagates unmodified
    /// inside [`CacheError::Producer`], the existing entry is kept marked
    /// stale, and no retry happens.
    pub async fn cache<T, E, F, Fut>(
        &self,
        key: impl Into<Key>,
        producer: F,
        config: Option<ConfigOverride>,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = key.into();
        match self.begin_read(&key, config) {
            ReadDecision::Hit(value) => decode(&key, value),
            ReadDecision::Refresh(resolved) => {
                let guard = RefreshGuard::new(self, &key);
                match producer().await {
                    Ok(data) => guard.commit(data, resolved),
                    Err(source) => {
                        drop(guard);
                        Err(CacheError::Producer { key, source })
                    }
                }
            }
        }
    }

    /// Synchronous twin of [`CacheStore::cache`]; runs to completion without
    /// suspending.
    pub fn cache_sync<T, E, F>(
        &self,
        key: impl Into<Key>,
        producer: F,
        config: Option<ConfigOverride>,
    ) -> Result<T, CacheError<E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        let key = key.into();
        match self.begin_read(&key, config) {
            ReadDecision::Hit(value) => decode(&key, value),
            ReadDecision::Refresh(resolved) => {
                let guard = RefreshGuard::new(self, &key);
                match producer() {
                    Ok(data) => guard.commit(data, resolved),
                    Err(source) => {
                        drop(guard);
                        Err(CacheError::Producer { key, source })
                    }
                }
            }
        }
    }

    /// The locked check-then-set step: decide hit or refresh, and in the
    /// refresh case insert the pending marker before releasing the lock.
    fn begin_read(&self, key: &Key, overlay: Option<ConfigOverride>) -> ReadDecision {
        let mut state = self.state.lock();
        let stored = state.storage.get(key).map(|entry| entry.config);
        let resolved = resolve_config(self.default_config, stored, overlay);

        let hit = match state.storage.get(key) {
            Some(entry) => {
                let pending = state.pending.contains(key);
                if pending || !entry.is_effectively_stale_at(Utc::now(), resolved.stale_time_ms) {
                    Some(entry.data.clone())
                } else {
                    None
                }
            }
            None => None,
        };

        match hit {
            Some(value) => {
                state.stats.hits += 1;
                trace!(key = key.as_str(), "cache hit");
                ReadDecision::Hit(value)
            }
            None => {
                state.stats.misses += 1;
                state.pending.insert(key.clone());
                trace!(
                    key = key.as_str(),
                    stale_time_ms = resolved.stale_time_ms,
                    "refresh scheduled"
                );
                ReadDecision::Refresh(resolved)
            }
        }
    }

    /// Successful settle: overwrite the entry, clear the marker.
    fn finish_refresh(&self, key: &Key, value: Value, config: CacheConfig) {
        let mut state = self.state.lock();
        state.storage.insert(key.clone(), Entry::new(value, config));
        state.pending.remove(key);
        state.stats.refreshes += 1;
    }

    /// Failed settle: keep the entry but force it stale, clear the marker.
    fn fail_refresh(&self, key: &Key) {
        let mut state = self.state.lock();
        if let Some(entry) = state.storage.get_mut(key) {
            entry.is_stale = true;
        }
        state.pending.remove(key);
        state.stats.failed_refreshes += 1;
        trace!(key = key.as_str(), "refresh settled without a new value");
    }
}
