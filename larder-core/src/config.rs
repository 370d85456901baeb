//! Cache configuration and the pure config resolver.
//!
//! Effective configuration for any operation is resolved from three layers:
//! per-call override over the entry's stored config over the instance
//! default. Resolution is a pure function, decoupled from storage mutation.

use serde::{Deserialize, Serialize};

use crate::DurationMs;

/// Default staleness window when none is configured: five minutes.
pub const DEFAULT_STALE_TIME_MS: DurationMs = 5 * 60 * 1000;

/// Per-entry cache configuration.
///
/// `stale_time_ms` is the duration after which an entry becomes eligible for
/// refresh on next access. Zero means the entry is stale immediately after
/// being set, which disables caching for it. Negative values are invalid and
/// are normalized to the instance default by [`resolve_config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    pub stale_time_ms: DurationMs,
}

impl CacheConfig {
    /// Create a config with the given staleness window.
    pub fn new(stale_time_ms: DurationMs) -> Self {
        Self { stale_time_ms }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_ms: DEFAULT_STALE_TIME_MS,
        }
    }
}

/// Partial configuration supplied per entry or per call.
///
/// `None` fields fall through to the next layer of [`resolve_config`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverride {
    pub stale_time_ms: Option<DurationMs>,
}

impl ConfigOverride {
    /// Override only the staleness window.
    pub fn stale_time(stale_time_ms: DurationMs) -> Self {
        Self {
            stale_time_ms: Some(stale_time_ms),
        }
    }
}

impl From<CacheConfig> for ConfigOverride {
    fn from(config: CacheConfig) -> Self {
        Self {
            stale_time_ms: Some(config.stale_time_ms),
        }
    }
}

/// Resolve the effective configuration for one operation.
///
/// The per-call `overlay` wins over the entry's `stored` config, which wins
/// over the instance `default`. A negative resolved `stale_time_ms` is
/// invalid and silently replaced by the instance default, so every config
/// this function returns satisfies `stale_time_ms >= 0` (assuming the
/// instance default does, which the store enforces at construction).
pub fn resolve_config(
    default: CacheConfig,
    stored: Option<CacheConfig>,
    overlay: Option<ConfigOverride>,
) -> CacheConfig {
    let mut resolved = stored.unwrap_or(default);
    if let Some(overlay) = overlay {
        if let Some(stale_time_ms) = overlay.stale_time_ms {
            resolved.stale_time_ms = stale_time_ms;
        }
    }
    if resolved.stale_time_ms < 0 {
        resolved.stale_time_ms = default.stale_time_ms;
    }
    resolved
}
