//! Statistics about cache usage.

/// Counters maintained by the store and the refresh orchestrator.
///
/// `hits`/`misses` count `cache`/`cache_sync` decisions: a hit is served
/// from the store without invoking the producer, a miss schedules a refresh.
/// Plain `get` reads are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Read-through calls served from the store.
    pub hits: u64,
    /// Read-through calls that scheduled a producer run.
    pub misses: u64,
    /// Producer runs that completed and overwrote the entry.
    pub refreshes: u64,
    /// Producer runs that settled without a new value (error, undecodable
    /// result, or dropped future).
    pub failed_refreshes: u64,
    /// Number of entries currently stored.
    pub entry_count: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty = CacheStats::default();
        assert!((empty.hit_rate() - 0.0).abs() < 0.001);
    }
}
