//! Error types for cache operations.
//!
//! A failed producer is never caught, retried, or replaced: its error is
//! carried through [`CacheError::Producer`] unmodified. Unknown keys and
//! invalid (negative) staleness windows are not errors at all; the former is
//! a no-op/`None`, the latter is normalized by the config resolver.

use thiserror::Error;

use crate::Key;

/// A value failed to serialize into or deserialize out of the store.
#[derive(Debug, Error)]
#[error("codec failure for key `{key}`")]
pub struct CodecError {
    /// Key of the affected entry.
    pub key: Key,
    /// The underlying serde failure.
    #[source]
    pub source: serde_json::Error,
}

/// Error returned by `cache` / `cache_sync`.
///
/// `E` is the caller's producer error type, opaque to the cache.
#[derive(Debug, Error)]
pub enum CacheError<E> {
    /// The caller-supplied producer failed. The pending marker has been
    /// cleared and any existing entry marked stale; no retry was attempted.
    #[error("producer failed for key `{key}`")]
    Producer {
        /// Key whose refresh failed.
        key: Key,
        /// The producer's error, unmodified.
        #[source]
        source: E,
    },

    /// The produced or cached value could not cross the serialization
    /// boundary of the store.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl<E> CacheError<E> {
    /// Key of the affected entry.
    pub fn key(&self) -> &str {
        match self {
            CacheError::Producer { key, .. } => key,
            CacheError::Codec(CodecError { key, .. }) => key,
        }
    }

    /// Recover the producer's own error, if that is what failed.
    pub fn into_producer_error(self) -> Option<E> {
        match self {
            CacheError::Producer { source, .. } => Some(source),
            CacheError::Codec(_) => None,
        }
    }

    /// Whether the failure originated in the producer.
    pub fn is_producer(&self) -> bool {
        matches!(self, CacheError::Producer { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error, PartialEq)]
    #[error("upstream unavailable")]
    struct UpstreamError;

    #[test]
    fn test_producer_error_is_recoverable_unmodified() {
        let err: CacheError<UpstreamError> = CacheError::Producer {
            key: "user::1".to_string(),
            source: UpstreamError,
        };
        assert!(err.is_producer());
        assert_eq!(err.key(), "user::1");
        assert_eq!(err.into_producer_error(), Some(UpstreamError));
    }

    #[test]
    fn test_codec_error_carries_key() {
        let source = serde_json::from_str::<i64>("not a number").unwrap_err();
        let err: CacheError<UpstreamError> =
            CacheError::from(CodecError {
                key: "user::2".to_string(),
                source,
            });
        assert!(!err.is_producer());
        assert_eq!(err.key(), "user::2");
        assert!(err.into_producer_error().is_none());
    }

    #[test]
    fn test_producer_error_display_names_key() {
        let err: CacheError<UpstreamError> = CacheError::Producer {
            key: "posts::7".to_string(),
            source: UpstreamError,
        };
        assert_eq!(err.to_string(), "producer failed for key `posts::7`");
    }
}
