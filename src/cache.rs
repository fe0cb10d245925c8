//! External solution cache.
//!
//! Abstracts the Redis-backed cache the reference implementation reads and
//! writes around `solve_partial_batch`: a cache is just something that can
//! append to and read back a growing list of solutions under a key, plus a
//! companion metadata blob, with a 24-hour best-effort expiry. Cache misses
//! and cache errors are never fatal: the solver always falls back to
//! recomputation.

use std::time::Duration;

use serde_json::Value;

/// 24 hours, matching the reference implementation's cache TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A best-effort external cache for batched solution enumeration.
///
/// Every method returns a `Result` so a real backend (Redis, memcached) can
/// surface transport errors, but callers are expected to treat any `Err` as
/// a cache miss and continue without one, never as a reason to fail the
/// request.
pub trait Cache: Send + Sync {
    /// Reads solutions `start..start+count` previously appended under `key`,
    /// or as many as are available if fewer were cached.
    fn get_range(&self, key: &str, start: usize, count: usize) -> Result<Vec<Value>, CacheError>;

    /// Appends `values` to the list stored under `key`, creating it if
    /// absent, and (re)sets its expiry to `ttl`.
    fn append(&self, key: &str, values: &[Value], ttl: Duration) -> Result<(), CacheError>;

    /// Stores a metadata blob (e.g. "exhausted" / total-found-so-far) under
    /// `key`, with expiry `ttl`.
    fn set_meta(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;

    /// Reads the metadata blob previously stored under `key`, if present
    /// and not expired.
    fn get_meta(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Resets `key`'s expiry to `ttl`, extending its lifetime.
    fn expire(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// A transport-level cache failure. Never fatal to a caller; see the
/// `Cache` trait docs.
#[derive(Debug, thiserror::Error)]
#[error("cache error: {0}")]
pub struct CacheError(pub String);

/// A cache that stores nothing and misses every lookup. The default when no
/// external cache is configured; callers never need to special-case it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl Cache for NoopCache {
    fn get_range(&self, _key: &str, _start: usize, _count: usize) -> Result<Vec<Value>, CacheError> {
        Ok(Vec::new())
    }

    fn append(&self, _key: &str, _values: &[Value], _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn set_meta(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn get_meta(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Ok(None)
    }

    fn expire(&self, _key: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}
