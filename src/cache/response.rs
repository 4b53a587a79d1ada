//! Cache-aside lookups with a time-to-live
//!
//! `ResponseCache` sits in front of a `CacheStore`. A lookup returns the stored
//! response while it is fresh; otherwise it runs the caller's fetch and, only
//! if the fetch succeeds, stores the response body as received.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::store::{CacheEntry, CacheError, CacheStore, Collection};

/// Default freshness window for cached responses, in seconds
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Result of reading from the cache, including freshness metadata
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached value
    pub data: T,
    /// When the value was stored
    pub stored_at: DateTime<Utc>,
    /// Whether the value is still within its TTL
    pub is_fresh: bool,
}

/// Returns true iff an entry stored at `stored_at` is fresh at `now`
pub fn is_fresh(stored_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    now - stored_at < ttl
}

/// A TTL cache over a shared store
///
/// Cloning is cheap and every clone shares the same store. Stale entries are
/// never removed here; they are replaced by the next successful fetch.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache").field("ttl", &self.ttl).finish()
    }
}

impl ResponseCache {
    /// Creates a cache over `store` with the default 5 minute TTL
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(store, Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Reads an entry regardless of freshness
    ///
    /// Returns `None` if nothing is stored under `key` or the stored value no
    /// longer decodes as `T`.
    pub fn read<T: DeserializeOwned>(&self, collection: Collection, key: &str) -> Option<CachedData<T>> {
        let entry = self.store.read(collection, key)?;
        let data = serde_json::from_value(entry.value).ok()?;

        Some(CachedData {
            data,
            stored_at: entry.stored_at,
            is_fresh: is_fresh(entry.stored_at, Utc::now(), self.ttl),
        })
    }

    /// Stores `value` under `key`, stamped with the current time
    pub fn write<T: Serialize>(&self, collection: Collection, key: &str, value: &T) -> Result<(), CacheError> {
        let entry = CacheEntry {
            key: key.to_string(),
            value: serde_json::to_value(value)?,
            stored_at: Utc::now(),
        };
        self.store.write(collection, &entry)
    }

    /// Returns the fresh cached value for `key`, or fetches and stores it
    ///
    /// `fetch` yields the raw response body. It is stored unchanged, so fields
    /// `T` does not model survive in the cache. A body that does not decode as
    /// `T` counts as a failed fetch.
    ///
    /// Any fetch error is logged and collapsed into `None`; the existing entry,
    /// stale or not, is left untouched. A failure to persist a successfully
    /// fetched value is logged but the value is still returned.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, collection: Collection, key: &str, fetch: F) -> Option<T>
    where
        T: DeserializeOwned,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(cached) = self.read::<T>(collection, key) {
            if cached.is_fresh {
                debug!(collection = collection.name(), key, "cache hit");
                return Some(cached.data);
            }
            debug!(collection = collection.name(), key, stored_at = %cached.stored_at, "cache stale");
        } else {
            debug!(collection = collection.name(), key, "cache miss");
        }

        let body = match fetch().await {
            Ok(body) => body,
            Err(e) => {
                warn!(collection = collection.name(), key, error = %e, "fetch failed");
                return None;
            }
        };

        let data = match serde_json::from_value::<T>(body.clone()) {
            Ok(data) => data,
            Err(e) => {
                warn!(collection = collection.name(), key, error = %e, "unexpected response body");
                return None;
            }
        };

        match self.write(collection, key, &body) {
            Ok(()) => debug!(collection = collection.name(), key, "cache saved"),
            Err(e) => warn!(collection = collection.name(), key, error = %e, "failed to save cache entry"),
        }
        Some(data)
    }
}
