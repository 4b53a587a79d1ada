//! Cache module for storing API responses locally
//!
//! This module provides a cache-aside layer that persists API responses in a
//! key-value store with a time-to-live. Fresh entries are served without a
//! network call; stale or missing entries are refetched and overwritten only
//! when the fetch succeeds.

mod response;
mod store;

pub use response::{is_fresh, CachedData, ResponseCache, DEFAULT_TTL_SECS};
pub use store::{CacheEntry, CacheError, CacheStore, Collection, FileStore, MemoryStore};
