//! Listing cache with TTL-based expiry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// A cache for rendered listing payloads.
///
/// Catalog mutations call `invalidate` for the affected keys; entries also
/// expire on their own after the TTL given at `put`.
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Gets a cached value, if present and not expired.
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Stores a value under `key` for at most `ttl`.
    async fn put(&self, key: &str, value: serde_json::Value, ttl: Duration);

    /// Drops the entry for `key`, if any.
    async fn invalidate(&self, key: &str);
}

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

/// In-memory TTL cache.
#[derive(Clone, Default)]
pub struct InMemoryListingCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including ones that expired but were not yet read.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ListingCache for InMemoryListingCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    metrics::counter!("listing_cache_hits").increment(1);
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    metrics::counter!("listing_cache_misses").increment(1);
                    return None;
                }
            }
        }

        // Expired: drop it on the way out.
        self.entries.write().await.remove(key);
        metrics::counter!("listing_cache_misses").increment(1);
        None
    }

    async fn put(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        self.entries.write().await.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}
