use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache key for the rendered landing feed. Deliberately independent of
/// query parameters; readers within the interval share one body.
pub const INDEX_FEED_KEY: &str = "index_feed";

/// Process-wide cache of rendered response bodies with a fixed expiry
/// interval. Writers never invalidate it synchronously; bounded staleness is
/// part of the contract.
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    body: String,
    stored_at: Instant,
}

impl ResponseCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        (entry.stored_at.elapsed() < self.ttl).then(|| entry.body.clone())
    }

    pub async fn put(&self, key: &str, body: String) {
        let entry = CacheEntry {
            body,
            stored_at: Instant::now(),
        };
        self.entries.write().await.insert(key.to_owned(), entry);
    }

    /// Forces recomputation on the next read. Reachable for operators and
    /// tests through `POST /internal/cache/clear`.
    pub async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::ResponseCache;
    use std::time::Duration;

    #[tokio::test]
    async fn serves_the_stored_body_until_expiry() {
        let cache = ResponseCache::new(Duration::from_secs(20));

        cache.put("feed", "body".to_owned()).await;
        assert_eq!(cache.get("feed").await.as_deref(), Some("body"));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn expires_after_the_interval() {
        let cache = ResponseCache::new(Duration::from_millis(20));

        cache.put("feed", "body".to_owned()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.get("feed").await, None);
    }

    #[tokio::test]
    async fn invalidate_forces_recomputation() {
        let cache = ResponseCache::new(Duration::from_secs(20));

        cache.put("feed", "stale".to_owned()).await;
        cache.invalidate("feed").await;
        assert_eq!(cache.get("feed").await, None);

        cache.put("feed", "fresh".to_owned()).await;
        assert_eq!(cache.get("feed").await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn clear_drops_every_entry() {
        let cache = ResponseCache::new(Duration::from_secs(20));

        cache.put("one", "1".to_owned()).await;
        cache.put("two", "2".to_owned()).await;
        cache.clear().await;

        assert_eq!(cache.get("one").await, None);
        assert_eq!(cache.get("two").await, None);
    }

    #[tokio::test]
    async fn newer_put_replaces_the_body() {
        let cache = ResponseCache::new(Duration::from_secs(20));

        cache.put("feed", "old".to_owned()).await;
        cache.put("feed", "new".to_owned()).await;
        assert_eq!(cache.get("feed").await.as_deref(), Some("new"));
    }
}
