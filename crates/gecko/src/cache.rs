//! In-memory response cache keyed by full request URL.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    body: serde_json::Value,
}

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh entry for `key`, if one was stored less than `ttl` ago.
    pub async fn get(&self, key: &str, ttl: Duration) -> Option<serde_json::Value> {
        if ttl.is_zero() {
            return None;
        }

        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(e) if e.stored_at.elapsed() < ttl => return Some(e.body.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    pub async fn put(&self, key: String, body: serde_json::Value) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                body,
            },
        );
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = ResponseCache::new();
        cache.put("k".into(), json!({"a": 1})).await;

        assert_eq!(cache.get("k", Duration::from_secs(60)).await, Some(json!({"a": 1})));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("k", Duration::from_secs(60)).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn zero_ttl_never_hits() {
        let cache = ResponseCache::new();
        cache.put("k".into(), json!(1)).await;
        assert_eq!(cache.get("k", Duration::ZERO).await, None);
    }
}
