use crate::StateStore;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;
use tokio::sync::RwLock;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process fallback store. TTLs are enforced lazily: an expired entry is
/// treated as absent on `get` and is swept from the map at that point.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let hit = {
            let entries = self.entries.read().await;
            entries.get(key).map(|e| (e.value.clone(), e.expires_at))
        };
        match hit {
            Some((value, expires_at)) if expires_at > now => Some(value),
            Some(_) => {
                self.entries.write().await.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let store = MemoryStore::new();
        store
            .set("game:ABC123", "{}".to_string(), Duration::from_secs(60))
            .await;
        assert_eq!(store.get("game:ABC123").await, Some("{}".to_string()));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let store = MemoryStore::new();
        store
            .set("reconnect:tok", "x".to_string(), Duration::from_millis(1))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("reconnect:tok").await, None);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let store = MemoryStore::new();
        store
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await;
        store.delete("k").await;
        assert_eq!(store.get("k").await, None);
    }

    #[tokio::test]
    async fn write_resets_ttl() {
        let store = MemoryStore::new();
        store
            .set("k", "v1".to_string(), Duration::from_millis(5))
            .await;
        store
            .set("k", "v2".to_string(), Duration::from_secs(60))
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("k").await, Some("v2".to_string()));
    }
}
