use crate::MemoryStore;
use crate::StateStore;
use std::time::Duration;

/// Redis-backed store that falls back to an in-process [`MemoryStore`]
/// whenever the remote connection is unreachable (spec §4.2, §7). The
/// switch back to Redis is opportunistic: every call retries the remote
/// connection rather than latching into degraded mode permanently.
pub struct RedisStore {
    client: redis::Client,
    fallback: MemoryStore,
}

impl RedisStore {
    /// Builds a store against the given `REDIS_URL`-style DSN. Connection
    /// failures are not fatal here; they surface lazily on first use and
    /// trigger the in-process fallback.
    pub fn new(dsn: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: redis::Client::open(dsn)?,
            fallback: MemoryStore::new(),
        })
    }

    async fn connection(&self) -> Option<redis::aio::MultiplexedConnection> {
        match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                log::warn!("redis unreachable, degrading to in-process store: {}", e);
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl StateStore for RedisStore {
    async fn get(&self, key: &str) -> Option<String> {
        use redis::AsyncCommands;
        match self.connection().await {
            Some(mut conn) => match conn.get::<_, Option<String>>(key).await {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("redis GET {} failed, falling back: {}", key, e);
                    self.fallback.get(key).await
                }
            },
            None => self.fallback.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        use redis::AsyncCommands;
        match self.connection().await {
            Some(mut conn) => {
                let result: redis::RedisResult<()> =
                    conn.set_ex(key, &value, ttl.as_secs().max(1)).await;
                if let Err(e) = result {
                    log::warn!("redis SET {} failed, falling back: {}", key, e);
                    self.fallback.set(key, value, ttl).await;
                }
            }
            None => self.fallback.set(key, value, ttl).await,
        }
    }

    async fn delete(&self, key: &str) {
        use redis::AsyncCommands;
        match self.connection().await {
            Some(mut conn) => {
                let result: redis::RedisResult<()> = conn.del(key).await;
                if let Err(e) = result {
                    log::warn!("redis DEL {} failed, falling back: {}", key, e);
                }
            }
            None => {}
        }
        self.fallback.delete(key).await;
    }
}
