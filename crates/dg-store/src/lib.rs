//! Keyed blob storage with per-entry TTL (spec §4.2).
//!
//! `game:<roomCode>` holds serialized `GameState`, refreshed to a 24h TTL on
//! every write; `reconnect:<token>` holds a `ReconnectToken`, also 24h. The
//! contract is backend-agnostic: [`MemoryStore`] is the always-available
//! in-process fallback, and the optional `redis` feature adds
//! [`RedisStore`], a thin wrapper that degrades to the in-process map if the
//! remote backend is unreachable (spec §4.2, §7 Infrastructure errors).
mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::*;
#[cfg(feature = "redis")]
pub use redis_store::*;

use std::time::Duration;

/// Storage contract used by the room registry and engine. Implementors must
/// enforce the given TTL themselves; there is no background sweep expected
/// of callers.
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl: Duration);
    async fn delete(&self, key: &str);
}

/// Builds the `game:<roomCode>` key.
pub fn game_key(room_code: &str) -> String {
    format!("game:{}", room_code)
}

/// Builds the `reconnect:<token>` key.
pub fn reconnect_key(token: &str) -> String {
    format!("reconnect:{}", token)
}
