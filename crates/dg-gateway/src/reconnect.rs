use dg_registry::PlayerId;
use dg_registry::ReconnectToken;
use dg_registry::RoomCode;
use dg_store::reconnect_key;
use dg_store::StateStore;

/// Issues a fresh reconnect token for `player` in `room_code` and persists
/// it to the state store with the spec's 24h TTL (spec §3 ReconnectToken,
/// §4.2 `reconnect:<token>` key, §6 "each write resets TTL to 24h").
pub async fn issue(
    store: &dyn StateStore,
    player_id: PlayerId,
    room_code: RoomCode,
) -> ReconnectToken {
    let token = ReconnectToken {
        token: uuid::Uuid::now_v7().to_string(),
        player_id,
        room_code,
        expires_at: dg_registry::now_unix() + dg_core::STATE_TTL.as_secs(),
    };
    store
        .set(
            &reconnect_key(&token.token),
            serde_json::to_string(&token).expect("serialize reconnect token"),
            dg_core::STATE_TTL,
        )
        .await;
    token
}

/// Looks up and validates a reconnect token: it must exist in the store and
/// not be past its own `expires_at` (independent of the store's own TTL
/// sweep, since a store's TTL enforcement can lag the stamped deadline by
/// write-order races). Returns the player/room identity on success (spec
/// §4.6 reconnect flow).
pub async fn redeem(store: &dyn StateStore, token: &str) -> Option<ReconnectToken> {
    let raw = store.get(&reconnect_key(token)).await?;
    let parsed: ReconnectToken = serde_json::from_str(&raw).ok()?;
    if parsed.expires_at < dg_registry::now_unix() {
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_store::MemoryStore;

    #[tokio::test]
    async fn issued_token_redeems_to_same_identity() {
        let store = MemoryStore::new();
        let player_id = PlayerId::default();
        let token = issue(&store, player_id, "ABC123".to_string()).await;
        let redeemed = redeem(&store, &token.token).await.unwrap();
        assert_eq!(redeemed.player_id, player_id);
        assert_eq!(redeemed.room_code, "ABC123");
    }

    #[tokio::test]
    async fn unknown_token_fails_to_redeem() {
        let store = MemoryStore::new();
        assert!(redeem(&store, "bogus").await.is_none());
    }

    #[tokio::test]
    async fn expired_token_fails_to_redeem() {
        let store = MemoryStore::new();
        let token = ReconnectToken {
            token: "tok".into(),
            player_id: PlayerId::default(),
            room_code: "ABC123".into(),
            expires_at: 0,
        };
        store
            .set(
                &reconnect_key(&token.token),
                serde_json::to_string(&token).unwrap(),
                dg_core::STATE_TTL,
            )
            .await;
        assert!(redeem(&store, "tok").await.is_none());
    }
}
