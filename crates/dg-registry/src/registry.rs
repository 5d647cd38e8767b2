use crate::error::RegistryError;
use crate::model::GameConfig;
use crate::model::GameConfigOverrides;
use crate::model::GameState;
use crate::model::Phase;
use crate::model::PlayerId;
use crate::model::PlayerState;
use crate::model::RoomCode;
use crate::model::SessionHandle;
use dg_core::ROOM_CODE_ALPHABET;
use dg_core::ROOM_CODE_LEN;
use rand::Rng;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory registry of active rooms, keyed by room code (spec §4.3). This
/// is the lobby-phase counterpart to the engine's in-game transitions: both
/// act on the same [`GameState`], so a room handed off from the registry to
/// the engine at `game:start` carries no translation step.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomCode, GameState>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new room with `host` seated alone, returning the generated
    /// room code and the freshly created state.
    pub async fn create_room(
        &self,
        host_name: String,
        host_session: SessionHandle,
        config_overrides: GameConfigOverrides,
    ) -> (RoomCode, PlayerId, GameState) {
        let config = GameConfig::default().merged(config_overrides);
        let host = PlayerState::new(host_name, host_session, true);
        let host_id = host.id;
        let mut rooms = self.rooms.write().await;
        let code = generate_unique_code(&rooms);
        let state = GameState::new(code.clone(), host, config);
        rooms.insert(code.clone(), state.clone());
        (code, host_id, state)
    }

    /// Seats a new player into an existing lobby-phase room.
    pub async fn join_room(
        &self,
        room_code: &str,
        name: String,
        session: SessionHandle,
    ) -> Result<(PlayerId, GameState), RegistryError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_code).ok_or(RegistryError::RoomNotFound)?;
        if room.phase != Phase::Lobby {
            return Err(RegistryError::GameInProgress);
        }
        if room.players.len() >= room.config.max_players {
            return Err(RegistryError::RoomFull);
        }
        if room.name_taken(&name) {
            return Err(RegistryError::NameTaken);
        }
        let player = PlayerState::new(name, session, false);
        let player_id = player.id;
        room.players.push(player);
        Ok((player_id, room.clone()))
    }

    /// Removes a player from a lobby-phase room. If the host leaves, the
    /// oldest remaining player is promoted. Returns `None` if the room was
    /// emptied and removed outright.
    pub async fn leave_room(
        &self,
        room_code: &str,
        player_id: PlayerId,
    ) -> Result<Option<GameState>, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_code).ok_or(RegistryError::RoomNotFound)?;
        room.players.retain(|p| p.id != player_id);
        if room.players.is_empty() {
            rooms.remove(room_code);
            return Ok(None);
        }
        if room.host_id == player_id {
            let new_host = room.players.first_mut().expect("non-empty checked above");
            new_host.host = true;
            room.host_id = new_host.id;
        }
        Ok(Some(room.clone()))
    }

    /// Applies a partial config change. Rejected once the game has left the
    /// lobby, since round/timer bounds are read once at `game:start`.
    pub async fn update_config(
        &self,
        room_code: &str,
        requester: PlayerId,
        overrides: GameConfigOverrides,
    ) -> Result<GameState, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_code).ok_or(RegistryError::RoomNotFound)?;
        if room.host_id != requester {
            return Err(RegistryError::NotHost);
        }
        if room.phase != Phase::Lobby {
            return Err(RegistryError::GameInProgress);
        }
        room.config = room.config.merged(overrides);
        Ok(room.clone())
    }

    /// Flips a player's ready flag. Lobby-phase only (spec §6 `game:ready` /
    /// `game:unready` constraint table).
    pub async fn set_player_ready(
        &self,
        room_code: &str,
        player_id: PlayerId,
        ready: bool,
    ) -> Result<GameState, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_code).ok_or(RegistryError::RoomNotFound)?;
        if room.phase != Phase::Lobby {
            return Err(RegistryError::GameInProgress);
        }
        let player = room
            .player_mut(player_id)
            .ok_or(RegistryError::PlayerNotFound)?;
        player.ready = ready;
        Ok(room.clone())
    }

    /// Checks whether a room satisfies the start conditions (spec §4.3):
    /// at least two players, and every non-host player ready. The host's own
    /// ready flag is not consulted — starting the game is itself their
    /// affirmative action.
    pub fn can_start(room: &GameState) -> Result<(), RegistryError> {
        if room.players.len() < dg_core::MIN_PLAYERS {
            return Err(RegistryError::CannotStart("not enough players"));
        }
        let all_ready = room
            .players
            .iter()
            .filter(|p| !p.host)
            .all(|p| p.ready);
        if !all_ready {
            return Err(RegistryError::CannotStart("not all players are ready"));
        }
        Ok(())
    }

    /// Transitions a room out of the lobby. Validates host + readiness, then
    /// hands the mutated state back to the caller (the engine takes it from
    /// here). Leaves `phase` at `INITIAL_ROLL`; dealing dice and computing
    /// the initial turn order is the engine's job, not the registry's.
    pub async fn start_game(
        &self,
        room_code: &str,
        requester: PlayerId,
    ) -> Result<GameState, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_code).ok_or(RegistryError::RoomNotFound)?;
        if room.host_id != requester {
            return Err(RegistryError::NotHost);
        }
        if room.phase != Phase::Lobby {
            return Err(RegistryError::GameInProgress);
        }
        Self::can_start(room)?;
        room.phase = Phase::InitialRoll;
        room.current_round = 1;
        Ok(room.clone())
    }

    /// Marks a player's socket as disconnected without removing their seat,
    /// so an in-progress game can wait for reconnection (spec §4.6).
    pub async fn mark_disconnected(
        &self,
        room_code: &str,
        player_id: PlayerId,
    ) -> Result<GameState, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_code).ok_or(RegistryError::RoomNotFound)?;
        let player = room
            .player_mut(player_id)
            .ok_or(RegistryError::PlayerNotFound)?;
        player.connected = false;
        Ok(room.clone())
    }

    /// Restores a player's connected flag and swaps in their new session
    /// handle after a successful reconnect-token redemption.
    pub async fn mark_reconnected(
        &self,
        room_code: &str,
        player_id: PlayerId,
        session: SessionHandle,
    ) -> Result<GameState, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(room_code).ok_or(RegistryError::RoomNotFound)?;
        let player = room
            .player_mut(player_id)
            .ok_or(RegistryError::PlayerNotFound)?;
        player.connected = true;
        player.session = session;
        Ok(room.clone())
    }

    pub async fn get(&self, room_code: &str) -> Option<GameState> {
        self.rooms.read().await.get(room_code).cloned()
    }

    /// Overwrites a room's state wholesale. Used by the engine after it
    /// advances a room's phase, and by recovery code restoring a room from
    /// [`dg_store`].
    pub async fn put(&self, state: GameState) {
        self.rooms.write().await.insert(state.room_code.clone(), state);
    }

    pub async fn remove(&self, room_code: &str) -> Option<GameState> {
        self.rooms.write().await.remove(room_code)
    }

    pub async fn room_codes(&self) -> Vec<RoomCode> {
        self.rooms.read().await.keys().cloned().collect()
    }
}

fn generate_unique_code(existing: &HashMap<RoomCode, GameState>) -> RoomCode {
    let mut rng = rand::rng();
    loop {
        let code: String = (0..ROOM_CODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
                ROOM_CODE_ALPHABET.as_bytes()[idx] as char
            })
            .collect();
        if !existing.contains_key(&code) {
            return code;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_join_seats_second_player() {
        let registry = RoomRegistry::new();
        let (code, host_id, state) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        assert_eq!(state.players.len(), 1);
        assert_eq!(state.host_id, host_id);

        let (guest_id, state) = registry
            .join_room(&code, "Bob".into(), "sess-2".into())
            .await
            .unwrap();
        assert_eq!(state.players.len(), 2);
        assert_ne!(guest_id, host_id);
    }

    #[tokio::test]
    async fn join_rejects_duplicate_name_case_insensitive() {
        let registry = RoomRegistry::new();
        let (code, _, _) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        let err = registry
            .join_room(&code, "alice".into(), "sess-2".into())
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::NameTaken);
    }

    #[tokio::test]
    async fn join_rejects_full_room() {
        let registry = RoomRegistry::new();
        let overrides = GameConfigOverrides {
            max_players: Some(2),
            ..Default::default()
        };
        let (code, _, _) = registry
            .create_room("Alice".into(), "sess-1".into(), overrides)
            .await;
        registry
            .join_room(&code, "Bob".into(), "sess-2".into())
            .await
            .unwrap();
        let err = registry
            .join_room(&code, "Cara".into(), "sess-3".into())
            .await
            .unwrap_err();
        assert_eq!(err, RegistryError::RoomFull);
    }

    #[tokio::test]
    async fn leaving_host_promotes_next_player() {
        let registry = RoomRegistry::new();
        let (code, host_id, _) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        let (guest_id, _) = registry
            .join_room(&code, "Bob".into(), "sess-2".into())
            .await
            .unwrap();
        let state = registry.leave_room(&code, host_id).await.unwrap().unwrap();
        assert_eq!(state.host_id, guest_id);
        assert!(state.player(guest_id).unwrap().host);
    }

    #[tokio::test]
    async fn leaving_last_player_removes_room() {
        let registry = RoomRegistry::new();
        let (code, host_id, _) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        let result = registry.leave_room(&code, host_id).await.unwrap();
        assert!(result.is_none());
        assert!(registry.get(&code).await.is_none());
    }

    #[tokio::test]
    async fn start_requires_all_non_host_ready() {
        let registry = RoomRegistry::new();
        let (code, host_id, _) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        let (guest_id, _) = registry
            .join_room(&code, "Bob".into(), "sess-2".into())
            .await
            .unwrap();
        let err = registry.start_game(&code, host_id).await.unwrap_err();
        assert_eq!(err, RegistryError::CannotStart("not all players are ready"));

        registry.set_player_ready(&code, guest_id, true).await.unwrap();
        let state = registry.start_game(&code, host_id).await.unwrap();
        assert_eq!(state.phase, Phase::InitialRoll);
    }

    #[tokio::test]
    async fn only_host_can_start() {
        let registry = RoomRegistry::new();
        let (code, _, _) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        let (guest_id, _) = registry
            .join_room(&code, "Bob".into(), "sess-2".into())
            .await
            .unwrap();
        let err = registry.start_game(&code, guest_id).await.unwrap_err();
        assert_eq!(err, RegistryError::NotHost);
    }

    #[tokio::test]
    async fn set_ready_rejected_once_game_has_started() {
        let registry = RoomRegistry::new();
        let (code, host_id, _) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        let (guest_id, _) = registry
            .join_room(&code, "Bob".into(), "sess-2".into())
            .await
            .unwrap();
        registry.set_player_ready(&code, guest_id, true).await.unwrap();
        registry.start_game(&code, host_id).await.unwrap();
        let err = registry.set_player_ready(&code, guest_id, false).await.unwrap_err();
        assert_eq!(err, RegistryError::GameInProgress);
    }

    #[tokio::test]
    async fn disconnect_then_reconnect_swaps_session() {
        let registry = RoomRegistry::new();
        let (code, host_id, _) = registry
            .create_room("Alice".into(), "sess-1".into(), GameConfigOverrides::default())
            .await;
        registry.mark_disconnected(&code, host_id).await.unwrap();
        assert!(!registry.get(&code).await.unwrap().player(host_id).unwrap().connected);
        let state = registry
            .mark_reconnected(&code, host_id, "sess-1-new".into())
            .await
            .unwrap();
        let player = state.player(host_id).unwrap();
        assert!(player.connected);
        assert_eq!(player.session, "sess-1-new");
    }
}
