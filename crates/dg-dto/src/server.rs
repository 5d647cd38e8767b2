use dg_core::Seconds;
use dg_registry::GameConfig;
use dg_registry::GameState;
use dg_registry::Phase;
use dg_registry::PlayerId;
use dg_registry::RoomCode;
use dg_registry::RoundResult;
use dg_registry::SetResult;
use serde::Serialize;

use crate::error_code::ErrorCode;

/// A player's initial 2d6 roll, reported alongside the turn order it
/// produced (spec §4.4 INITIAL_ROLL, §6 `game:initialRoll`).
#[derive(Debug, Clone, Serialize)]
pub struct InitialRollEntry {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub roll: u32,
}

/// One player's final cumulative score at `GAME_OVER` (spec §6 `game:over`).
#[derive(Debug, Clone, Serialize)]
pub struct Standing {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    pub score: f64,
}

/// Messages sent from the session gateway to a client over its socket (spec
/// §6, server → client list). Modeled on the teacher's tagged
/// `ServerMessage`: one `#[serde(tag = "type")]` enum, camelCase payload
/// fields, one variant per wire event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "room:created")]
    RoomCreated {
        #[serde(rename = "roomCode")]
        room_code: RoomCode,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "reconnectToken")]
        reconnect_token: String,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "room:joined")]
    RoomJoined {
        #[serde(rename = "roomCode")]
        room_code: RoomCode,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "reconnectToken")]
        reconnect_token: String,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "room:playerJoined")]
    RoomPlayerJoined {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "room:playerLeft")]
    RoomPlayerLeft {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "room:error")]
    RoomError { message: String, code: ErrorCode },
    #[serde(rename = "room:configUpdated")]
    RoomConfigUpdated {
        config: GameConfig,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "room:hostChanged")]
    RoomHostChanged {
        #[serde(rename = "hostId")]
        host_id: PlayerId,
    },
    #[serde(rename = "game:stateUpdate")]
    GameStateUpdate {
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "game:phaseChange")]
    GamePhaseChange {
        phase: Phase,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "game:turnStart")]
    GameTurnStart {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "timeRemaining")]
        time_remaining: Seconds,
    },
    #[serde(rename = "game:timerTick")]
    GameTimerTick {
        #[serde(rename = "timeRemaining")]
        time_remaining: Seconds,
    },
    #[serde(rename = "game:initialRoll")]
    GameInitialRoll {
        results: Vec<InitialRollEntry>,
        #[serde(rename = "turnOrder")]
        turn_order: Vec<PlayerId>,
    },
    #[serde(rename = "prediction:submitted")]
    PredictionSubmitted {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    #[serde(rename = "prediction:allSubmitted")]
    PredictionAllSubmitted,
    #[serde(rename = "prediction:autoSubmitting")]
    PredictionAutoSubmitting { countdown: Seconds },
    #[serde(rename = "dice:selected")]
    DiceSelected {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "visibleDice")]
        visible_dice: Vec<u32>,
        #[serde(rename = "hiddenCount")]
        hidden_count: usize,
    },
    #[serde(rename = "dice:confirmed")]
    DiceConfirmed {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    #[serde(rename = "set:reveal")]
    SetReveal {
        results: Vec<SetResult>,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "round:complete")]
    RoundComplete {
        result: RoundResult,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    #[serde(rename = "game:over")]
    GameOver {
        #[serde(rename = "finalStandings")]
        final_standings: Vec<Standing>,
    },
    #[serde(rename = "results:acknowledged")]
    ResultsAcknowledged {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "acknowledgedCount")]
        acknowledged_count: usize,
        #[serde(rename = "totalCount")]
        total_count: usize,
    },
    #[serde(rename = "results:waitingFor")]
    ResultsWaitingFor {
        #[serde(rename = "waitingForPlayerIds")]
        waiting_for_player_ids: Vec<PlayerId>,
    },
    #[serde(rename = "player:disconnected")]
    PlayerDisconnected {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    #[serde(rename = "player:reconnected")]
    PlayerReconnected {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    #[serde(rename = "reconnect:success")]
    ReconnectSuccess {
        #[serde(rename = "gameState")]
        game_state: GameState,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    #[serde(rename = "reconnect:failed")]
    ReconnectFailed { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::RoomError {
            message: message.into(),
            code,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_variant_serializes_with_only_a_type_tag() {
        let json = ServerMessage::PredictionAllSubmitted.to_json();
        assert_eq!(json, r#"{"type":"prediction:allSubmitted"}"#);
    }

    #[test]
    fn error_message_uses_screaming_snake_case_code() {
        let json = ServerMessage::error("room is full", ErrorCode::RoomFull).to_json();
        assert!(json.contains(r#""code":"ROOM_FULL""#));
        assert!(json.contains(r#""type":"room:error""#));
    }

    #[test]
    fn field_names_are_camel_case_on_the_wire() {
        let json = ServerMessage::GameTimerTick { time_remaining: 12 }.to_json();
        assert_eq!(json, r#"{"type":"game:timerTick","timeRemaining":12}"#);
    }
}
