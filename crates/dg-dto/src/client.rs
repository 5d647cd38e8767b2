use dg_registry::GameConfigOverrides;
use dg_scoring::Prediction;
use serde::Deserialize;

/// Messages received from a client over the session gateway's socket (spec
/// §6, client → server table). Field names are camelCase on the wire;
/// `#[serde(tag = "type")]` dispatches on the `type` discriminant the same
/// way the teacher's `ServerMessage` tags its outbound enum, just inbound.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "room:create")]
    RoomCreate {
        #[serde(rename = "playerName")]
        player_name: String,
        #[serde(default)]
        config: Option<GameConfigOverrides>,
    },
    #[serde(rename = "room:join")]
    RoomJoin {
        #[serde(rename = "roomCode")]
        room_code: String,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    #[serde(rename = "room:leave")]
    RoomLeave,
    #[serde(rename = "room:reconnect")]
    RoomReconnect { token: String },
    #[serde(rename = "game:ready")]
    GameReady,
    #[serde(rename = "game:unready")]
    GameUnready,
    #[serde(rename = "game:updateConfig")]
    GameUpdateConfig { config: GameConfigOverrides },
    #[serde(rename = "game:start")]
    GameStart,
    #[serde(rename = "prediction:submit")]
    PredictionSubmit {
        #[serde(rename = "type")]
        prediction: Prediction,
    },
    #[serde(rename = "dice:select")]
    DiceSelect {
        #[serde(rename = "dieIds")]
        die_ids: Vec<u32>,
    },
    #[serde(rename = "dice:confirm")]
    DiceConfirm,
    #[serde(rename = "game:acknowledgeResults")]
    GameAcknowledgeResults,
}

impl ClientMessage {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_create_parses_camel_case_fields() {
        let msg: ClientMessage =
            ClientMessage::from_json(r#"{"type":"room:create","playerName":"Ada"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::RoomCreate { player_name, config: None } if player_name == "Ada"));
    }

    #[test]
    fn dice_select_parses_die_ids() {
        let msg: ClientMessage =
            ClientMessage::from_json(r#"{"type":"dice:select","dieIds":[1,2,3]}"#).unwrap();
        assert!(matches!(msg, ClientMessage::DiceSelect { die_ids } if die_ids == vec![1, 2, 3]));
    }

    #[test]
    fn unit_variants_parse_without_payload() {
        assert!(matches!(
            ClientMessage::from_json(r#"{"type":"room:leave"}"#).unwrap(),
            ClientMessage::RoomLeave
        ));
        assert!(matches!(
            ClientMessage::from_json(r#"{"type":"dice:confirm"}"#).unwrap(),
            ClientMessage::DiceConfirm
        ));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(ClientMessage::from_json(r#"{"type":"bogus"}"#).is_err());
    }
}
