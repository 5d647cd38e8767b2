use dg_registry::PlayerId;
use dg_registry::RoomCode;
use dg_registry::SessionHandle;

/// Per-connection state the gateway tracks for one socket (spec §4.6: "the
/// gateway... maintains per-session state `{playerId?, roomCode?,
/// reconnectToken?}`"). Held independently of [`dg_registry::PlayerState`]
/// because a session exists from the moment a socket connects, before it
/// has joined any room.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    pub player_id: Option<PlayerId>,
    pub room_code: Option<RoomCode>,
    pub reconnect_token: Option<String>,
}

/// Validates `room:create`/`room:join` player names (spec §6: "1-20
/// chars"). Whitespace is not specially trimmed; an all-whitespace name of
/// valid length is accepted, matching the teacher's general pattern of
/// leaving cosmetic validation to the client.
pub fn valid_player_name(name: &str) -> bool {
    let len = name.chars().count();
    (1..=20).contains(&len)
}

/// Validates a `room:join` room code: exactly 6 chars, uppercase
/// alphanumeric (spec §6). The code's own alphabet (excluding
/// `0/O/1/I/L`) is enforced at generation time in `dg-registry`, not here;
/// this check only rejects the wire shape.
pub fn valid_room_code(code: &str) -> bool {
    code.chars().count() == dg_core::ROOM_CODE_LEN
        && code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_name_bounds() {
        assert!(!valid_player_name(""));
        assert!(valid_player_name("A"));
        assert!(valid_player_name(&"A".repeat(20)));
        assert!(!valid_player_name(&"A".repeat(21)));
    }

    #[test]
    fn room_code_must_be_six_uppercase_alnum_chars() {
        assert!(valid_room_code("7K9XQM"));
        assert!(!valid_room_code("7k9xqm"));
        assert!(!valid_room_code("7K9XQ"));
        assert!(!valid_room_code("7K9-XQ"));
    }
}
