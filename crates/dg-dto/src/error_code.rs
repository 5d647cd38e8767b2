use serde::Deserialize;
use serde::Serialize;

/// Stable machine-readable error codes (spec §7 taxonomy, rule errors).
/// Carried in `room:error{message, code}` and never used to drive client
/// logic beyond display and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RoomNotFound,
    RoomFull,
    NameTaken,
    NotHost,
    GameInProgress,
    CannotStart,
    PlayerNotFound,
    GameNotFound,
    InvalidPhase,
    NotYourTurn,
    InvalidSelection,
    InvalidDie,
    DieAlreadySpent,
    NoSelection,
    AlreadyConfirmed,
    PredictionAlreadySubmitted,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
