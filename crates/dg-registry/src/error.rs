use std::fmt;

/// Errors surfaced by [`crate::RoomRegistry`] operations (spec §7 Validation
/// errors, room-lifecycle subset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    RoomNotFound,
    GameInProgress,
    RoomFull,
    NameTaken,
    PlayerNotFound,
    NotHost,
    CannotStart(&'static str),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomNotFound => write!(f, "room not found"),
            Self::GameInProgress => write!(f, "game already in progress"),
            Self::RoomFull => write!(f, "room is full"),
            Self::NameTaken => write!(f, "name already taken in this room"),
            Self::PlayerNotFound => write!(f, "player not found in room"),
            Self::NotHost => write!(f, "only the host can do that"),
            Self::CannotStart(reason) => write!(f, "cannot start game: {}", reason),
        }
    }
}

impl std::error::Error for RegistryError {}
