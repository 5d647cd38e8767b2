use std::fmt;

/// Named rule violations surfaced by [`crate::apply_event`] (spec §4.4,
/// §7 Rule errors). These never mutate state and are returned only to the
/// client whose event triggered them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    InvalidPhase,
    NotYourTurn,
    InvalidSelection,
    InvalidDie,
    DieAlreadySpent,
    NoSelection,
    AlreadyConfirmed,
    PredictionAlreadySubmitted,
    PlayerNotFound,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPhase => write!(f, "that action is not valid in the current phase"),
            Self::NotYourTurn => write!(f, "it is not your turn"),
            Self::InvalidSelection => write!(f, "selection must be exactly three dice"),
            Self::InvalidDie => write!(f, "one or more selected dice are not yours"),
            Self::DieAlreadySpent => write!(f, "one or more selected dice are already spent"),
            Self::NoSelection => write!(f, "no selection exists to confirm"),
            Self::AlreadyConfirmed => write!(f, "selection is already confirmed"),
            Self::PredictionAlreadySubmitted => write!(f, "prediction already submitted"),
            Self::PlayerNotFound => write!(f, "player not found in room"),
        }
    }
}

impl std::error::Error for EngineError {}
