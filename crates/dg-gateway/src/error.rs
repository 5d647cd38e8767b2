use dg_dto::ErrorCode;
use dg_engine::EngineError;
use dg_registry::RegistryError;

/// Maps a [`RegistryError`] to the stable wire code clients key their UI
/// off of (spec §7 taxonomy). The human-readable message still comes from
/// the error's own `Display` impl.
pub fn registry_error_code(err: &RegistryError) -> ErrorCode {
    match err {
        RegistryError::RoomNotFound => ErrorCode::RoomNotFound,
        RegistryError::GameInProgress => ErrorCode::GameInProgress,
        RegistryError::RoomFull => ErrorCode::RoomFull,
        RegistryError::NameTaken => ErrorCode::NameTaken,
        RegistryError::PlayerNotFound => ErrorCode::PlayerNotFound,
        RegistryError::NotHost => ErrorCode::NotHost,
        RegistryError::CannotStart(_) => ErrorCode::CannotStart,
    }
}

/// Maps an [`EngineError`] to its wire code, same rationale as
/// [`registry_error_code`].
pub fn engine_error_code(err: &EngineError) -> ErrorCode {
    match err {
        EngineError::InvalidPhase => ErrorCode::InvalidPhase,
        EngineError::NotYourTurn => ErrorCode::NotYourTurn,
        EngineError::InvalidSelection => ErrorCode::InvalidSelection,
        EngineError::InvalidDie => ErrorCode::InvalidDie,
        EngineError::DieAlreadySpent => ErrorCode::DieAlreadySpent,
        EngineError::NoSelection => ErrorCode::NoSelection,
        EngineError::AlreadyConfirmed => ErrorCode::AlreadyConfirmed,
        EngineError::PredictionAlreadySubmitted => ErrorCode::PredictionAlreadySubmitted,
        EngineError::PlayerNotFound => ErrorCode::PlayerNotFound,
    }
}
