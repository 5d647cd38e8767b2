use dg_registry::PlayerId;
use dg_scoring::Prediction;

/// Inbound triggers the engine reacts to (spec §4.4 transition table). Some
/// are client-originated (`SubmitPrediction`, `SelectDice`,
/// `ConfirmSelection`), others are synthesized by [`dg_timers`] on expiry
/// (`PredictionTimeout`, `TurnTimeout`) or by the acknowledgement
/// coordinator forcing progress (`NextSet`, `NextRound`).
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Entry action for the LOBBY -> INITIAL_ROLL transition: rolls 2d6 for
    /// every player, computes the round-1 turn order, and deals the first
    /// round's dice. Issued by the gateway immediately after
    /// `dg_registry::RoomRegistry::start_game` succeeds.
    StartGame,
    SubmitPrediction {
        player: PlayerId,
        prediction: Prediction,
    },
    PredictionTimeout,
    SelectDice {
        player: PlayerId,
        die_ids: Vec<u32>,
    },
    ConfirmSelection {
        player: PlayerId,
    },
    TurnTimeout,
    NextSet,
    NextRound,
}
