use dg_registry::Phase;
use dg_registry::PlayerId;
use dg_registry::RoundResult;
use dg_registry::SetResult;

/// What changed as a result of applying one [`crate::EngineEvent`] (spec
/// §4.4, §4.6). The gateway translates these into the wire payloads of §6;
/// this crate knows nothing about JSON or sockets.
#[derive(Debug, Clone)]
pub enum EngineOutcome {
    InitialRollComplete {
        rolls: Vec<(PlayerId, u32)>,
        turn_order: Vec<PlayerId>,
    },
    PhaseChanged(Phase),
    TurnStarted {
        player: PlayerId,
    },
    PredictionRecorded {
        player: PlayerId,
    },
    AllPredictionsSubmitted,
    DiceSelected {
        player: PlayerId,
        die_ids: Vec<u32>,
    },
    DiceConfirmed {
        player: PlayerId,
    },
    SetRevealed {
        results: Vec<SetResult>,
    },
    RoundComplete {
        result: RoundResult,
    },
    GameOver {
        standings: Vec<(PlayerId, f64)>,
    },
    TimerTick {
        kind: dg_timers::TimerKind,
        seconds_remaining: u32,
    },
    /// The prediction timer has entered its grace period; the room should
    /// see an auto-submission countdown before [`Self::PredictionRecorded`]
    /// outcomes start arriving for whichever players never chose.
    PredictionImminent,
}
