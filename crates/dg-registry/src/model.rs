use dg_core::Face;
use dg_core::Points;
use dg_core::Seconds;
use dg_core::Unique;
use dg_core::ID;
use dg_core::MAX_PLAYERS;
use dg_core::MAX_ROUNDS;
use dg_core::MAX_TURN_TIMER;
use dg_core::MIN_PLAYERS;
use dg_core::MIN_ROUNDS;
use dg_core::MIN_TURN_TIMER;
use dg_scoring::Die;
use dg_scoring::EvaluatedHand;
use dg_scoring::Prediction;
use std::collections::HashMap;
use std::time::SystemTime;

/// Marker type: a [`dg_core::ID`] tagged with this type identifies a player
/// seat, stable across reconnects within a room.
pub struct Player;
/// Opaque player identity.
pub type PlayerId = ID<Player>;
/// 6-character room code, e.g. "7K9XQM".
pub type RoomCode = dg_core::RoomCode;
/// Opaque session handle: identifies one connected client socket. Swapped
/// out wholesale on reconnect, unlike [`PlayerId`] which persists.
pub type SessionHandle = String;

/// Per-room configuration (spec §3 GameConfig). Bounds are clamped rather
/// than rejected outright; callers that need hard validation errors check
/// the bounds themselves before calling [`GameConfig::merged`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    pub max_players: usize,
    pub total_rounds: u32,
    pub turn_timer_seconds: Seconds,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: 6,
            total_rounds: 5,
            turn_timer_seconds: 30,
        }
    }
}

impl GameConfig {
    /// Applies a set of overrides on top of `self`, clamping each field to
    /// its spec §3 bounds.
    pub fn merged(&self, overrides: GameConfigOverrides) -> Self {
        Self {
            max_players: overrides
                .max_players
                .map(|v| v.clamp(MIN_PLAYERS, MAX_PLAYERS))
                .unwrap_or(self.max_players),
            total_rounds: overrides
                .total_rounds
                .map(|v| v.clamp(MIN_ROUNDS, MAX_ROUNDS))
                .unwrap_or(self.total_rounds),
            turn_timer_seconds: overrides
                .turn_timer_seconds
                .map(|v| v.clamp(MIN_TURN_TIMER, MAX_TURN_TIMER))
                .unwrap_or(self.turn_timer_seconds),
        }
    }
}

/// Partial config update, as received from `game:updateConfig` or the
/// initial `config?` on `room:create`.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct GameConfigOverrides {
    pub max_players: Option<usize>,
    pub total_rounds: Option<u32>,
    pub turn_timer_seconds: Option<Seconds>,
}

/// Confirmed per-player selection for the current set (spec §3 "pending
/// selections"). Modeled as one record with an explicit `confirmed` flag
/// rather than a sibling `"<playerId>:confirmed"` key, so a player's
/// selection and its confirmation live in a single lookup (spec §9 design
/// note).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PendingSelection {
    pub die_ids: Vec<u32>,
    pub confirmed: bool,
}

/// One player's seat in a room.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub session: SessionHandle,
    pub dice: Vec<Die>,
    pub cumulative_score: Points,
    pub current_round_score: Points,
    pub set1_score: Points,
    pub set2_score: Points,
    pub prediction: Option<Prediction>,
    pub connected: bool,
    pub ready: bool,
    pub host: bool,
}

impl Unique<Player> for PlayerState {
    fn id(&self) -> PlayerId {
        self.id
    }
}

impl PlayerState {
    pub fn new(name: String, session: SessionHandle, host: bool) -> Self {
        Self {
            id: PlayerId::default(),
            name,
            session,
            dice: Vec::new(),
            cumulative_score: 0.0,
            current_round_score: 0.0,
            set1_score: 0.0,
            set2_score: 0.0,
            prediction: None,
            connected: true,
            ready: false,
            host,
        }
    }

    /// Resets the fields that start fresh each round: dice, prediction, and
    /// per-round scores. `cumulative_score` is untouched (spec §3 invariant:
    /// it only ever increases).
    pub fn reset_for_round(&mut self) {
        self.dice.clear();
        self.prediction = None;
        self.current_round_score = 0.0;
        self.set1_score = 0.0;
        self.set2_score = 0.0;
    }

    pub fn unspent_dice(&self) -> impl Iterator<Item = &Die> {
        self.dice.iter().filter(|d| !d.spent)
    }
}

/// Named phases of the per-room state machine (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Lobby,
    InitialRoll,
    Prediction,
    SetSelection,
    SetReveal,
    RoundSummary,
    GameOver,
}

/// One player's result within a single set (spec §3 SetResult).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SetResult {
    pub player_id: PlayerId,
    pub hand: EvaluatedHand,
    pub dice_used: Vec<u32>,
    pub dice_values: Vec<Face>,
    pub placement: usize,
    pub points: Points,
}

/// A player's prediction outcome, recorded at ROUND_SUMMARY.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PredictionOutcome {
    pub player_id: PlayerId,
    pub prediction: Prediction,
    pub round_total: u32,
    pub bonus: Points,
}

/// Full record of one completed round (spec §3 RoundResult).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub set1_results: Vec<SetResult>,
    pub set2_results: Vec<SetResult>,
    pub predictions: Vec<PredictionOutcome>,
}

/// The full per-room game state (spec §3 GameState). This is the single
/// source of truth mutated by the registry (lobby-phase operations) and the
/// engine (in-game phase transitions); both operate on the same struct so a
/// room's lifecycle never has to translate between two representations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GameState {
    pub room_code: RoomCode,
    pub phase: Phase,
    pub players: Vec<PlayerState>,
    pub config: GameConfig,
    pub current_round: u32,
    pub current_set: u8,
    pub turn_order: Vec<PlayerId>,
    pub initial_turn_order: Vec<PlayerId>,
    pub current_turn_index: usize,
    pub pending_selections: HashMap<PlayerId, PendingSelection>,
    pub set_results: Vec<SetResult>,
    /// Set-1 results held here between SET_REVEAL(set 1) and the
    /// NEXT_SET that ends set 2, when they are combined with `set_results`
    /// (set 2) into a single `RoundResult` (spec §4.4 SET_REVEAL/NEXT_SET).
    pub set1_results_buffer: Vec<SetResult>,
    pub round_history: Vec<RoundResult>,
    pub initial_rolls: HashMap<PlayerId, u32>,
    pub host_id: PlayerId,
    pub created_at: u64,
    pub next_die_id: u32,
}

impl GameState {
    pub fn new(room_code: RoomCode, host: PlayerState, config: GameConfig) -> Self {
        let host_id = host.id();
        Self {
            room_code,
            phase: Phase::Lobby,
            players: vec![host],
            config,
            current_round: 0,
            current_set: 1,
            turn_order: Vec::new(),
            initial_turn_order: Vec::new(),
            current_turn_index: 0,
            pending_selections: HashMap::new(),
            set_results: Vec::new(),
            set1_results_buffer: Vec::new(),
            round_history: Vec::new(),
            initial_rolls: HashMap::new(),
            host_id,
            created_at: now_unix(),
            next_die_id: 0,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn current_turn_holder(&self) -> Option<PlayerId> {
        self.turn_order.get(self.current_turn_index).copied()
    }

    pub fn connected_player_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.connected)
            .map(|p| p.id)
            .collect()
    }

    pub fn name_taken(&self, name: &str) -> bool {
        self.players
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn next_die_id(&mut self) -> u32 {
        let id = self.next_die_id;
        self.next_die_id += 1;
        id
    }
}

pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Opaque token allowing a disconnected client to resume a player identity
/// in a specific room (spec §3 ReconnectToken).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReconnectToken {
    pub token: String,
    pub player_id: PlayerId,
    pub room_code: RoomCode,
    pub expires_at: u64,
}
