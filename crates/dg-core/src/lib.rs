//! Core type aliases, traits, and constants for the dice room server.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace: the `ID<T>` identity wrapper, a handful of domain type
//! aliases, and the small set of constants that parameterize the game
//! (player count bounds, round bounds, timer bounds).
#![allow(dead_code)]

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Opaque player identity within a room.
pub type PlayerId = uuid::Uuid;
/// 6-character room code, e.g. "7K9XQM".
pub type RoomCode = String;
/// A face value on a die, 1..=6.
pub type Face = u8;
/// A whole-number seconds duration for timer configuration and ticks.
pub type Seconds = u32;
/// Cumulative or per-round score; fractional because of tie-split points.
pub type Points = f64;

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPE
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast ID<T> to ID<U> while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from(uuid::Uuid::deserialize(deserializer)?))
    }
}

// ============================================================================
// GAME PARAMETERS (spec §3 GameConfig bounds)
// ============================================================================
/// Minimum players per room.
pub const MIN_PLAYERS: usize = 2;
/// Maximum players per room.
pub const MAX_PLAYERS: usize = 6;
/// Minimum configurable rounds per game.
pub const MIN_ROUNDS: u32 = 3;
/// Maximum configurable rounds per game.
pub const MAX_ROUNDS: u32 = 10;
/// Minimum configurable turn timer, in seconds.
pub const MIN_TURN_TIMER: Seconds = 15;
/// Maximum configurable turn timer, in seconds.
pub const MAX_TURN_TIMER: Seconds = 60;
/// Dice dealt to each player per round: 9 white + 1 red + 1 blue.
pub const DICE_PER_PLAYER: usize = 11;
/// White dice dealt to each player per round.
pub const WHITE_DICE_PER_PLAYER: usize = 9;
/// Dice selected into a hand per set.
pub const DICE_PER_HAND: usize = 3;
/// Sets played per round.
pub const SETS_PER_ROUND: usize = 2;
/// Maximum points awardable in a single set.
pub const MAX_SET_POINTS: Points = 6.0;
/// Flat bonus for a correct ZERO prediction.
pub const ZERO_PREDICTION_BONUS: Points = 40.0;
/// Grace period between a prediction timer reaching zero and the
/// auto-submit event actually firing (spec §4.5).
pub const PREDICTION_GRACE: Seconds = 3;
/// Results-acknowledge forced-advance timeout (spec §4.5).
pub const RESULTS_ACK_TIMEOUT: Seconds = 30;
/// Reconnect token and persisted game-state lifetime.
pub const STATE_TTL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);
/// Room-code alphabet: excludes 0/O/1/I/L to avoid visual ambiguity.
pub const ROOM_CODE_ALPHABET: &str = "ABCDEFGHJKMNPQRSTUVWXYZ23456789";
/// Room code length.
pub const ROOM_CODE_LEN: usize = 6;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn init_logging() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Global interrupt flag for graceful shutdown coordination.
#[cfg(feature = "server")]
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);
/// Check if graceful shutdown was requested via Ctrl+C.
#[cfg(feature = "server")]
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}
/// Register Ctrl+C handler for graceful shutdown: sets the interrupt flag so
/// in-flight rooms can finish their current event before the process exits.
#[cfg(feature = "server")]
pub fn install_shutdown_handler() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, shutting down gracefully");
            INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn id_roundtrips_through_uuid() {
        let id: ID<()> = ID::default();
        let raw: uuid::Uuid = id.into();
        let back: ID<()> = ID::from(raw);
        assert_eq!(id, back);
    }
    #[test]
    fn id_cast_preserves_uuid() {
        struct A;
        struct B;
        let a: ID<A> = ID::default();
        let raw = a.inner();
        let b: ID<B> = a.cast();
        assert_eq!(b.inner(), raw);
    }
}
