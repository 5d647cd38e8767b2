use dg_core::Face;
use std::cmp::Ordering;

/// Die color. White dice are always revealed; red and blue start hidden and
/// become revealed only once selected into a hand (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Red,
    Blue,
}

impl Color {
    /// White dice are always revealed regardless of selection state.
    pub fn always_revealed(&self) -> bool {
        matches!(self, Color::White)
    }
}

/// A single die in a player's round-long set of eleven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Die {
    pub id: u32,
    pub color: Color,
    pub face: Face,
    pub spent: bool,
    pub revealed: bool,
}

impl Die {
    pub fn new(id: u32, color: Color, face: Face) -> Self {
        let revealed = color.always_revealed();
        Self {
            id,
            color,
            face,
            spent: false,
            revealed,
        }
    }
    /// Marks this die spent and revealed, as happens when it is locked into
    /// a confirmed hand (spec §4.4, SET_SELECTION's fixed-point action).
    pub fn spend(&mut self) {
        self.spent = true;
        self.revealed = true;
    }
}

/// The four hand shapes, ordered exactly as spec §4.1 defines: a straight
/// outranks a pair but a triple outranks everything. This is *not* the usual
/// poker ordering — do not "fix" it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rank {
    Single,
    Double,
    Straight,
    Triple,
}

/// A fully evaluated 3-die hand, carrying enough tie-break state to compare
/// against any other evaluated hand without re-touching the raw dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EvaluatedHand {
    pub rank: Rank,
    pub primary: Face,
    pub secondary: Face,
    pub tertiary: Face,
}

impl EvaluatedHand {
    /// Short human-readable description, e.g. "Triple 4s" or "Straight 3-4-5".
    pub fn description(&self) -> String {
        match self.rank {
            Rank::Triple => format!("Triple {}s", self.primary),
            Rank::Straight => format!(
                "Straight {}-{}-{}",
                self.primary - 2,
                self.primary - 1,
                self.primary
            ),
            Rank::Double => format!("Pair of {}s, {} kicker", self.primary, self.secondary),
            Rank::Single => format!(
                "High {}-{}-{}",
                self.primary, self.secondary, self.tertiary
            ),
        }
    }
}

/// Error returned by [`evaluate`] for malformed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    WrongHandSize(usize),
}

impl std::fmt::Display for ScoringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongHandSize(n) => write!(f, "hand must have exactly 3 dice, got {}", n),
        }
    }
}

impl std::error::Error for ScoringError {}

/// Evaluates a 3-die hand per spec §4.1. Invariant under permutation of
/// `faces` — the values are sorted internally before classification.
pub fn evaluate(faces: &[Face]) -> Result<EvaluatedHand, ScoringError> {
    if faces.len() != 3 {
        return Err(ScoringError::WrongHandSize(faces.len()));
    }
    let mut sorted = [faces[0], faces[1], faces[2]];
    sorted.sort_unstable();
    let [low, mid, high] = sorted;
    let hand = if low == mid && mid == high {
        EvaluatedHand {
            rank: Rank::Triple,
            primary: low,
            secondary: 0,
            tertiary: 0,
        }
    } else if is_consecutive_run(low, mid, high) {
        EvaluatedHand {
            rank: Rank::Straight,
            primary: high,
            secondary: 0,
            tertiary: 0,
        }
    } else if low == mid {
        EvaluatedHand {
            rank: Rank::Double,
            primary: low,
            secondary: high,
            tertiary: 0,
        }
    } else if mid == high {
        EvaluatedHand {
            rank: Rank::Double,
            primary: high,
            secondary: low,
            tertiary: 0,
        }
    } else {
        EvaluatedHand {
            rank: Rank::Single,
            primary: high,
            secondary: mid,
            tertiary: low,
        }
    };
    Ok(hand)
}

/// Only the four literal consecutive triples count as a straight: 1-2-3,
/// 2-3-4, 3-4-5, 4-5-6. There is no wrap-around (5-6-1 is not a straight).
fn is_consecutive_run(low: Face, mid: Face, high: Face) -> bool {
    mid == low + 1 && high == mid + 1
}

/// Lexicographic comparison on (rank, primary, secondary, tertiary). Equal
/// across all four fields means the hands are tied.
pub fn compare(a: &EvaluatedHand, b: &EvaluatedHand) -> Ordering {
    a.rank
        .cmp(&b.rank)
        .then(a.primary.cmp(&b.primary))
        .then(a.secondary.cmp(&b.secondary))
        .then(a.tertiary.cmp(&b.tertiary))
}
