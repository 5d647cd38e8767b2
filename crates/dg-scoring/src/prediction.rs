use dg_core::Points;
use std::ops::RangeInclusive;

/// A player's prediction for their round total (set-1 + set-2), made during
/// the PREDICTION phase (spec §4.1, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Prediction {
    Zero,
    Min,
    More,
    Max,
}

impl Prediction {
    /// All prediction types, in a stable order, used for auto-assignment
    /// (spec §4.4 PREDICTION_TIMEOUT) and for enumerating choices offered to
    /// the client.
    pub const ALL: [Prediction; 4] = [
        Prediction::Zero,
        Prediction::Min,
        Prediction::More,
        Prediction::Max,
    ];
}

/// The closed integer range a prediction must land the round total in to pay
/// out, keyed by player count. `None` means the prediction is not offered to
/// that player count (MIN at 2 players, spec §4.1).
pub fn prediction_range(player_count: usize, prediction: Prediction) -> Option<RangeInclusive<u32>> {
    use Prediction::*;
    match (player_count, prediction) {
        (2, Zero) => Some(0..=0),
        (2, Min) => None,
        (2, More) => Some(6..=6),
        (2, Max) => Some(12..=12),

        (3, Zero) => Some(0..=0),
        (3, Min) => Some(3..=3),
        (3, More) => Some(6..=9),
        (3, Max) => Some(10..=12),

        (4, Zero) => Some(0..=0),
        (4, Min) => Some(1..=4),
        (4, More) => Some(6..=9),
        (4, Max) => Some(10..=12),

        (5, Zero) => Some(0..=0),
        (5, Min) => Some(1..=4),
        (5, More) => Some(5..=8),
        (5, Max) => Some(10..=12),

        (6, Zero) => Some(0..=0),
        (6, Min) => Some(1..=4),
        (6, More) => Some(5..=9),
        (6, Max) => Some(10..=12),

        (n, _) => panic!("unsupported player count {}", n),
    }
}

/// Prediction types actually offered to a given player count (MIN dropped
/// for 2 players, spec §4.1).
pub fn available_predictions(player_count: usize) -> Vec<Prediction> {
    Prediction::ALL
        .into_iter()
        .filter(|p| prediction_range(player_count, *p).is_some())
        .collect()
}

/// Bonus points for a prediction given the player's actual round total.
/// ZERO pays a flat 40 when it hits; every other prediction pays out the
/// round total itself when it hits. A miss always pays 0 (spec §4.1).
pub fn prediction_bonus(prediction: Prediction, round_total: u32, player_count: usize) -> Points {
    match prediction_range(player_count, prediction) {
        Some(range) if range.contains(&round_total) => match prediction {
            Prediction::Zero => dg_core::ZERO_PREDICTION_BONUS,
            Prediction::Min | Prediction::More | Prediction::Max => round_total as Points,
        },
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_prediction_pays_flat_forty_only_on_zero_total() {
        assert_eq!(prediction_bonus(Prediction::Zero, 0, 4), 40.0);
        assert_eq!(prediction_bonus(Prediction::Zero, 1, 4), 0.0);
    }

    #[test]
    fn more_prediction_pays_round_total_when_in_range() {
        // 4 players: MORE range is [6,9]
        assert_eq!(prediction_bonus(Prediction::More, 7, 4), 7.0);
        assert_eq!(prediction_bonus(Prediction::More, 5, 4), 0.0);
        assert_eq!(prediction_bonus(Prediction::More, 10, 4), 0.0);
    }

    #[test]
    fn min_not_offered_at_two_players() {
        assert!(available_predictions(2).iter().all(|p| *p != Prediction::Min));
        assert_eq!(prediction_range(2, Prediction::Min), None);
    }

    #[test]
    fn max_prediction_boundaries() {
        for n in 2..=6 {
            let range = prediction_range(n, Prediction::Max).unwrap();
            assert_eq!(*range.start(), 10);
            assert_eq!(*range.end(), 12);
        }
    }
}
