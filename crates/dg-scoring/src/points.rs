use crate::compare;
use crate::EvaluatedHand;
use dg_core::Points;

/// Per-placement point table, indexed `[placement - 1]`, keyed by player
/// count. Exact values from spec §4.1; max per set is 6, last place is 0.
fn points_table(player_count: usize) -> &'static [Points] {
    match player_count {
        2 => &[6.0, 0.0],
        3 => &[6.0, 3.0, 0.0],
        4 => &[6.0, 3.0, 1.0, 0.0],
        5 => &[6.0, 4.0, 2.0, 1.0, 0.0],
        6 => &[6.0, 4.0, 3.0, 2.0, 1.0, 0.0],
        n => panic!("unsupported player count {}", n),
    }
}

/// One player's placement and points for a single set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement<P> {
    pub player: P,
    pub placement: usize,
    pub points: Points,
}

/// Ranks `hands` best-to-worst, splits ties into shared placement groups,
/// and distributes each group's pooled per-placement points evenly (spec
/// §4.1). The result is in no particular order; read `.placement` to know
/// who finished where.
pub fn placements_and_points<P: Copy>(hands: &[(P, EvaluatedHand)]) -> Vec<Placement<P>> {
    let table = points_table(hands.len());
    let mut sorted: Vec<(P, EvaluatedHand)> = hands.to_vec();
    sorted.sort_by(|a, b| compare(&b.1, &a.1));

    let mut results = Vec::with_capacity(sorted.len());
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && compare(&sorted[j].1, &sorted[i].1) == std::cmp::Ordering::Equal
        {
            j += 1;
        }
        let group_size = j - i;
        let placement = i + 1;
        let pooled: Points = table[i..j].iter().sum();
        let share = pooled / group_size as Points;
        for (player, _) in &sorted[i..j] {
            results.push(Placement {
                player: *player,
                placement,
                points: share,
            });
        }
        i = j;
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate;

    #[test]
    fn four_players_all_distinct_hands() {
        let p1 = evaluate(&[2, 2, 2]).unwrap(); // triple
        let p2 = evaluate(&[4, 5, 6]).unwrap(); // straight
        let p3 = evaluate(&[5, 5, 3]).unwrap(); // pair
        let p4 = evaluate(&[6, 4, 2]).unwrap(); // high card
        let hands = [(1, p1), (2, p2), (3, p3), (4, p4)];
        let results = placements_and_points(&hands);
        let find = |id: i32| results.iter().find(|r| r.player == id).unwrap();
        assert_eq!(find(1).placement, 1);
        assert_eq!(find(1).points, 6.0);
        assert_eq!(find(2).placement, 2);
        assert_eq!(find(2).points, 3.0);
        assert_eq!(find(3).placement, 3);
        assert_eq!(find(3).points, 1.0);
        assert_eq!(find(4).placement, 4);
        assert_eq!(find(4).points, 0.0);
    }

    #[test]
    fn two_players_tied_triples_split_evenly() {
        let a = evaluate(&[5, 5, 5]).unwrap();
        let b = evaluate(&[5, 5, 5]).unwrap();
        let results = placements_and_points(&[(1, a), (2, b)]);
        assert!(results.iter().all(|r| r.placement == 1));
        assert!(results.iter().all(|r| r.points == 3.0));
    }

    #[test]
    fn three_way_tie_for_second_in_four_player_set() {
        let first = evaluate(&[6, 6, 6]).unwrap();
        let straight = evaluate(&[3, 4, 5]).unwrap();
        let hands = [(1, first), (2, straight), (3, straight), (4, straight)];
        let results = placements_and_points(&hands);
        let find = |id: i32| results.iter().find(|r| r.player == id).unwrap();
        assert_eq!(find(1).points, 6.0);
        for id in [2, 3, 4] {
            assert_eq!(find(id).placement, 2);
            assert!((find(id).points - (4.0 / 3.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn points_sum_to_table_total_regardless_of_tie_configuration() {
        let hands = [
            (1, evaluate(&[1, 2, 3]).unwrap()),
            (2, evaluate(&[1, 2, 3]).unwrap()),
            (3, evaluate(&[2, 3, 4]).unwrap()),
            (4, evaluate(&[6, 5, 1]).unwrap()),
            (5, evaluate(&[6, 5, 1]).unwrap()),
        ];
        let results = placements_and_points(&hands);
        let total: Points = results.iter().map(|r| r.points).sum();
        let expected: Points = points_table(5).iter().sum();
        assert!((total - expected).abs() < 1e-9);
    }
}
