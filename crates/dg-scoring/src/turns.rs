use dg_core::Points;

/// Computes round-1 turn order from each player's opening 2d6 roll: ascending
/// by sum, lowest first, stable on ties (spec §4.1). Does not mutate `rolls`.
pub fn initial_turn_order<P: Copy>(rolls: &[(P, u32)]) -> Vec<P> {
    let mut indexed: Vec<(usize, &(P, u32))> = rolls.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| a.1.cmp(&b.1).then(ia.cmp(ib)));
    indexed.into_iter().map(|(_, (p, _))| *p).collect()
}

/// Computes turn order for round 2 onward: cumulative score descending,
/// ties broken by earlier position in the round-1 initial order. A player
/// absent from `initial_order` sorts after every player present in it.
/// Does not mutate its inputs.
pub fn subsequent_turn_order<P: Copy + PartialEq>(
    players: &[(P, Points)],
    initial_order: &[P],
) -> Vec<P> {
    let rank_in_initial = |p: &P| -> usize {
        initial_order
            .iter()
            .position(|q| q == p)
            .unwrap_or(initial_order.len())
    };
    let mut sorted: Vec<(P, Points)> = players.to_vec();
    sorted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| rank_in_initial(&a.0).cmp(&rank_in_initial(&b.0)))
    });
    sorted.into_iter().map(|(p, _)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_order_sorts_ascending_stable_on_ties() {
        let rolls = [(1, 7), (2, 3), (3, 3), (4, 10)];
        let order = initial_turn_order(&rolls);
        assert_eq!(order, vec![2, 3, 1, 4]);
    }

    #[test]
    fn initial_order_does_not_mutate_input() {
        let rolls = [(1, 7), (2, 3)];
        let copy = rolls;
        let _ = initial_turn_order(&rolls);
        assert_eq!(rolls, copy);
    }

    #[test]
    fn subsequent_order_sorts_by_score_desc_tie_by_initial_order() {
        let initial = vec![3, 1, 2, 4];
        let players = [(1, 10.0), (2, 10.0), (3, 5.0), (4, 15.0)];
        let order = subsequent_turn_order(&players, &initial);
        // 4 leads outright; 1 and 2 tie at 10 but 1 precedes 2 in initial order;
        // 3 trails.
        assert_eq!(order, vec![4, 1, 2, 3]);
    }

    #[test]
    fn subsequent_order_sorts_missing_players_last() {
        let initial = vec![1, 2];
        let players = [(1, 5.0), (2, 5.0), (3, 5.0)];
        let order = subsequent_turn_order(&players, &initial);
        assert_eq!(order, vec![1, 2, 3]);
    }
}
