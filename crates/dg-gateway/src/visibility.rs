use dg_registry::GameState;
use dg_registry::Phase;
use dg_registry::PlayerId;
use dg_scoring::Color;

/// Returns a copy of `state` with every other player's still-concealed
/// red/blue dice face values zeroed out, so a per-recipient `GameState`
/// snapshot never leaks a hidden die before its owning set is revealed
/// (spec §3 Die.revealed, §4.6 visibility policy). White dice are never
/// touched: they are public the moment they are dealt.
pub fn redact_for(state: &GameState, viewer: PlayerId) -> GameState {
    let publicly_revealed = matches!(
        state.phase,
        Phase::SetReveal | Phase::RoundSummary | Phase::GameOver
    );
    let mut redacted = state.clone();
    for player in &mut redacted.players {
        if player.id == viewer {
            continue;
        }
        for die in &mut player.dice {
            if die.color != Color::White && !publicly_revealed {
                die.face = 0;
            }
        }
    }
    redacted
}

/// Splits a just-confirmed selection into the die ids visible to opponents
/// right now (white dice, always public) and the count still concealed
/// (red/blue, withheld until `set:reveal` regardless of the die's own
/// `revealed` flag, which only tracks whether it is locked into a hand, not
/// whether the gateway has broadcast it — spec §4.6, §8 property 5).
pub fn visible_selection(
    state: &GameState,
    player: PlayerId,
    die_ids: &[u32],
) -> (Vec<u32>, usize) {
    let Some(owner) = state.player(player) else {
        return (Vec::new(), die_ids.len());
    };
    let mut visible = Vec::new();
    let mut hidden = 0usize;
    for &id in die_ids {
        match owner.dice.iter().find(|d| d.id == id) {
            Some(die) if die.color == Color::White => visible.push(id),
            _ => hidden += 1,
        }
    }
    (visible, hidden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_registry::GameConfig;
    use dg_registry::PlayerState;
    use dg_scoring::Die;

    fn state_with_one_player() -> (GameState, PlayerId) {
        let host = PlayerState::new("Ada".into(), "sess".into(), true);
        let id = host.id;
        let mut state = GameState::new("ABC123".into(), host, GameConfig::default());
        state.players[0].dice = vec![
            Die::new(0, Color::White, 4),
            Die::new(1, Color::Red, 6),
            Die::new(2, Color::Blue, 2),
        ];
        (state, id)
    }

    #[test]
    fn redact_hides_red_and_blue_faces_from_others_before_reveal() {
        let (state, owner) = state_with_one_player();
        let viewer = dg_registry::PlayerId::default();
        let redacted = redact_for(&state, viewer);
        let dice = &redacted.player(owner).unwrap().dice;
        assert_eq!(dice[0].face, 4); // white stays visible
        assert_eq!(dice[1].face, 0); // red hidden
        assert_eq!(dice[2].face, 0); // blue hidden
    }

    #[test]
    fn redact_exposes_everything_to_the_owner() {
        let (state, owner) = state_with_one_player();
        let redacted = redact_for(&state, owner);
        let dice = &redacted.player(owner).unwrap().dice;
        assert_eq!(dice[1].face, 6);
        assert_eq!(dice[2].face, 2);
    }

    #[test]
    fn redact_exposes_everything_once_set_is_revealed() {
        let (mut state, owner) = state_with_one_player();
        state.phase = Phase::SetReveal;
        let viewer = dg_registry::PlayerId::default();
        let redacted = redact_for(&state, viewer);
        let dice = &redacted.player(owner).unwrap().dice;
        assert_eq!(dice[1].face, 6);
        assert_eq!(dice[2].face, 2);
    }

    #[test]
    fn visible_selection_separates_white_from_hidden_colors() {
        let (state, owner) = state_with_one_player();
        let (visible, hidden) = visible_selection(&state, owner, &[0, 1, 2]);
        assert_eq!(visible, vec![0]);
        assert_eq!(hidden, 2);
    }
}
