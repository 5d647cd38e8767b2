use dg_core::Face;
use dg_core::WHITE_DICE_PER_PLAYER;
use dg_registry::GameState;
use dg_scoring::Color;
use dg_scoring::Die;
use rand::Rng;

/// Rolls one face, 1..=6.
pub fn roll_face(rng: &mut impl Rng) -> Face {
    rng.random_range(1..=6)
}

/// Deals a fresh round's eleven dice (9 white + 1 red + 1 blue) to the
/// player at `index`, replacing whatever they were holding (spec §3: a
/// player's dice list has length 11 with exactly one RED and one BLUE at
/// round start).
pub fn deal_hand(state: &mut GameState, index: usize, rng: &mut impl Rng) {
    let mut dice = Vec::with_capacity(dg_core::DICE_PER_PLAYER);
    for _ in 0..WHITE_DICE_PER_PLAYER {
        let id = state.next_die_id();
        dice.push(Die::new(id, Color::White, roll_face(rng)));
    }
    let id = state.next_die_id();
    dice.push(Die::new(id, Color::Red, roll_face(rng)));
    let id = state.next_die_id();
    dice.push(Die::new(id, Color::Blue, roll_face(rng)));
    state.players[index].dice = dice;
}

/// Deals fresh hands to every player in the room.
pub fn deal_round(state: &mut GameState, rng: &mut impl Rng) {
    for index in 0..state.players.len() {
        deal_hand(state, index, rng);
    }
}
