//! Per-room game engine (spec §4.4): a pure transition function plus a
//! mailbox-driven actor task that is the single writer of one room's
//! in-game state, modeled on the teacher's `gameroom::{Room, Actor, Table}`
//! split between imperative shell and functional core.
mod actor;
mod dealing;
mod error;
mod event;
mod outcome;
mod transition;

pub use actor::EngineCommand;
pub use actor::RoomActor;
pub use actor::RoomOutcome;
pub use error::EngineError;
pub use event::EngineEvent;
pub use outcome::EngineOutcome;
pub use transition::apply_event;

#[cfg(test)]
mod tests {
    use super::*;
    use dg_registry::GameConfig;
    use dg_registry::GameState;
    use dg_registry::Phase;
    use dg_registry::PlayerState;
    use dg_scoring::Prediction;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn room_with(n: usize) -> GameState {
        let mut players: Vec<PlayerState> = (0..n)
            .map(|i| PlayerState::new(format!("P{i}"), format!("sess-{i}"), i == 0))
            .collect();
        let host = players.remove(0);
        let mut state = GameState::new(
            "ABC123".to_string(),
            host,
            GameConfig {
                max_players: 6,
                total_rounds: 3,
                turn_timer_seconds: 30,
            },
        );
        state.players.extend(players);
        state.phase = Phase::InitialRoll;
        state.current_round = 1;
        state
    }

    fn player_ids(state: &GameState) -> Vec<dg_registry::PlayerId> {
        state.players.iter().map(|p| p.id).collect()
    }

    #[test]
    fn start_game_deals_and_enters_prediction() {
        let mut state = room_with(4);
        let mut rng = SmallRng::seed_from_u64(1);
        let outcomes = apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();
        assert_eq!(state.phase, Phase::Prediction);
        assert_eq!(state.turn_order.len(), 4);
        assert!(state.players.iter().all(|p| p.dice.len() == dg_core::DICE_PER_PLAYER));
        assert!(outcomes
            .iter()
            .any(|o| matches!(o, EngineOutcome::InitialRollComplete { .. })));
    }

    #[test]
    fn full_round_reaches_set_reveal_then_round_summary() {
        let mut state = room_with(4);
        let mut rng = SmallRng::seed_from_u64(7);
        apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();

        let ids = player_ids(&state);
        for id in &ids {
            apply_event(
                &mut state,
                EngineEvent::SubmitPrediction {
                    player: *id,
                    prediction: Prediction::More,
                },
                &mut rng,
            )
            .unwrap();
        }
        assert_eq!(state.phase, Phase::SetSelection);

        for _ in 0..ids.len() {
            let holder = state.current_turn_holder().unwrap();
            let die_ids: Vec<u32> = state
                .player(holder)
                .unwrap()
                .unspent_dice()
                .take(3)
                .map(|d| d.id)
                .collect();
            apply_event(
                &mut state,
                EngineEvent::SelectDice {
                    player: holder,
                    die_ids,
                },
                &mut rng,
            )
            .unwrap();
            apply_event(
                &mut state,
                EngineEvent::ConfirmSelection { player: holder },
                &mut rng,
            )
            .unwrap();
        }
        assert_eq!(state.phase, Phase::SetReveal);
        assert_eq!(state.set_results.len(), 4);
    }

    #[test]
    fn submit_prediction_twice_is_rejected_and_state_unchanged() {
        let mut state = room_with(2);
        let mut rng = SmallRng::seed_from_u64(2);
        apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();
        let id = state.players[0].id;
        apply_event(
            &mut state,
            EngineEvent::SubmitPrediction {
                player: id,
                prediction: Prediction::Zero,
            },
            &mut rng,
        )
        .unwrap();
        let before = state.players[0].prediction;
        let err = apply_event(
            &mut state,
            EngineEvent::SubmitPrediction {
                player: id,
                prediction: Prediction::More,
            },
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, EngineError::PredictionAlreadySubmitted);
        assert_eq!(state.players[0].prediction, before);
    }

    #[test]
    fn submit_prediction_rejects_type_unavailable_for_player_count() {
        let mut state = room_with(2);
        let mut rng = SmallRng::seed_from_u64(8);
        apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();
        let id = state.players[0].id;
        let err = apply_event(
            &mut state,
            EngineEvent::SubmitPrediction {
                player: id,
                prediction: Prediction::Min,
            },
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, EngineError::InvalidSelection);
        assert!(state.players[0].prediction.is_none());
    }

    #[test]
    fn select_dice_by_non_turn_holder_is_rejected() {
        let mut state = room_with(3);
        let mut rng = SmallRng::seed_from_u64(3);
        apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();
        for p in player_ids(&state) {
            apply_event(
                &mut state,
                EngineEvent::SubmitPrediction {
                    player: p,
                    prediction: Prediction::Zero,
                },
                &mut rng,
            )
            .unwrap();
        }
        let holder = state.current_turn_holder().unwrap();
        let impostor = player_ids(&state).into_iter().find(|p| *p != holder).unwrap();
        let err = apply_event(
            &mut state,
            EngineEvent::SelectDice {
                player: impostor,
                die_ids: vec![0, 1, 2],
            },
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, EngineError::NotYourTurn);
    }

    #[test]
    fn turn_timeout_auto_selects_and_advances_turn() {
        let mut state = room_with(2);
        let mut rng = SmallRng::seed_from_u64(4);
        apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();
        for p in player_ids(&state) {
            apply_event(
                &mut state,
                EngineEvent::SubmitPrediction {
                    player: p,
                    prediction: Prediction::Zero,
                },
                &mut rng,
            )
            .unwrap();
        }
        let first_holder = state.current_turn_holder().unwrap();
        apply_event(&mut state, EngineEvent::TurnTimeout, &mut rng).unwrap();
        assert_eq!(state.current_turn_index, 1);
        assert!(state.pending_selections[&first_holder].confirmed);
        assert_eq!(state.pending_selections[&first_holder].die_ids.len(), 3);
    }

    #[test]
    fn prediction_timeout_assigns_from_available_set() {
        let mut state = room_with(2);
        let mut rng = SmallRng::seed_from_u64(5);
        apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();
        apply_event(&mut state, EngineEvent::PredictionTimeout, &mut rng).unwrap();
        let available = dg_scoring::available_predictions(2);
        assert!(state
            .players
            .iter()
            .all(|p| available.contains(&p.prediction.unwrap())));
        assert_eq!(state.phase, Phase::SetSelection);
    }

    #[test]
    fn full_game_reaches_game_over_after_configured_rounds() {
        let mut state = room_with(2);
        let mut rng = SmallRng::seed_from_u64(42);
        apply_event(&mut state, EngineEvent::StartGame, &mut rng).unwrap();

        for _round in 0..state.config.total_rounds {
            for p in player_ids(&state) {
                apply_event(
                    &mut state,
                    EngineEvent::SubmitPrediction {
                        player: p,
                        prediction: Prediction::Zero,
                    },
                    &mut rng,
                )
                .unwrap();
            }
            for _set in 0..2 {
                for _ in 0..state.players.len() {
                    let holder = state.current_turn_holder().unwrap();
                    let die_ids: Vec<u32> = state
                        .player(holder)
                        .unwrap()
                        .unspent_dice()
                        .take(3)
                        .map(|d| d.id)
                        .collect();
                    apply_event(
                        &mut state,
                        EngineEvent::SelectDice {
                            player: holder,
                            die_ids,
                        },
                        &mut rng,
                    )
                    .unwrap();
                    apply_event(
                        &mut state,
                        EngineEvent::ConfirmSelection { player: holder },
                        &mut rng,
                    )
                    .unwrap();
                }
                apply_event(&mut state, EngineEvent::NextSet, &mut rng).unwrap();
            }
            if state.phase == Phase::RoundSummary {
                apply_event(&mut state, EngineEvent::NextRound, &mut rng).unwrap();
            }
        }
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.round_history.len(), state.config.total_rounds as usize);
    }
}
