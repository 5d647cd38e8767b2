use crate::dealing::deal_round;
use crate::dealing::roll_face;
use crate::error::EngineError;
use crate::event::EngineEvent;
use crate::outcome::EngineOutcome;
use dg_registry::GameState;
use dg_registry::Phase;
use dg_registry::PendingSelection;
use dg_registry::PlayerId;
use dg_registry::PredictionOutcome;
use dg_registry::RoundResult;
use dg_scoring::evaluate;
use dg_scoring::placements_and_points;
use dg_scoring::prediction_bonus;
use rand::seq::IndexedRandom;
use rand::Rng;

/// Applies one event to `state`, running any "always" guarded transitions to
/// a fixed point before returning (spec §4.4: "always transitions run to
/// fixed point before the next event is accepted"). On error, `state` is
/// left completely untouched.
pub fn apply_event(
    state: &mut GameState,
    event: EngineEvent,
    rng: &mut impl Rng,
) -> Result<Vec<EngineOutcome>, EngineError> {
    match event {
        EngineEvent::StartGame => start_game(state, rng),
        EngineEvent::SubmitPrediction { player, prediction } => {
            submit_prediction(state, player, prediction)
        }
        EngineEvent::PredictionTimeout => prediction_timeout(state, rng),
        EngineEvent::SelectDice { player, die_ids } => select_dice(state, player, die_ids),
        EngineEvent::ConfirmSelection { player } => confirm_selection(state, player),
        EngineEvent::TurnTimeout => turn_timeout(state),
        EngineEvent::NextSet => next_set(state),
        EngineEvent::NextRound => next_round(state, rng),
    }
}

fn start_game(
    state: &mut GameState,
    rng: &mut impl Rng,
) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::InitialRoll {
        return Err(EngineError::InvalidPhase);
    }
    let rolls: Vec<(PlayerId, u32)> = state
        .players
        .iter()
        .map(|p| (p.id, roll_face(rng) as u32 + roll_face(rng) as u32))
        .collect();
    for (id, sum) in &rolls {
        state.initial_rolls.insert(*id, *sum);
    }
    let order = dg_scoring::initial_turn_order(&rolls);
    state.initial_turn_order = order.clone();
    state.turn_order = order.clone();
    state.current_turn_index = 0;
    deal_round(state, rng);
    state.phase = Phase::Prediction;
    Ok(vec![
        EngineOutcome::InitialRollComplete {
            rolls,
            turn_order: order,
        },
        EngineOutcome::PhaseChanged(Phase::Prediction),
    ])
}

fn submit_prediction(
    state: &mut GameState,
    player: PlayerId,
    prediction: dg_scoring::Prediction,
) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::Prediction {
        return Err(EngineError::InvalidPhase);
    }
    if !dg_scoring::available_predictions(state.players.len()).contains(&prediction) {
        return Err(EngineError::InvalidSelection);
    }
    let seat = state
        .player_mut(player)
        .ok_or(EngineError::PlayerNotFound)?;
    if seat.prediction.is_some() {
        return Err(EngineError::PredictionAlreadySubmitted);
    }
    seat.prediction = Some(prediction);
    let mut outcomes = vec![EngineOutcome::PredictionRecorded { player }];
    outcomes.extend(advance_past_prediction_if_ready(state));
    Ok(outcomes)
}

fn prediction_timeout(
    state: &mut GameState,
    rng: &mut impl Rng,
) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::Prediction {
        return Err(EngineError::InvalidPhase);
    }
    let count = state.players.len();
    let mut outcomes = Vec::new();
    for index in 0..state.players.len() {
        if state.players[index].prediction.is_none() {
            let choices = dg_scoring::available_predictions(count);
            let chosen = *choices
                .choose(rng)
                .expect("at least one prediction type is always available");
            state.players[index].prediction = Some(chosen);
            outcomes.push(EngineOutcome::PredictionRecorded {
                player: state.players[index].id,
            });
        }
    }
    outcomes.extend(advance_past_prediction_if_ready(state));
    Ok(outcomes)
}

fn advance_past_prediction_if_ready(state: &mut GameState) -> Vec<EngineOutcome> {
    let all_set = state.players.iter().all(|p| p.prediction.is_some());
    if !all_set {
        return Vec::new();
    }
    state.pending_selections.clear();
    state.current_turn_index = 0;
    state.phase = Phase::SetSelection;
    let mut outcomes = vec![
        EngineOutcome::AllPredictionsSubmitted,
        EngineOutcome::PhaseChanged(Phase::SetSelection),
    ];
    if let Some(holder) = state.current_turn_holder() {
        outcomes.push(EngineOutcome::TurnStarted { player: holder });
    }
    outcomes
}

fn select_dice(
    state: &mut GameState,
    player: PlayerId,
    die_ids: Vec<u32>,
) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::SetSelection {
        return Err(EngineError::InvalidPhase);
    }
    if state.current_turn_holder() != Some(player) {
        return Err(EngineError::NotYourTurn);
    }
    if die_ids.len() != dg_core::DICE_PER_HAND {
        return Err(EngineError::InvalidSelection);
    }
    let seat = state
        .player_mut(player)
        .ok_or(EngineError::PlayerNotFound)?;
    for id in &die_ids {
        match seat.dice.iter().find(|d| d.id == *id) {
            Some(d) if d.spent => return Err(EngineError::DieAlreadySpent),
            Some(_) => {}
            None => return Err(EngineError::InvalidDie),
        }
    }
    state.pending_selections.insert(
        player,
        PendingSelection {
            die_ids: die_ids.clone(),
            confirmed: false,
        },
    );
    Ok(vec![EngineOutcome::DiceSelected { player, die_ids }])
}

fn confirm_selection(
    state: &mut GameState,
    player: PlayerId,
) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::SetSelection {
        return Err(EngineError::InvalidPhase);
    }
    let confirmed_already = match state.pending_selections.get(&player) {
        None => return Err(EngineError::NoSelection),
        Some(sel) => sel.confirmed,
    };
    if confirmed_already {
        return Err(EngineError::AlreadyConfirmed);
    }
    state
        .pending_selections
        .get_mut(&player)
        .expect("checked above")
        .confirmed = true;

    let mut outcomes = vec![EngineOutcome::DiceConfirmed { player }];
    if state.current_turn_holder() == Some(player) {
        state.current_turn_index += 1;
        if let Some(next) = state.current_turn_holder() {
            outcomes.push(EngineOutcome::TurnStarted { player: next });
        }
    }
    outcomes.extend(reveal_set_if_ready(state));
    Ok(outcomes)
}

fn turn_timeout(state: &mut GameState) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::SetSelection {
        return Err(EngineError::InvalidPhase);
    }
    let player = match state.current_turn_holder() {
        Some(p) => p,
        None => return Err(EngineError::InvalidPhase),
    };
    let seat = state
        .player_mut(player)
        .ok_or(EngineError::PlayerNotFound)?;
    let die_ids: Vec<u32> = seat.unspent_dice().take(dg_core::DICE_PER_HAND).map(|d| d.id).collect();
    state.pending_selections.insert(
        player,
        PendingSelection {
            die_ids: die_ids.clone(),
            confirmed: true,
        },
    );
    state.current_turn_index += 1;

    let mut outcomes = vec![
        EngineOutcome::DiceSelected {
            player,
            die_ids,
        },
        EngineOutcome::DiceConfirmed { player },
    ];
    if let Some(next) = state.current_turn_holder() {
        outcomes.push(EngineOutcome::TurnStarted { player: next });
    }
    outcomes.extend(reveal_set_if_ready(state));
    Ok(outcomes)
}

/// SET_SELECTION's "always" exit transition: once every player has a
/// confirmed 3-die selection, evaluate hands, split placements and points,
/// spend the selected dice, and credit the set score (spec §4.4).
fn reveal_set_if_ready(state: &mut GameState) -> Vec<EngineOutcome> {
    let ready = state.players.len() == state.pending_selections.len()
        && state.pending_selections.values().all(|s| s.confirmed);
    if !ready {
        return Vec::new();
    }

    let mut hands = Vec::with_capacity(state.players.len());
    for player in &state.players {
        let selection = &state.pending_selections[&player.id];
        let faces: Vec<dg_core::Face> = selection
            .die_ids
            .iter()
            .map(|id| {
                player
                    .dice
                    .iter()
                    .find(|d| d.id == *id)
                    .expect("selected die belongs to player")
                    .face
            })
            .collect();
        let hand = evaluate(&faces).expect("selection is always exactly 3 dice");
        hands.push((player.id, hand, faces, selection.die_ids.clone()));
    }

    let scored: Vec<(PlayerId, dg_scoring::EvaluatedHand)> =
        hands.iter().map(|(id, hand, ..)| (*id, *hand)).collect();
    let placements = placements_and_points(&scored);

    let mut results = Vec::with_capacity(hands.len());
    for (player_id, hand, faces, die_ids) in hands {
        let placement = placements
            .iter()
            .find(|p| p.player == player_id)
            .expect("every player was scored");
        let seat = state.player_mut(player_id).expect("player exists");
        for id in &die_ids {
            if let Some(die) = seat.dice.iter_mut().find(|d| d.id == *id) {
                die.spend();
            }
        }
        if state.current_set == 1 {
            seat.set1_score = placement.points;
        } else {
            seat.set2_score = placement.points;
        }
        seat.current_round_score = seat.set1_score + seat.set2_score;
        results.push(dg_registry::SetResult {
            player_id,
            hand,
            dice_used: die_ids,
            dice_values: faces,
            placement: placement.placement,
            points: placement.points,
        });
    }

    state.set_results = results.clone();
    state.phase = Phase::SetReveal;
    vec![
        EngineOutcome::SetRevealed { results },
        EngineOutcome::PhaseChanged(Phase::SetReveal),
    ]
}

fn next_set(state: &mut GameState) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::SetReveal {
        return Err(EngineError::InvalidPhase);
    }
    if state.current_set == 1 {
        state.set1_results_buffer = std::mem::take(&mut state.set_results);
        state.current_set = 2;
        state.current_turn_index = 0;
        state.pending_selections.clear();
        state.phase = Phase::SetSelection;
        let mut outcomes = vec![EngineOutcome::PhaseChanged(Phase::SetSelection)];
        if let Some(holder) = state.current_turn_holder() {
            outcomes.push(EngineOutcome::TurnStarted { player: holder });
        }
        Ok(outcomes)
    } else {
        Ok(enter_round_summary(state))
    }
}

/// ROUND_SUMMARY's entry action: apply prediction bonuses, credit cumulative
/// score, and append the completed `RoundResult` to history (spec §4.4).
fn enter_round_summary(state: &mut GameState) -> Vec<EngineOutcome> {
    let count = state.players.len();
    let mut predictions = Vec::with_capacity(count);
    for player in &mut state.players {
        let round_total = (player.set1_score + player.set2_score).round() as u32;
        let prediction = player
            .prediction
            .expect("every player has a prediction by SET_SELECTION entry");
        let bonus = prediction_bonus(prediction, round_total, count);
        player.cumulative_score += player.current_round_score + bonus;
        predictions.push(PredictionOutcome {
            player_id: player.id,
            prediction,
            round_total,
            bonus,
        });
    }

    let result = RoundResult {
        round: state.current_round,
        set1_results: std::mem::take(&mut state.set1_results_buffer),
        set2_results: std::mem::take(&mut state.set_results),
        predictions,
    };
    state.round_history.push(result.clone());
    state.phase = Phase::RoundSummary;
    vec![
        EngineOutcome::RoundComplete { result },
        EngineOutcome::PhaseChanged(Phase::RoundSummary),
    ]
}

fn next_round(
    state: &mut GameState,
    rng: &mut impl Rng,
) -> Result<Vec<EngineOutcome>, EngineError> {
    if state.phase != Phase::RoundSummary {
        return Err(EngineError::InvalidPhase);
    }
    if state.current_round >= state.config.total_rounds {
        state.phase = Phase::GameOver;
        let standings: Vec<(PlayerId, f64)> = state
            .players
            .iter()
            .map(|p| (p.id, p.cumulative_score))
            .collect();
        return Ok(vec![
            EngineOutcome::GameOver { standings },
            EngineOutcome::PhaseChanged(Phase::GameOver),
        ]);
    }

    state.current_round += 1;
    state.current_set = 1;
    state.current_turn_index = 0;
    state.pending_selections.clear();
    state.set_results.clear();
    state.set1_results_buffer.clear();

    let scores: Vec<(PlayerId, dg_core::Points)> = state
        .players
        .iter()
        .map(|p| (p.id, p.cumulative_score))
        .collect();
    state.turn_order = dg_scoring::subsequent_turn_order(&scores, &state.initial_turn_order);

    for player in &mut state.players {
        player.reset_for_round();
    }
    deal_round(state, rng);

    state.phase = Phase::Prediction;
    Ok(vec![EngineOutcome::PhaseChanged(Phase::Prediction)])
}
