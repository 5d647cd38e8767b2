//! Session gateway (spec §4.6): bridges WebSocket sessions to rooms.
//!
//! One [`Gateway`] serves every room on the process. It owns the lobby
//! registry, the state store, the acknowledgement coordinator, the
//! all-disconnected sweeper, and a map of per-room engine-command senders,
//! plus the socket/session bookkeeping needed to turn [`EngineOutcome`]s and
//! registry results into per-viewer [`ServerMessage`]s. Modeled on the
//! teacher's `Casino`/`Client` bridge (`rbp-hosting`), generalized from one
//! socket per seat to many sockets broadcasting into one room.
mod ack;
mod error;
mod reconnect;
mod session;
mod sweep;
mod visibility;

pub use ack::AckCoordinator;
pub use error::engine_error_code;
pub use error::registry_error_code;
pub use session::SessionInfo;
pub use sweep::Sweeper;
pub use visibility::redact_for;
pub use visibility::visible_selection;

use ack::AckEvent;
use dg_dto::ClientMessage;
use dg_dto::ErrorCode;
use dg_dto::InitialRollEntry;
use dg_dto::ServerMessage;
use dg_dto::Standing;
use dg_engine::EngineEvent;
use dg_engine::EngineOutcome;
use dg_engine::RoomActor;
use dg_engine::RoomOutcome;
use dg_registry::GameConfigOverrides;
use dg_registry::GameState;
use dg_registry::Phase;
use dg_registry::PlayerId;
use dg_registry::RoomCode;
use dg_registry::RoomRegistry;
use dg_registry::SessionHandle;
use dg_store::game_key;
use dg_store::StateStore;
use dg_timers::TimerEvent;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::sync::RwLock;

pub struct Gateway {
    registry: Arc<RoomRegistry>,
    store: Arc<dyn StateStore>,
    ack: AckCoordinator,
    sweeper: Arc<Sweeper>,
    outcomes_tx: UnboundedSender<RoomOutcome>,
    engines: RwLock<HashMap<RoomCode, UnboundedSender<dg_engine::EngineCommand>>>,
    sockets: RwLock<HashMap<SessionHandle, UnboundedSender<String>>>,
    groups: RwLock<HashMap<RoomCode, HashSet<SessionHandle>>>,
    sessions: RwLock<HashMap<SessionHandle, SessionInfo>>,
}

impl Gateway {
    pub fn new(store: Arc<dyn StateStore>) -> Arc<Self> {
        let registry = Arc::new(RoomRegistry::new());
        let sweeper = Sweeper::new(registry.clone());
        let (outcomes_tx, outcomes_rx) = unbounded_channel();
        let gateway = Arc::new(Self {
            registry,
            store,
            ack: AckCoordinator::new(),
            sweeper,
            outcomes_tx,
            engines: RwLock::new(HashMap::new()),
            sockets: RwLock::new(HashMap::new()),
            groups: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        });
        gateway.sweeper.spawn();
        let loop_handle = gateway.clone();
        tokio::spawn(async move { loop_handle.outcome_loop(outcomes_rx).await });
        gateway
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Registers a newly accepted socket under a fresh session handle
    /// (spec §4.6: a session exists from the moment a socket connects,
    /// before it joins any room).
    pub async fn connect(&self, session: SessionHandle, tx: UnboundedSender<String>) {
        self.sockets.write().await.insert(session.clone(), tx);
        self.sessions
            .write()
            .await
            .insert(session, SessionInfo::default());
    }

    /// Tears down a closed socket: marks its seated player disconnected (if
    /// any) so an in-progress game waits for reconnection rather than
    /// stalling, and notifies the rest of the room.
    pub async fn disconnect(&self, session: &str) {
        self.sockets.write().await.remove(session);
        let Some(info) = self.sessions.write().await.remove(session) else {
            return;
        };
        let (Some(room_code), Some(player_id)) = (info.room_code, info.player_id) else {
            return;
        };
        self.remove_from_group(&room_code, session).await;
        if let Ok(state) = self.registry.mark_disconnected(&room_code, player_id).await {
            self.persist(&state).await;
            self.broadcast_all(&room_code, &ServerMessage::PlayerDisconnected { player_id })
                .await;
        }
    }

    /// Parses and dispatches one inbound message. Malformed payloads are
    /// sunk silently (spec §7: "malformed payloads sink silently or reject
    /// with a generic `room:error`" — a client sending garbage gets no
    /// special treatment since it isn't acting in good faith either way).
    pub async fn handle_message(self: &Arc<Self>, session: &str, raw: &str) {
        let Ok(message) = ClientMessage::from_json(raw) else {
            return;
        };
        match message {
            ClientMessage::RoomCreate { player_name, config } => {
                self.on_room_create(session, player_name, config.unwrap_or_default())
                    .await;
            }
            ClientMessage::RoomJoin { room_code, player_name } => {
                self.on_room_join(session, room_code, player_name).await;
            }
            ClientMessage::RoomLeave => self.on_room_leave(session).await,
            ClientMessage::RoomReconnect { token } => {
                self.on_room_reconnect(session, token).await;
            }
            ClientMessage::GameReady => self.on_ready(session, true).await,
            ClientMessage::GameUnready => self.on_ready(session, false).await,
            ClientMessage::GameUpdateConfig { config } => {
                self.on_update_config(session, config).await;
            }
            ClientMessage::GameStart => self.on_game_start(session).await,
            ClientMessage::PredictionSubmit { prediction } => {
                self.on_player_event(session, |player| EngineEvent::SubmitPrediction {
                    player,
                    prediction,
                })
                .await;
            }
            ClientMessage::DiceSelect { die_ids } => {
                self.on_player_event(session, |player| EngineEvent::SelectDice {
                    player,
                    die_ids,
                })
                .await;
            }
            ClientMessage::DiceConfirm => {
                self.on_player_event(session, |player| EngineEvent::ConfirmSelection { player })
                    .await;
            }
            ClientMessage::GameAcknowledgeResults => self.on_acknowledge(session).await,
        }
    }

    // ---- room lifecycle -------------------------------------------------

    async fn on_room_create(&self, session: &str, player_name: String, config: GameConfigOverrides) {
        if !session::valid_player_name(&player_name) {
            return;
        }
        let (room_code, player_id, state) = self
            .registry
            .create_room(player_name, session.to_string(), config)
            .await;
        self.persist(&state).await;
        let token = reconnect::issue(self.store.as_ref(), player_id, room_code.clone()).await;
        self.join_group(&room_code, session).await;
        self.set_session_info(session, player_id, room_code.clone(), token.token.clone())
            .await;
        let game_state = visibility::redact_for(&state, player_id);
        self.send_to(
            session,
            &ServerMessage::RoomCreated {
                room_code,
                player_id,
                reconnect_token: token.token,
                game_state,
            },
        )
        .await;
    }

    async fn on_room_join(&self, session: &str, room_code: String, player_name: String) {
        if !session::valid_room_code(&room_code) || !session::valid_player_name(&player_name) {
            return;
        }
        match self
            .registry
            .join_room(&room_code, player_name, session.to_string())
            .await
        {
            Ok((player_id, state)) => {
                self.persist(&state).await;
                let token = reconnect::issue(self.store.as_ref(), player_id, room_code.clone()).await;
                self.join_group(&room_code, session).await;
                self.set_session_info(session, player_id, room_code.clone(), token.token.clone())
                    .await;
                let game_state = visibility::redact_for(&state, player_id);
                self.send_to(
                    session,
                    &ServerMessage::RoomJoined {
                        room_code: room_code.clone(),
                        player_id,
                        reconnect_token: token.token,
                        game_state,
                    },
                )
                .await;
                self.broadcast_game_state(&room_code, &state, Some(session), |viewer_state| {
                    ServerMessage::RoomPlayerJoined {
                        player_id,
                        game_state: viewer_state,
                    }
                })
                .await;
            }
            Err(e) => self.send_error(session, &e.to_string(), registry_error_code(&e)).await,
        }
    }

    async fn on_room_leave(&self, session: &str) {
        let Some((room_code, player_id)) = self.session_room_player(session).await else {
            return;
        };
        let previous_host = self.registry.get(&room_code).await.map(|s| s.host_id);
        match self.registry.leave_room(&room_code, player_id).await {
            Ok(Some(state)) => {
                self.persist(&state).await;
                self.remove_from_group(&room_code, session).await;
                self.clear_session_room(session).await;
                self.broadcast_game_state(&room_code, &state, None, |viewer_state| {
                    ServerMessage::RoomPlayerLeft {
                        player_id,
                        game_state: viewer_state,
                    }
                })
                .await;
                if previous_host != Some(state.host_id) {
                    self.broadcast_all(
                        &room_code,
                        &ServerMessage::RoomHostChanged { host_id: state.host_id },
                    )
                    .await;
                }
            }
            Ok(None) => {
                self.remove_from_group(&room_code, session).await;
                self.clear_session_room(session).await;
                self.teardown_room(&room_code).await;
            }
            Err(_) => {}
        }
    }

    async fn on_room_reconnect(&self, session: &str, token: String) {
        let Some(record) = reconnect::redeem(self.store.as_ref(), &token).await else {
            self.send_to(
                session,
                &ServerMessage::ReconnectFailed {
                    message: "reconnect token is invalid or expired".into(),
                },
            )
            .await;
            return;
        };
        match self
            .registry
            .mark_reconnected(&record.room_code, record.player_id, session.to_string())
            .await
        {
            Ok(state) => {
                self.persist(&state).await;
                self.join_group(&record.room_code, session).await;
                self.set_session_info(session, record.player_id, record.room_code.clone(), token)
                    .await;
                let game_state = visibility::redact_for(&state, record.player_id);
                self.send_to(
                    session,
                    &ServerMessage::ReconnectSuccess {
                        game_state,
                        player_id: record.player_id,
                    },
                )
                .await;
                self.broadcast_all(
                    &record.room_code,
                    &ServerMessage::PlayerReconnected { player_id: record.player_id },
                )
                .await;
            }
            Err(_) => {
                self.send_to(
                    session,
                    &ServerMessage::ReconnectFailed {
                        message: "room no longer exists".into(),
                    },
                )
                .await;
            }
        }
    }

    async fn on_ready(&self, session: &str, ready: bool) {
        let Some((room_code, player_id)) = self.session_room_player(session).await else {
            return;
        };
        match self.registry.set_player_ready(&room_code, player_id, ready).await {
            Ok(state) => {
                self.persist(&state).await;
                self.broadcast_game_state(&room_code, &state, None, |viewer_state| {
                    ServerMessage::GameStateUpdate { game_state: viewer_state }
                })
                .await;
            }
            Err(e) => self.send_error(session, &e.to_string(), registry_error_code(&e)).await,
        }
    }

    async fn on_update_config(&self, session: &str, overrides: GameConfigOverrides) {
        let Some((room_code, player_id)) = self.session_room_player(session).await else {
            return;
        };
        match self.registry.update_config(&room_code, player_id, overrides).await {
            Ok(state) => {
                self.persist(&state).await;
                self.broadcast_all(
                    &room_code,
                    &ServerMessage::RoomConfigUpdated {
                        config: state.config.clone(),
                        game_state: state.clone(),
                    },
                )
                .await;
            }
            Err(e) => self.send_error(session, &e.to_string(), registry_error_code(&e)).await,
        }
    }

    async fn on_game_start(&self, session: &str) {
        let Some((room_code, player_id)) = self.session_room_player(session).await else {
            return;
        };
        match self.registry.start_game(&room_code, player_id).await {
            Ok(state) => {
                self.persist(&state).await;
                let tx = RoomActor::spawn(state, self.outcomes_tx.clone());
                self.engines.write().await.insert(room_code, tx);
            }
            Err(e) => self.send_error(session, &e.to_string(), registry_error_code(&e)).await,
        }
    }

    async fn on_player_event(&self, session: &str, build: impl FnOnce(PlayerId) -> EngineEvent) {
        let Some((room_code, player_id)) = self.session_room_player(session).await else {
            return;
        };
        let event = build(player_id);
        if let Err((message, code)) = self.send_engine_command(&room_code, event).await {
            self.send_error(session, &message, code).await;
        }
    }

    async fn on_acknowledge(self: &Arc<Self>, session: &str) {
        let Some((room_code, player_id)) = self.session_room_player(session).await else {
            return;
        };
        let Some(state) = self.registry.get(&room_code).await else {
            return;
        };
        if !matches!(state.phase, Phase::SetReveal | Phase::RoundSummary) {
            return;
        }
        let connected = state.connected_player_ids();
        let Some((event, timeout_rx)) = self.ack.record_ack(&room_code, player_id, &connected).await
        else {
            return;
        };
        if let Some(rx) = timeout_rx {
            self.spawn_ack_timeout_watcher(room_code.clone(), rx);
        }
        match event {
            AckEvent::Progress {
                acknowledged_count,
                total_count,
                waiting_for,
            } => {
                self.broadcast_all(
                    &room_code,
                    &ServerMessage::ResultsAcknowledged {
                        player_id,
                        acknowledged_count,
                        total_count,
                    },
                )
                .await;
                self.broadcast_all(
                    &room_code,
                    &ServerMessage::ResultsWaitingFor {
                        waiting_for_player_ids: waiting_for,
                    },
                )
                .await;
            }
            AckEvent::Complete => self.advance_past_ack(&room_code, state.phase).await,
        }
    }

    /// Spawns a one-shot watcher for the results-ack forced timeout (spec
    /// §4.7 step 5). Lives only as long as it takes the timer to either
    /// fire or be cancelled by the window completing naturally first.
    fn spawn_ack_timeout_watcher(self: &Arc<Self>, room_code: RoomCode, mut rx: UnboundedReceiver<TimerEvent>) {
        let gateway = self.clone();
        tokio::spawn(async move {
            if rx.recv().await.is_some() && gateway.ack.force_complete(&room_code).await {
                if let Some(state) = gateway.registry.get(&room_code).await {
                    gateway.advance_past_ack(&room_code, state.phase).await;
                }
            }
        });
    }

    /// Sends the `NEXT_SET`/`NEXT_ROUND` event that an ack window's
    /// completion (natural or forced) unblocks, chosen by which results
    /// screen was open when the window completed.
    async fn advance_past_ack(&self, room_code: &str, phase: Phase) {
        let event = match phase {
            Phase::SetReveal => EngineEvent::NextSet,
            Phase::RoundSummary => EngineEvent::NextRound,
            _ => return,
        };
        if let Err((message, code)) = self.send_engine_command(room_code, event).await {
            log::warn!("[room {}] forced ack-advance rejected: {} ({:?})", room_code, message, code);
        }
    }

    // ---- engine outcomes --------------------------------------------------

    async fn outcome_loop(self: Arc<Self>, mut rx: UnboundedReceiver<RoomOutcome>) {
        while let Some((room_code, state, outcome)) = rx.recv().await {
            self.persist(&state).await;
            self.registry.put(state.clone()).await;
            self.handle_outcome(&room_code, &state, outcome).await;
        }
    }

    async fn handle_outcome(&self, room_code: &str, state: &GameState, outcome: EngineOutcome) {
        match outcome {
            EngineOutcome::InitialRollComplete { rolls, turn_order } => {
                let results = rolls
                    .into_iter()
                    .map(|(player_id, roll)| InitialRollEntry { player_id, roll })
                    .collect();
                self.broadcast_all(room_code, &ServerMessage::GameInitialRoll { results, turn_order })
                    .await;
            }
            EngineOutcome::PhaseChanged(phase) => {
                if matches!(phase, Phase::SetReveal | Phase::RoundSummary) {
                    self.ack
                        .open_window(room_code, state.connected_player_ids().len())
                        .await;
                }
                self.broadcast_game_state(room_code, state, None, |viewer_state| {
                    ServerMessage::GamePhaseChange {
                        phase,
                        game_state: viewer_state,
                    }
                })
                .await;
            }
            EngineOutcome::TurnStarted { player } => {
                self.broadcast_all(
                    room_code,
                    &ServerMessage::GameTurnStart {
                        player_id: player,
                        time_remaining: state.config.turn_timer_seconds,
                    },
                )
                .await;
            }
            EngineOutcome::PredictionRecorded { player } => {
                self.broadcast_all(room_code, &ServerMessage::PredictionSubmitted { player_id: player })
                    .await;
            }
            EngineOutcome::AllPredictionsSubmitted => {
                self.broadcast_all(room_code, &ServerMessage::PredictionAllSubmitted).await;
            }
            EngineOutcome::PredictionImminent => {
                self.broadcast_all(
                    room_code,
                    &ServerMessage::PredictionAutoSubmitting {
                        countdown: dg_core::PREDICTION_GRACE,
                    },
                )
                .await;
            }
            EngineOutcome::DiceSelected { player, die_ids } => {
                let (visible_dice, hidden_count) = visibility::visible_selection(state, player, &die_ids);
                self.broadcast_all(
                    room_code,
                    &ServerMessage::DiceSelected {
                        player_id: player,
                        visible_dice,
                        hidden_count,
                    },
                )
                .await;
            }
            EngineOutcome::DiceConfirmed { player } => {
                self.broadcast_all(room_code, &ServerMessage::DiceConfirmed { player_id: player })
                    .await;
            }
            EngineOutcome::SetRevealed { results } => {
                self.broadcast_all(
                    room_code,
                    &ServerMessage::SetReveal {
                        results,
                        game_state: state.clone(),
                    },
                )
                .await;
            }
            EngineOutcome::RoundComplete { result } => {
                self.broadcast_all(
                    room_code,
                    &ServerMessage::RoundComplete {
                        result,
                        game_state: state.clone(),
                    },
                )
                .await;
            }
            EngineOutcome::GameOver { standings } => {
                self.ack.close(room_code).await;
                self.engines.write().await.remove(room_code);
                let final_standings = standings
                    .into_iter()
                    .map(|(player_id, score)| Standing { player_id, score })
                    .collect();
                self.broadcast_all(room_code, &ServerMessage::GameOver { final_standings }).await;
            }
            EngineOutcome::TimerTick { seconds_remaining, .. } => {
                self.broadcast_all(
                    room_code,
                    &ServerMessage::GameTimerTick {
                        time_remaining: seconds_remaining,
                    },
                )
                .await;
            }
        }
    }

    /// Forwards a client-initiated event to the room's actor and waits for
    /// its accept/reject reply (spec §4.4, §4.6: rejections are sent only to
    /// the initiating client, never broadcast).
    async fn send_engine_command(
        &self,
        room_code: &str,
        event: EngineEvent,
    ) -> Result<(), (String, ErrorCode)> {
        let tx = self.engines.read().await.get(room_code).cloned();
        let Some(tx) = tx else {
            return Err(("no active game in this room".into(), ErrorCode::InvalidPhase));
        };
        let (reply_tx, reply_rx) = oneshot::channel();
        if tx.send((event, reply_tx)).is_err() {
            return Err(("room actor is no longer running".into(), ErrorCode::InvalidPhase));
        }
        match reply_rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err((e.to_string(), engine_error_code(&e))),
            Err(_) => Err(("room actor is no longer running".into(), ErrorCode::InvalidPhase)),
        }
    }

    // ---- bookkeeping ------------------------------------------------------

    async fn teardown_room(&self, room_code: &str) {
        self.engines.write().await.remove(room_code);
        self.ack.close(room_code).await;
        self.groups.write().await.remove(room_code);
        self.store.delete(&game_key(room_code)).await;
    }

    async fn persist(&self, state: &GameState) {
        self.store
            .set(
                &game_key(&state.room_code),
                serde_json::to_string(state).expect("serialize game state"),
                dg_core::STATE_TTL,
            )
            .await;
    }

    async fn session_room_player(&self, session: &str) -> Option<(RoomCode, PlayerId)> {
        let info = self.sessions.read().await.get(session).cloned()?;
        Some((info.room_code?, info.player_id?))
    }

    async fn set_session_info(&self, session: &str, player_id: PlayerId, room_code: RoomCode, token: String) {
        self.sessions.write().await.insert(
            session.to_string(),
            SessionInfo {
                player_id: Some(player_id),
                room_code: Some(room_code),
                reconnect_token: Some(token),
            },
        );
    }

    async fn clear_session_room(&self, session: &str) {
        if let Some(info) = self.sessions.write().await.get_mut(session) {
            info.player_id = None;
            info.room_code = None;
            info.reconnect_token = None;
        }
    }

    async fn join_group(&self, room_code: &str, session: &str) {
        self.groups
            .write()
            .await
            .entry(room_code.to_string())
            .or_default()
            .insert(session.to_string());
    }

    async fn remove_from_group(&self, room_code: &str, session: &str) {
        if let Some(group) = self.groups.write().await.get_mut(room_code) {
            group.remove(session);
        }
    }

    async fn send_to(&self, session: &str, message: &ServerMessage) {
        if let Some(tx) = self.sockets.read().await.get(session) {
            let _ = tx.send(message.to_json());
        }
    }

    async fn send_error(&self, session: &str, message: &str, code: ErrorCode) {
        self.send_to(session, &ServerMessage::error(message.to_string(), code)).await;
    }

    async fn broadcast_all(&self, room_code: &str, message: &ServerMessage) {
        let group = self.groups.read().await.get(room_code).cloned().unwrap_or_default();
        let sockets = self.sockets.read().await;
        let payload = message.to_json();
        for member in group {
            if let Some(tx) = sockets.get(&member) {
                let _ = tx.send(payload.clone());
            }
        }
    }

    /// Broadcasts a message whose payload embeds the room's `GameState`,
    /// redacting each recipient's copy for their own point of view (spec
    /// §4.6 visibility policy). `exclude`, when set, skips one session — used
    /// when that session already received an equivalent message of its own
    /// (e.g. the joiner gets `room:joined`, not `room:playerJoined`).
    async fn broadcast_game_state<F>(&self, room_code: &str, state: &GameState, exclude: Option<&str>, build: F)
    where
        F: Fn(GameState) -> ServerMessage,
    {
        let group = self.groups.read().await.get(room_code).cloned().unwrap_or_default();
        let sessions = self.sessions.read().await;
        let sockets = self.sockets.read().await;
        for member in group {
            if exclude == Some(member.as_str()) {
                continue;
            }
            let Some(viewer) = sessions.get(&member).and_then(|s| s.player_id) else {
                continue;
            };
            let Some(tx) = sockets.get(&member) else {
                continue;
            };
            let redacted = visibility::redact_for(state, viewer);
            let _ = tx.send(build(redacted).to_json());
        }
    }
}
