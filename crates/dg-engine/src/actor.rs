use crate::event::EngineEvent;
use crate::outcome::EngineOutcome;
use crate::transition::apply_event;
use dg_registry::GameState;
use dg_registry::Phase;
use dg_registry::RoomCode;
use dg_timers::spawn_prediction_timer;
use dg_timers::spawn_turn_timer;
use dg_timers::TimerEvent;
use dg_timers::TimerHandle;
use dg_timers::TimerKind;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Everything the gateway needs to know happened, tagged with the room it
/// happened in and the state the room was in immediately after, so one
/// outcome channel can serve every active room without the gateway having
/// to round-trip a separate state query per message it builds.
pub type RoomOutcome = (RoomCode, GameState, EngineOutcome);

/// A client-initiated event plus the reply slot the gateway uses to learn
/// whether it was accepted, so a rejection (spec §4.4: "Rule errors are
/// caught at the gateway boundary and sent only to the initiating client")
/// can be routed back to the one session that sent it. The shared outcome
/// channel only ever carries accepted state changes, so rejections need
/// this separate return path.
pub type EngineCommand = (EngineEvent, oneshot::Sender<Result<(), crate::error::EngineError>>);

/// Single-writer owner of one room's in-game state (spec §5: "each room
/// behaves as a single-writer actor"). Modeled on the teacher's
/// `gameroom::Room::run` / `Actor::run` event loop: a task that owns its
/// mailbox and applies one event at a time, running guarded transitions to a
/// fixed point before the next event is accepted.
///
/// Unlike the teacher's per-seat `Actor`, there is exactly one `RoomActor`
/// per room (not per player) because engine events are a property of the
/// room, not of any one connection.
pub struct RoomActor {
    room_code: RoomCode,
    state: GameState,
    rng: SmallRng,
    turn_timer_seconds: dg_core::Seconds,
    outcomes: UnboundedSender<RoomOutcome>,
    inbox: UnboundedReceiver<EngineCommand>,
    timer_tx: UnboundedSender<TimerEvent>,
    timer_rx: UnboundedReceiver<TimerEvent>,
    turn_timer: Option<TimerHandle>,
    prediction_timer: Option<TimerHandle>,
}

impl RoomActor {
    /// Spawns the actor task and returns a sender for engine events. The
    /// caller (the gateway) is expected to call this immediately after
    /// `dg_registry::RoomRegistry::start_game` succeeds, with the
    /// `InitialRoll`-phase state it returned.
    pub fn spawn(
        state: GameState,
        outcomes: UnboundedSender<RoomOutcome>,
    ) -> UnboundedSender<EngineCommand> {
        let (tx, inbox) = unbounded_channel();
        let (timer_tx, timer_rx) = unbounded_channel();
        let turn_timer_seconds = state.config.turn_timer_seconds;
        let actor = Self {
            room_code: state.room_code.clone(),
            state,
            rng: SmallRng::from_rng(&mut rand::rng()),
            turn_timer_seconds,
            outcomes,
            inbox,
            timer_tx,
            timer_rx,
            turn_timer: None,
            prediction_timer: None,
        };
        tokio::spawn(actor.run());
        tx
    }

    async fn run(mut self) {
        log::info!("[room {}] actor started", self.room_code);
        let _ = self.drive(EngineEvent::StartGame);
        loop {
            tokio::select! {
                command = self.inbox.recv() => {
                    match command {
                        Some((event, reply)) => {
                            let result = self.drive(event);
                            let _ = reply.send(result);
                        }
                        None => break,
                    }
                }
                timer_event = self.timer_rx.recv() => {
                    match timer_event {
                        Some(timer_event) => self.handle_timer(timer_event),
                        None => continue,
                    }
                }
            }
            if self.state.phase == Phase::GameOver {
                break;
            }
        }
        log::info!("[room {}] actor stopped", self.room_code);
    }

    /// Applies one event to a fixed point and broadcasts every outcome it
    /// produced via the shared outcome channel. Returns `Ok(())`/`Err` only
    /// so a client-initiated command's caller can learn whether its own
    /// event was accepted; rejection detail never needs to travel any
    /// further than that one reply, since the outcome channel already
    /// carries every *accepted* state change to every room observer.
    fn drive(&mut self, event: EngineEvent) -> Result<(), crate::error::EngineError> {
        match apply_event(&mut self.state, event, &mut self.rng) {
            Ok(outcomes) => {
                for outcome in &outcomes {
                    self.sync_timers(outcome);
                }
                for outcome in outcomes {
                    let _ = self
                        .outcomes
                        .send((self.room_code.clone(), self.state.clone(), outcome));
                }
                Ok(())
            }
            Err(e) => {
                log::debug!("[room {}] event rejected: {}", self.room_code, e);
                Err(e)
            }
        }
    }

    /// Starts or clears the turn/prediction timers in response to phase and
    /// turn-holder changes (spec §4.5). The results-ack timeout is owned by
    /// the acknowledgement coordinator in `dg-gateway`, not here, since it
    /// tracks per-socket acknowledgement rather than engine phase.
    fn sync_timers(&mut self, outcome: &EngineOutcome) {
        match outcome {
            EngineOutcome::PhaseChanged(Phase::Prediction) => {
                if let Some(t) = self.turn_timer.take() {
                    t.cancel();
                }
                if let Some(t) = self.prediction_timer.take() {
                    t.cancel();
                }
                self.prediction_timer = Some(spawn_prediction_timer(
                    self.turn_timer_seconds,
                    self.timer_tx.clone(),
                ));
            }
            EngineOutcome::PhaseChanged(Phase::SetSelection) => {
                if let Some(t) = self.prediction_timer.take() {
                    t.cancel();
                }
            }
            EngineOutcome::TurnStarted { .. } => {
                if let Some(t) = self.turn_timer.take() {
                    t.cancel();
                }
                self.turn_timer = Some(spawn_turn_timer(
                    self.turn_timer_seconds,
                    self.timer_tx.clone(),
                ));
            }
            EngineOutcome::PhaseChanged(Phase::SetReveal) => {
                if let Some(t) = self.turn_timer.take() {
                    t.cancel();
                }
            }
            EngineOutcome::PhaseChanged(Phase::GameOver) => {
                if let Some(t) = self.turn_timer.take() {
                    t.cancel();
                }
                if let Some(t) = self.prediction_timer.take() {
                    t.cancel();
                }
            }
            _ => {}
        }
    }

    fn handle_timer(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Tick { kind, seconds_remaining } => {
                log::trace!(
                    "[room {}] {:?} timer: {}s remaining",
                    self.room_code,
                    kind,
                    seconds_remaining
                );
                let _ = self.outcomes.send((
                    self.room_code.clone(),
                    self.state.clone(),
                    EngineOutcome::TimerTick {
                        kind,
                        seconds_remaining,
                    },
                ));
            }
            TimerEvent::PredictionImminent => {
                log::debug!("[room {}] prediction auto-submit imminent", self.room_code);
                let _ = self.outcomes.send((
                    self.room_code.clone(),
                    self.state.clone(),
                    EngineOutcome::PredictionImminent,
                ));
            }
            TimerEvent::Fire(TimerKind::Turn) => {
                let _ = self.drive(EngineEvent::TurnTimeout);
            }
            TimerEvent::Fire(TimerKind::Prediction) => {
                let _ = self.drive(EngineEvent::PredictionTimeout);
            }
            TimerEvent::Fire(TimerKind::ResultsAck) => {
                log::warn!(
                    "[room {}] unexpected results-ack fire on engine actor; ignored",
                    self.room_code
                );
            }
        }
    }
}
