//! Per-room countdown timers (spec §4.5).
//!
//! Each timer is a spawned task that ticks once a second and, on reaching
//! zero, synthesizes a terminal event back to the room that started it.
//! Cancellation is cooperative: a cancelled timer's in-flight ticks may
//! still land, but its terminal event never fires (spec §5: "a cancellation
//! after fire must discard the late event" — here we guarantee the inverse
//! and stronger property, no fire at all after cancel).
//!
//! Modeled on the teacher's `gameroom::timer::Timer`, generalized from a
//! single polled deadline into three spawned, event-emitting variants
//! because this system pushes ticks to clients rather than having them
//! polled by an actor loop.
use dg_core::Seconds;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Which timer fired or ticked.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Turn,
    Prediction,
    ResultsAck,
}

/// Events emitted by a running timer. The room actor forwards [`Fire`]
/// variants into the engine as the corresponding synthetic event
/// (`TURN_TIMEOUT`, `PREDICTION_TIMEOUT`, forced `NEXT_SET`/`NEXT_ROUND`) and
/// forwards ticks straight to the gateway for broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick {
        kind: TimerKind,
        seconds_remaining: u32,
    },
    /// The prediction timer has hit zero and entered its 3-second grace
    /// period; clients should show an auto-submission warning.
    PredictionImminent,
    Fire(TimerKind),
}

/// Handle to a running timer task. Dropping it without calling [`cancel`]
/// leaves the timer running to completion.
pub struct TimerHandle {
    cancel: oneshot::Sender<()>,
}

impl TimerHandle {
    /// Cancels the timer. Idempotent: cancelling an already-fired or
    /// already-cancelled timer is a no-op.
    pub fn cancel(self) {
        let _ = self.cancel.send(());
    }
}

/// Starts a turn timer: ticks once a second down from `seconds`, then fires
/// `Fire(TimerKind::Turn)`.
pub fn spawn_turn_timer(seconds: Seconds, tx: UnboundedSender<TimerEvent>) -> TimerHandle {
    spawn_countdown(TimerKind::Turn, seconds, tx)
}

/// Starts a prediction timer: ticks once a second down from `seconds`, then
/// emits [`TimerEvent::PredictionImminent`] and waits a fixed
/// [`dg_core::PREDICTION_GRACE`] before firing
/// `Fire(TimerKind::Prediction)`.
pub fn spawn_prediction_timer(seconds: Seconds, tx: UnboundedSender<TimerEvent>) -> TimerHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel();
    tokio::spawn(async move {
        if !tick_down(TimerKind::Prediction, seconds, &tx, &mut cancel_rx).await {
            return;
        }
        let _ = tx.send(TimerEvent::PredictionImminent);
        tokio::select! {
            _ = &mut cancel_rx => {
                log::debug!("prediction timer cancelled during grace period");
                return;
            }
            _ = tokio::time::sleep(Duration::from_secs(dg_core::PREDICTION_GRACE as u64)) => {}
        }
        let _ = tx.send(TimerEvent::Fire(TimerKind::Prediction));
    });
    TimerHandle { cancel: cancel_tx }
}

/// Starts the results-acknowledge forced-advance timeout: a flat
/// [`dg_core::RESULTS_ACK_TIMEOUT`] seconds with no ticks, then fires
/// `Fire(TimerKind::ResultsAck)`.
pub fn spawn_results_ack_timeout(tx: UnboundedSender<TimerEvent>) -> TimerHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel();
    tokio::spawn(async move {
        tokio::select! {
            _ = &mut cancel_rx => {
                log::debug!("results-ack timeout cancelled");
                return;
            }
            _ = tokio::time::sleep(Duration::from_secs(dg_core::RESULTS_ACK_TIMEOUT as u64)) => {}
        }
        let _ = tx.send(TimerEvent::Fire(TimerKind::ResultsAck));
    });
    TimerHandle { cancel: cancel_tx }
}

fn spawn_countdown(
    kind: TimerKind,
    seconds: Seconds,
    tx: UnboundedSender<TimerEvent>,
) -> TimerHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tick_down(kind, seconds, &tx, &mut cancel_rx).await {
            let _ = tx.send(TimerEvent::Fire(kind));
        }
    });
    TimerHandle { cancel: cancel_tx }
}

/// Ticks once a second from `seconds` down to zero, sending a `Tick` each
/// time. Returns `true` if the countdown ran to completion, `false` if it
/// was cancelled partway through.
async fn tick_down(
    kind: TimerKind,
    seconds: Seconds,
    tx: &UnboundedSender<TimerEvent>,
    cancel_rx: &mut oneshot::Receiver<()>,
) -> bool {
    let mut remaining = seconds;
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await; // first tick fires immediately; consume it as t=0 reference
    loop {
        if remaining == 0 {
            return true;
        }
        tokio::select! {
            _ = &mut *cancel_rx => {
                log::debug!("{:?} timer cancelled with {}s remaining", kind, remaining);
                return false;
            }
            _ = interval.tick() => {
                remaining -= 1;
                let _ = tx.send(TimerEvent::Tick { kind, seconds_remaining: remaining });
            }
        }
    }
}

impl std::fmt::Debug for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Turn => "turn",
            Self::Prediction => "prediction",
            Self::ResultsAck => "results-ack",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::Duration as StdDuration;

    #[tokio::test(start_paused = true)]
    async fn turn_timer_fires_after_duration() {
        let (tx, mut rx) = unbounded_channel();
        let _handle = spawn_turn_timer(2, tx);
        tokio::time::advance(StdDuration::from_secs(1)).await;
        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Tick {
                kind: TimerKind::Turn,
                seconds_remaining: 1
            })
        );
        tokio::time::advance(StdDuration::from_secs(1)).await;
        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Tick {
                kind: TimerKind::Turn,
                seconds_remaining: 0
            })
        );
        assert_eq!(rx.recv().await, Some(TimerEvent::Fire(TimerKind::Turn)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let (tx, mut rx) = unbounded_channel();
        let handle = spawn_turn_timer(5, tx);
        tokio::time::advance(StdDuration::from_secs(1)).await;
        let _ = rx.recv().await; // first tick
        handle.cancel();
        tokio::time::advance(StdDuration::from_secs(10)).await;
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn prediction_timer_waits_grace_then_fires() {
        let (tx, mut rx) = unbounded_channel();
        let _handle = spawn_prediction_timer(1, tx);
        tokio::time::advance(StdDuration::from_secs(1)).await;
        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Tick {
                kind: TimerKind::Prediction,
                seconds_remaining: 0
            })
        );
        assert_eq!(rx.recv().await, Some(TimerEvent::PredictionImminent));
        tokio::time::advance(StdDuration::from_secs(dg_core::PREDICTION_GRACE as u64)).await;
        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Fire(TimerKind::Prediction))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn results_ack_timeout_fires_with_no_ticks() {
        let (tx, mut rx) = unbounded_channel();
        let _handle = spawn_results_ack_timeout(tx);
        tokio::time::advance(StdDuration::from_secs(dg_core::RESULTS_ACK_TIMEOUT as u64)).await;
        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Fire(TimerKind::ResultsAck))
        );
    }
}
