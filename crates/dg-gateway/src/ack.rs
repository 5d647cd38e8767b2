use dg_registry::PlayerId;
use dg_registry::RoomCode;
use dg_timers::spawn_results_ack_timeout;
use dg_timers::TimerEvent;
use dg_timers::TimerHandle;
use std::collections::HashMap;
use std::collections::HashSet;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::RwLock;

struct Window {
    acknowledged: HashSet<PlayerId>,
    total: usize,
    timer: Option<TimerHandle>,
}

/// What happened as a result of one [`AckCoordinator::record_ack`] call
/// (spec §4.7, steps 3-4).
#[derive(Debug)]
pub enum AckEvent {
    Progress {
        acknowledged_count: usize,
        total_count: usize,
        waiting_for: Vec<PlayerId>,
    },
    Complete,
}

/// Tracks, per room, which connected players have acknowledged the current
/// SET_REVEAL/ROUND_SUMMARY results screen (spec §4.7). Owns no engine or
/// session handles itself; the gateway drives the engine and broadcasts
/// based on the events this returns.
#[derive(Default)]
pub struct AckCoordinator {
    windows: RwLock<HashMap<RoomCode, Window>>,
}

impl AckCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh ack window for a room, replacing (and cancelling the
    /// timer of) any window still open from a prior SET_REVEAL/
    /// ROUND_SUMMARY. Called whenever the engine emits one of those
    /// outcomes.
    pub async fn open_window(&self, room_code: &str, total_connected: usize) {
        let mut windows = self.windows.write().await;
        if let Some(prev) = windows.remove(room_code) {
            if let Some(t) = prev.timer {
                t.cancel();
            }
        }
        windows.insert(
            room_code.to_string(),
            Window {
                acknowledged: HashSet::new(),
                total: total_connected,
                timer: None,
            },
        );
    }

    /// Records one player's acknowledgement. Returns `None` if there is no
    /// open window for the room or the player already acked (spec: "at
    /// most once"). On the first ack of a window, also returns a receiver
    /// the caller should await exactly once to learn when the results-ack
    /// timeout fires (step 1).
    pub async fn record_ack(
        &self,
        room_code: &str,
        player: PlayerId,
        connected: &[PlayerId],
    ) -> Option<(AckEvent, Option<UnboundedReceiver<TimerEvent>>)> {
        let mut windows = self.windows.write().await;
        let window = windows.get_mut(room_code)?;
        if !window.acknowledged.insert(player) {
            return None;
        }
        let mut timeout_rx = None;
        if window.timer.is_none() {
            let (tx, rx) = unbounded_channel();
            window.timer = Some(spawn_results_ack_timeout(tx));
            timeout_rx = Some(rx);
        }
        window.total = connected.len();
        let waiting_for: Vec<PlayerId> = connected
            .iter()
            .copied()
            .filter(|p| !window.acknowledged.contains(p))
            .collect();
        let complete = waiting_for.is_empty();
        let event = if complete {
            AckEvent::Complete
        } else {
            AckEvent::Progress {
                acknowledged_count: window.acknowledged.len(),
                total_count: window.total,
                waiting_for,
            }
        };
        if complete {
            if let Some(t) = windows.remove(room_code).and_then(|w| w.timer) {
                t.cancel();
            }
        }
        Some((event, timeout_rx))
    }

    /// Forces a window closed on results-ack timeout (spec §4.7 step 5).
    /// Returns `true` if a window was actually open (a stale timer firing
    /// after the window already completed naturally is a no-op).
    pub async fn force_complete(&self, room_code: &str) -> bool {
        self.windows.write().await.remove(room_code).is_some()
    }

    pub async fn close(&self, room_code: &str) {
        if let Some(w) = self.windows.write().await.remove(room_code) {
            if let Some(t) = w.timer {
                t.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_ack_of_one_connected_player_completes_immediately() {
        let coord = AckCoordinator::new();
        let p = PlayerId::default();
        coord.open_window("ABC123", 1).await;
        let (event, rx) = coord.record_ack("ABC123", p, &[p]).await.unwrap();
        assert!(matches!(event, AckEvent::Complete));
        assert!(rx.is_some());
    }

    #[tokio::test]
    async fn repeated_ack_from_same_player_is_ignored() {
        let coord = AckCoordinator::new();
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        coord.open_window("ABC123", 2).await;
        coord.record_ack("ABC123", p1, &[p1, p2]).await.unwrap();
        assert!(coord.record_ack("ABC123", p1, &[p1, p2]).await.is_none());
    }

    #[tokio::test]
    async fn progress_lists_outstanding_connected_players() {
        let coord = AckCoordinator::new();
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        coord.open_window("ABC123", 2).await;
        let (event, _) = coord.record_ack("ABC123", p1, &[p1, p2]).await.unwrap();
        match event {
            AckEvent::Progress {
                acknowledged_count,
                total_count,
                waiting_for,
            } => {
                assert_eq!(acknowledged_count, 1);
                assert_eq!(total_count, 2);
                assert_eq!(waiting_for, vec![p2]);
            }
            AckEvent::Complete => panic!("expected progress"),
        }
    }

    #[tokio::test]
    async fn new_window_cancels_and_replaces_the_old_one() {
        let coord = AckCoordinator::new();
        let p1 = PlayerId::default();
        let p2 = PlayerId::default();
        coord.open_window("ABC123", 2).await;
        coord.record_ack("ABC123", p1, &[p1, p2]).await;
        coord.open_window("ABC123", 3).await;
        assert!(coord.force_complete("ABC123").await);
    }
}
