//! Single owner of a live match. Publishes every snapshot to observers and
//! turns away overlapping submissions instead of queueing them.

use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::arbiter::Arbiter;
use crate::distance::Distance;
use crate::error::TurnRejection;
use crate::state::MatchState;
use crate::turn::{Referee, TurnReport};
use crate::{RandomSource, Stance};

pub struct MatchSession<A, R> {
    referee: Mutex<Referee<A, R>>,
    snapshots: watch::Sender<MatchState>,
    opening: Distance,
}

/// Republishes the pre-turn snapshot if a turn is dropped before it resolves.
struct Rollback<'a> {
    snapshots: &'a watch::Sender<MatchState>,
    previous: Option<MatchState>,
}

impl Rollback<'_> {
    fn disarm(&mut self) {
        self.previous = None;
    }
}

impl Drop for Rollback<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            warn!(version = previous.version, "turn abandoned; previous snapshot restored");
            self.snapshots.send_replace(previous);
        }
    }
}

impl<A: Arbiter, R: RandomSource> MatchSession<A, R> {
    pub fn new(referee: Referee<A, R>, initial: MatchState) -> Self {
        let opening = initial.distance;
        let (snapshots, _) = watch::channel(initial);
        Self {
            referee: Mutex::new(referee),
            snapshots,
            opening,
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> MatchState {
        self.snapshots.borrow().clone()
    }

    /// Receives the busy snapshot as soon as a turn starts, then the resolved one.
    pub fn subscribe(&self) -> watch::Receiver<MatchState> {
        self.snapshots.subscribe()
    }

    /// Plays one turn for the player. While a turn is in flight any other
    /// call returns `TurnRejection::Busy` immediately. Dropping the future
    /// before it completes voids the turn and restores the previous state.
    pub async fn submit(&self, player_action_id: &str) -> Result<TurnReport, TurnRejection> {
        let mut referee = self
            .referee
            .try_lock()
            .map_err(|_| TurnRejection::Busy)?;

        let current = self.snapshot();
        let pending = referee.begin_turn(&current, player_action_id)?;
        let mut restored = current;
        restored.version = pending.busy_state().version + 1;
        self.snapshots.send_replace(pending.busy_state().clone());
        let mut rollback = Rollback {
            snapshots: &self.snapshots,
            previous: Some(restored),
        };

        let report = referee.finish_turn(pending).await;
        rollback.disarm();
        self.snapshots.send_replace(report.state.clone());
        Ok(report)
    }

    /// Throws the current match away and starts a fresh one at the distance
    /// this session opened with.
    pub fn reset(&self, player_stance: Stance) -> Result<MatchState, TurnRejection> {
        let _guard = self
            .referee
            .try_lock()
            .map_err(|_| TurnRejection::Busy)?;
        let previous = self.snapshot();
        let mut fresh = MatchState::starting_at(player_stance, previous.cpu_stance, self.opening);
        fresh.version = previous.version + 1;
        self.snapshots.send_replace(fresh.clone());
        info!(stance = player_stance.label(), "match reset");
        Ok(fresh)
    }
}
