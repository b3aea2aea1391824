//! Turn orchestration: CPU decision, distance resolution, judgment and the
//! fold of the outcome into a new match snapshot.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::arbiter::{Arbiter, ArbiterRequest, Verdict};
use crate::catalog::{Action, Catalog};
use crate::distance::{resolve_distance, Distance};
use crate::error::TurnRejection;
use crate::state::MatchState;
use crate::strategy::{decide_cpu_action, DecisionContext};
use crate::{RandomSource, Winner};

/// A theoretical advantage only becomes a point when the roll is above this.
pub const IPPON_THRESHOLD: f64 = 0.6;

pub const MOVEMENT_NARRATIVE: &str = "Both fighters repositioned.";
pub const DEFERRED_NARRATIVE: &str =
    "The judges are conferring... judgment deferred, turn voided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// Both sides only stepped; resolved without the arbiter.
    PureMovement,
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub winner: Winner,
    pub reason: String,
    pub player_action: String,
    pub cpu_action: String,
    /// False when no judgment could be made.
    pub distance_check: bool,
    pub roll: f64,
    pub ippon: bool,
}

impl TurnOutcome {
    fn movement(player: &Action, cpu: &Action) -> Self {
        Self {
            winner: Winner::None,
            reason: MOVEMENT_NARRATIVE.to_string(),
            player_action: player.id().to_string(),
            cpu_action: cpu.id().to_string(),
            distance_check: true,
            roll: 0.0,
            ippon: false,
        }
    }

    fn deferred(player: &Action, cpu: &Action) -> Self {
        Self {
            winner: Winner::None,
            reason: DEFERRED_NARRATIVE.to_string(),
            player_action: player.id().to_string(),
            cpu_action: cpu.id().to_string(),
            distance_check: false,
            roll: 0.0,
            ippon: false,
        }
    }
}

/// Applies the Ippon roll to a verdict: an advantage scores only when
/// `roll > IPPON_THRESHOLD`.
pub fn score_verdict(
    verdict: Verdict,
    roll: f64,
    player_action: &str,
    cpu_action: &str,
) -> TurnOutcome {
    let ippon = roll > IPPON_THRESHOLD;
    let mut reason = verdict.reason_narrative;
    let winner = match verdict.theoretical_winner {
        Winner::None => {
            reason.push_str(" (Neither side landed a valid strike.)");
            Winner::None
        }
        advantage if ippon => {
            reason.push_str(&format!(" (Ki-ken-tai-itchi! Ippon. roll: {:.2})", roll));
            advantage
        }
        _ => {
            reason.push_str(&format!(
                " (Advantage taken, but the strike was too shallow or lacked zanshin. No point. roll: {:.2})",
                roll
            ));
            Winner::None
        }
    };

    TurnOutcome {
        winner,
        reason,
        player_action: player_action.to_string(),
        cpu_action: cpu_action.to_string(),
        distance_check: true,
        roll,
        ippon,
    }
}

/// A turn whose actions are fixed but whose judgment is still outstanding.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    busy: MatchState,
    player: Action,
    cpu: Action,
    kind: TurnKind,
    candidate: Distance,
}

impl PendingTurn {
    /// The snapshot to publish while the turn is in flight.
    pub fn busy_state(&self) -> &MatchState {
        &self.busy
    }

    pub fn kind(&self) -> TurnKind {
        self.kind
    }

    pub fn player_action(&self) -> &Action {
        &self.player
    }

    pub fn cpu_action(&self) -> &Action {
        &self.cpu
    }

    /// Distance if nobody scores and the turn is judged.
    pub fn candidate_distance(&self) -> Distance {
        self.candidate
    }
}

#[derive(Debug, Clone)]
pub struct TurnReport {
    pub state: MatchState,
    pub outcome: TurnOutcome,
    pub kind: TurnKind,
}

/// Owns everything a turn needs besides the match state itself.
pub struct Referee<A, R> {
    catalog: Catalog,
    arbiter: A,
    rng: R,
}

impl<A: Arbiter, R: RandomSource> Referee<A, R> {
    pub fn new(catalog: Catalog, arbiter: A, rng: R) -> Self {
        Self {
            catalog,
            arbiter,
            rng,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn arbiter(&self) -> &A {
        &self.arbiter
    }

    /// Validates the request, picks the CPU action and works out the
    /// movement-only distance. `state` is left untouched on rejection.
    pub fn begin_turn(
        &mut self,
        state: &MatchState,
        player_action_id: &str,
    ) -> Result<PendingTurn, TurnRejection> {
        let rejection = if state.is_over() {
            Some(TurnRejection::MatchOver)
        } else if state.busy {
            Some(TurnRejection::Busy)
        } else {
            None
        };
        if let Some(r) = rejection {
            warn!(action = player_action_id, reason = %r, "turn rejected");
            return Err(r);
        }
        let Some(player) = self.catalog.parse_action(player_action_id) else {
            let r = TurnRejection::UnknownAction(player_action_id.to_string());
            warn!(reason = %r, "turn rejected");
            return Err(r);
        };

        let mut busy = state.clone();
        busy.busy = true;
        busy.version += 1;

        let cpu = decide_cpu_action(
            &self.catalog,
            &DecisionContext::from_state(state),
            &mut self.rng,
        );
        let kind = if player.is_movement() && cpu.is_movement() {
            TurnKind::PureMovement
        } else {
            TurnKind::Interactive
        };
        let candidate = resolve_distance(state.distance, &player, &cpu);

        Ok(PendingTurn {
            busy,
            player,
            cpu,
            kind,
            candidate,
        })
    }

    /// Judges the turn (awaiting the arbiter for interactive turns) and folds
    /// the outcome into the next snapshot.
    pub async fn finish_turn(&mut self, pending: PendingTurn) -> TurnReport {
        let (outcome, distance) = match pending.kind {
            TurnKind::PureMovement => (
                TurnOutcome::movement(&pending.player, &pending.cpu),
                pending.candidate,
            ),
            TurnKind::Interactive => self.adjudicate(&pending).await,
        };

        let state = fold_outcome(pending.busy, &outcome, distance);
        info!(
            player = %outcome.player_action,
            cpu = %outcome.cpu_action,
            winner = ?outcome.winner,
            player_score = state.player_score,
            cpu_score = state.cpu_score,
            distance = ?state.distance,
            "turn resolved"
        );
        if let Some(winner) = state.winner() {
            info!(winner = winner.name(), "match over");
        }

        TurnReport {
            state,
            outcome,
            kind: pending.kind,
        }
    }

    pub async fn resolve_turn(
        &mut self,
        state: &MatchState,
        player_action_id: &str,
    ) -> Result<TurnReport, TurnRejection> {
        let pending = self.begin_turn(state, player_action_id)?;
        Ok(self.finish_turn(pending).await)
    }

    async fn adjudicate(&mut self, pending: &PendingTurn) -> (TurnOutcome, Distance) {
        let state = &pending.busy;
        let request = ArbiterRequest {
            player_stance: state.player_stance,
            cpu_stance: state.cpu_stance,
            distance: state.distance,
            player_action: self.catalog.profile(&pending.player),
            cpu_action: self.catalog.profile(&pending.cpu),
        };

        match self.arbiter.judge(&request).await {
            Ok(verdict) => {
                let roll = self.rng.unit();
                let outcome = score_verdict(
                    verdict,
                    roll,
                    pending.player.id(),
                    pending.cpu.id(),
                );
                (outcome, pending.candidate)
            }
            Err(e) => {
                warn!(error = %e, "arbiter failed; turn voided");
                (
                    TurnOutcome::deferred(&pending.player, &pending.cpu),
                    state.distance,
                )
            }
        }
    }
}

/// Folds one outcome into the in-flight snapshot. A point always resets the
/// distance to Issoku-itto.
fn fold_outcome(mut state: MatchState, outcome: &TurnOutcome, distance: Distance) -> MatchState {
    state.last_scorer = outcome.winner.side();
    match outcome.winner.side() {
        Some(side) => {
            state.award_point(side);
            state.distance = Distance::Mid;
        }
        None => state.distance = distance,
    }
    state.history.push(outcome.reason.clone());
    state
        .recent_player_actions
        .push(outcome.player_action.clone());
    state.busy = false;
    state.version += 1;
    state
}
