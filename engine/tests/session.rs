mod common;

use common::{referee, Scripted, ScriptedArbiter};
use std::time::Duration;

use kendo_engine::{
    Arbiter, ArbiterError, ArbiterRequest, Distance, MatchSession, MatchState, Stance,
    TurnKind, TurnRejection, Verdict, Winner,
};

/// Yields to the scheduler a few times before answering, so a competing
/// submission gets polled while this one is in flight.
struct SlowArbiter;

impl Arbiter for SlowArbiter {
    async fn judge(&self, _request: &ArbiterRequest) -> Result<Verdict, ArbiterError> {
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        Ok(Verdict {
            theoretical_winner: Winner::None,
            reason_narrative: "Ai-uchi.".into(),
        })
    }
}

/// Never answers.
struct SilentArbiter;

impl Arbiter for SilentArbiter {
    async fn judge(&self, _request: &ArbiterRequest) -> Result<Verdict, ArbiterError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn overlapping_submission_is_rejected_not_queued() {
    let session = MatchSession::new(referee(SlowArbiter, Scripted::default()), MatchState::default());
    let watcher = session.subscribe();

    let (first, second) = tokio::join!(session.submit("ippon"), async {
        let saw_busy = watcher.borrow().busy;
        (saw_busy, session.submit("kaeshi").await)
    });

    let first = first.unwrap();
    let (saw_busy, second) = second;
    assert!(saw_busy, "observers should see the in-flight snapshot");
    assert_eq!(second.unwrap_err(), TurnRejection::Busy);

    let latest = session.snapshot();
    assert_eq!(latest, first.state);
    assert!(!latest.busy);
    assert_eq!(latest.history.len(), 1);
    assert_eq!(latest.recent_player_actions.iter().collect::<Vec<_>>(), ["ippon"]);
}

#[tokio::test]
async fn observers_receive_each_resolved_snapshot() {
    let session = MatchSession::new(
        referee(ScriptedArbiter::new(&[Winner::Player]), Scripted::rolls(&[0.95])),
        MatchState::default(),
    );
    let mut rx = session.subscribe();

    let report = session.submit("debana").await.unwrap();
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone();
    assert_eq!(seen, report.state);
    assert_eq!(seen.player_score, 1);
    assert_eq!(seen.version, 2);
}

#[tokio::test]
async fn invalid_input_publishes_nothing() {
    let session = MatchSession::new(
        referee(ScriptedArbiter::default(), Scripted::default()),
        MatchState::default(),
    );
    let rx = session.subscribe();
    assert_eq!(
        session.submit("men").await.unwrap_err(),
        TurnRejection::UnknownAction("men".into())
    );
    assert!(!rx.has_changed().unwrap());
    assert_eq!(session.snapshot(), MatchState::default());
}

#[tokio::test]
async fn reset_starts_a_fresh_match_with_a_new_stance() {
    let session = MatchSession::new(
        referee(ScriptedArbiter::new(&[Winner::Cpu]), Scripted::rolls(&[0.7])),
        MatchState::default(),
    );
    session.submit("ippon").await.unwrap();
    let before = session.snapshot();
    assert_eq!(before.cpu_score, 1);

    let fresh = session.reset(Stance::Aggressive).unwrap();
    assert_eq!(fresh.player_stance, Stance::Aggressive);
    assert_eq!(fresh.cpu_stance, before.cpu_stance);
    assert_eq!((fresh.player_score, fresh.cpu_score), (0, 0));
    assert!(fresh.history.is_empty());
    assert!(fresh.version > before.version);
    assert_eq!(session.snapshot(), fresh);
}

#[tokio::test]
async fn abandoned_turn_leaves_the_match_playable() {
    let session =
        MatchSession::new(referee(SilentArbiter, Scripted::default()), MatchState::default());

    let timed_out = tokio::time::timeout(Duration::from_millis(20), session.submit("ippon")).await;
    assert!(timed_out.is_err());

    let after = session.snapshot();
    assert!(!after.busy);
    assert!(after.history.is_empty());
    assert!(after.recent_player_actions.is_empty());
    assert_eq!(after.distance, Distance::Mid);
    assert_eq!(after.version, 2);

    // The CPU steps back at Issoku-itto, so no judgment is needed.
    let report = session.submit("move_backward").await.unwrap();
    assert_eq!(report.kind, TurnKind::PureMovement);
    assert_eq!(report.state.distance, Distance::Far);
    assert_eq!(report.state.history.len(), 1);
    assert!(report.state.version > after.version);
}

#[tokio::test]
async fn reset_keeps_the_opening_distance() {
    let session = MatchSession::new(
        referee(ScriptedArbiter::default(), Scripted::default()),
        MatchState::starting_at(Stance::Defensive, Stance::Aggressive, Distance::Far),
    );
    // Both step in from Toh-ma.
    let report = session.submit("move_forward").await.unwrap();
    assert_eq!(report.state.distance, Distance::Close);

    let fresh = session.reset(Stance::Defensive).unwrap();
    assert_eq!(fresh.distance, Distance::Far);
}
