mod common;

use common::{fresh, referee, Scripted, ScriptedArbiter};
use kendo_engine::turn::{DEFERRED_NARRATIVE, MOVEMENT_NARRATIVE};
use kendo_engine::{
    Distance, MatchState, MatchStatus, Side, Stance, TurnKind, TurnRejection, Winner,
};

#[tokio::test]
async fn pure_movement_turn_skips_the_arbiter() {
    // Last-slot tickets: the CPU steps back at Issoku-itto.
    let mut r = referee(ScriptedArbiter::new(&[Winner::Player]), Scripted::default());
    let report = r.resolve_turn(&fresh(), "move_backward").await.unwrap();

    assert_eq!(report.kind, TurnKind::PureMovement);
    assert_eq!(report.outcome.cpu_action, "move_backward");
    assert_eq!(report.outcome.winner, Winner::None);
    assert_eq!(report.state.distance, Distance::Far);
    assert_eq!(report.state.history, vec![MOVEMENT_NARRATIVE.to_string()]);
    assert_eq!((report.state.player_score, report.state.cpu_score), (0, 0));
    assert_eq!(r.arbiter().calls(), 0);
}

#[tokio::test]
async fn movement_sequence_follows_the_distance_model() {
    let mut r = referee(ScriptedArbiter::default(), Scripted::default());
    let mut state = fresh();
    let mut seen = Vec::new();
    for action in ["move_backward", "move_backward", "move_forward", "move_backward"] {
        let report = r.resolve_turn(&state, action).await.unwrap();
        assert_eq!(report.kind, TurnKind::PureMovement);
        seen.push((report.outcome.cpu_action.clone(), report.state.distance));
        state = report.state;
    }
    assert_eq!(
        seen,
        vec![
            ("move_backward".to_string(), Distance::Far),
            // Opposite steps cancel out at Toh-ma.
            ("move_forward".to_string(), Distance::Far),
            ("move_forward".to_string(), Distance::Close),
            ("move_backward".to_string(), Distance::Far),
        ]
    );
    assert_eq!(r.arbiter().calls(), 0);
}

#[tokio::test]
async fn scoring_hit_resets_to_striking_distance() {
    // CPU steps back (candidate Toh-ma) but the player's strike lands.
    let mut r = referee(ScriptedArbiter::new(&[Winner::Player]), Scripted::rolls(&[0.75]));
    let report = r.resolve_turn(&fresh(), "ippon").await.unwrap();

    assert_eq!(report.kind, TurnKind::Interactive);
    assert_eq!(report.outcome.winner, Winner::Player);
    assert!(report.outcome.ippon);
    assert_eq!(report.state.player_score, 1);
    assert_eq!(report.state.distance, Distance::Mid);
    assert_eq!(report.state.last_scorer, Some(Side::Player));
    assert!(report.outcome.reason.contains("0.75"));
    assert_eq!(r.arbiter().calls(), 1);
}

#[tokio::test]
async fn shallow_strike_is_a_near_miss() {
    let mut r = referee(ScriptedArbiter::new(&[Winner::Player]), Scripted::rolls(&[0.4]));
    let report = r.resolve_turn(&fresh(), "ippon").await.unwrap();

    assert_eq!(report.outcome.winner, Winner::None);
    assert!(!report.outcome.ippon);
    assert!(report.outcome.reason.contains("No point"));
    assert!(report.outcome.reason.contains("0.40"));
    assert_eq!(report.state.player_score, 0);
    assert_eq!(report.state.last_scorer, None);
    // Nobody scored, so the CPU's step back stands.
    assert_eq!(report.state.distance, Distance::Far);
}

#[tokio::test]
async fn none_verdict_never_scores() {
    let mut r = referee(ScriptedArbiter::new(&[Winner::None]), Scripted::rolls(&[0.99]));
    let report = r.resolve_turn(&fresh(), "kaeshi").await.unwrap();
    assert_eq!(report.outcome.winner, Winner::None);
    assert!(report.outcome.ippon);
    assert_eq!(report.state.player_score + report.state.cpu_score, 0);
}

#[tokio::test]
async fn arbiter_failure_voids_the_turn() {
    let mut r = referee(ScriptedArbiter::failing(), Scripted::rolls(&[0.99]));
    let start = fresh();
    let report = r.resolve_turn(&start, "ippon").await.unwrap();

    assert_eq!(report.outcome.winner, Winner::None);
    assert_eq!(report.outcome.reason, DEFERRED_NARRATIVE);
    assert!(!report.outcome.distance_check);
    assert_eq!(report.outcome.roll, 0.0);
    // Distance stays put even though the CPU stepped back.
    assert_eq!(report.state.distance, Distance::Mid);
    assert_eq!(report.state.history, vec![DEFERRED_NARRATIVE.to_string()]);
    assert_eq!(report.state.recent_player_actions.len(), 1);
    assert!(!report.state.busy);
    assert!(report.state.version > start.version);
}

#[tokio::test]
async fn arbiter_sees_the_pre_turn_context() {
    let mut r = referee(ScriptedArbiter::default(), Scripted::default());
    let start = MatchState::starting_at(Stance::Aggressive, Stance::Defensive, Distance::Close);
    r.resolve_turn(&start, "hiki").await.unwrap();

    let requests = r.arbiter().requests.lock().unwrap();
    let req = &requests[0];
    assert_eq!(req.distance, Distance::Close);
    assert_eq!(req.player_stance, Stance::Aggressive);
    assert_eq!(req.cpu_stance, Stance::Defensive);
    assert_eq!(req.player_action.japanese, "引き技");
    assert_eq!(req.cpu_action.id, "move_backward");
}

#[tokio::test]
async fn invalid_and_out_of_turn_requests_are_declined() {
    let mut r = referee(ScriptedArbiter::default(), Scripted::default());
    let state = fresh();
    assert_eq!(
        r.resolve_turn(&state, "tsuki").await.unwrap_err(),
        TurnRejection::UnknownAction("tsuki".into())
    );

    let mut busy = fresh();
    busy.busy = true;
    assert_eq!(
        r.resolve_turn(&busy, "ippon").await.unwrap_err(),
        TurnRejection::Busy
    );
    assert_eq!(r.arbiter().calls(), 0);
}

#[tokio::test]
async fn match_ends_on_second_point_and_freezes() {
    let mut r = referee(
        ScriptedArbiter::new(&[Winner::Cpu, Winner::Player, Winner::Cpu]),
        Scripted::rolls(&[0.9, 0.1, 0.8]),
    );
    let mut state = fresh();
    for _ in 0..3 {
        state = r.resolve_turn(&state, "renzoku").await.unwrap().state;
    }
    assert_eq!(state.status, MatchStatus::Over { winner: Side::Cpu });
    assert_eq!((state.player_score, state.cpu_score), (0, 2));
    assert_eq!(state.history.len(), 3);

    let frozen = state.clone();
    assert_eq!(
        r.resolve_turn(&state, "ippon").await.unwrap_err(),
        TurnRejection::MatchOver
    );
    assert_eq!(state, frozen);
    assert_eq!(r.arbiter().calls(), 3);
}

#[tokio::test]
async fn window_keeps_the_five_latest_player_actions() {
    let mut r = referee(ScriptedArbiter::failing(), Scripted::default());
    let actions = [
        "ippon", "nuki", "move_backward", "harai", "amashi", "debana", "kaeshi",
    ];
    let mut state = fresh();
    for a in actions {
        state = r.resolve_turn(&state, a).await.unwrap().state;
        assert!(state.recent_player_actions.len() <= 5);
    }
    assert_eq!(
        state.recent_player_actions.iter().collect::<Vec<_>>(),
        ["move_backward", "harai", "amashi", "debana", "kaeshi"]
    );
    assert_eq!(state.history.len(), actions.len());
}

#[tokio::test]
async fn begin_turn_publishes_a_busy_snapshot() {
    let mut r = referee(ScriptedArbiter::default(), Scripted::default());
    let state = fresh();
    let pending = r.begin_turn(&state, "ippon").unwrap();
    assert!(pending.busy_state().busy);
    assert_eq!(pending.busy_state().version, state.version + 1);
    assert_eq!(pending.kind(), TurnKind::Interactive);
    assert_eq!(pending.candidate_distance(), Distance::Far);

    // The in-flight snapshot itself refuses a second turn.
    assert_eq!(
        r.begin_turn(pending.busy_state(), "ippon").unwrap_err(),
        TurnRejection::Busy
    );
    let report = r.finish_turn(pending).await;
    assert!(!report.state.busy);
    assert_eq!(report.state.version, state.version + 2);
}
