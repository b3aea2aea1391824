use kendo_engine::{resolve_distance, Action, Direction, Distance, Movement};

fn fwd() -> Action {
    Action::Move(Movement::StepForward)
}

fn back() -> Action {
    Action::Move(Movement::StepBackward)
}

fn strike() -> Action {
    Action::Technique("ippon".into())
}

#[test]
fn collision_and_disengagement() {
    for d in [Distance::Far, Distance::Mid, Distance::Close] {
        assert_eq!(resolve_distance(d, &fwd(), &fwd()), Distance::Close);
        assert_eq!(resolve_distance(d, &back(), &back()), Distance::Far);
    }
}

#[test]
fn single_forward_mover_closes_one_level() {
    assert_eq!(resolve_distance(Distance::Far, &fwd(), &strike()), Distance::Mid);
    assert_eq!(resolve_distance(Distance::Mid, &fwd(), &strike()), Distance::Close);
    assert_eq!(resolve_distance(Distance::Mid, &strike(), &fwd()), Distance::Close);
    // Already nearest.
    assert_eq!(resolve_distance(Distance::Close, &fwd(), &strike()), Distance::Close);
}

#[test]
fn single_backward_mover_opens_one_level() {
    assert_eq!(resolve_distance(Distance::Close, &back(), &strike()), Distance::Mid);
    assert_eq!(resolve_distance(Distance::Mid, &strike(), &back()), Distance::Far);
    assert_eq!(resolve_distance(Distance::Far, &back(), &strike()), Distance::Far);
}

#[test]
fn techniques_alone_leave_distance_alone() {
    let counter = Action::Technique("kaeshi".into());
    for d in [Distance::Far, Distance::Mid, Distance::Close] {
        assert_eq!(resolve_distance(d, &strike(), &counter), d);
    }
}

#[test]
fn opposite_steps_cancel() {
    for d in [Distance::Far, Distance::Mid, Distance::Close] {
        assert_eq!(resolve_distance(d, &fwd(), &back()), d);
        assert_eq!(resolve_distance(d, &back(), &fwd()), d);
    }
}

#[test]
fn only_direction_matters_not_side() {
    let actions = [fwd(), back(), strike()];
    for d in [Distance::Far, Distance::Mid, Distance::Close] {
        for a in &actions {
            for b in &actions {
                assert_eq!(resolve_distance(d, a, b), resolve_distance(d, b, a));
            }
        }
    }
    assert_eq!(Direction::of(&strike()), Direction::Neither);
}
