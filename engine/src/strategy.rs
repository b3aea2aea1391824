//! CPU opponent: a weighted lottery over every catalog action, shaped by
//! distance, the player's recent habits and both stances.

use indexmap::IndexMap;
use tracing::debug;

use crate::catalog::{Action, Catalog, Category, Movement, TechniqueRole};
use crate::distance::Distance;
use crate::state::{MatchState, PlayerWindow};
use crate::{RandomSource, Stance};

const BASE_WEIGHT: i32 = 1;

// Toh-ma: close the gap, keep a little room for debana against a rush.
const FAR_STEP_FORWARD: i32 = 100;
const FAR_INTERCEPTION: i32 = 5;

// Chika-ma: break the clinch or strike on the way out.
const CLOSE_RETREATING_STRIKE: i32 = 80;
const CLOSE_STEP_BACKWARD: i32 = 60;
const CLOSE_OTHER_TECHNIQUE: i32 = 5;

// Issoku-itto.
const MID_INITIATING: i32 = 30;
const MID_COUNTER: i32 = 20;
const MID_STEP_FORWARD: i32 = 15;
const MID_STEP_BACKWARD: i32 = 10;

const PATTERN_LOOKBACK: usize = 3;
const PATTERN_MIN_HITS: usize = 2;

/// Inputs the CPU gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub distance: Distance,
    pub player_stance: Stance,
    pub cpu_stance: Stance,
    pub recent_player_actions: &'a PlayerWindow,
}

impl<'a> DecisionContext<'a> {
    pub fn from_state(state: &'a MatchState) -> Self {
        Self {
            distance: state.distance,
            player_stance: state.player_stance,
            cpu_stance: state.cpu_stance,
            recent_player_actions: &state.recent_player_actions,
        }
    }
}

struct Weights<'a> {
    table: IndexMap<&'a str, i32>,
    catalog: &'a Catalog,
}

impl<'a> Weights<'a> {
    fn new(catalog: &'a Catalog) -> Self {
        let table = catalog.action_ids().map(|id| (id, BASE_WEIGHT)).collect();
        Self { table, catalog }
    }

    fn set(&mut self, id: &str, weight: i32) {
        if let Some(w) = self.table.get_mut(id) {
            *w = weight;
        }
    }

    fn add(&mut self, id: &str, delta: i32) {
        if let Some(w) = self.table.get_mut(id) {
            *w += delta;
        }
    }

    fn set_role(&mut self, role: TechniqueRole, weight: i32) {
        let catalog = self.catalog;
        if let Some(t) = catalog.by_role(role) {
            self.set(&t.id, weight);
        }
    }

    fn add_role(&mut self, role: TechniqueRole, delta: i32) {
        let catalog = self.catalog;
        if let Some(t) = catalog.by_role(role) {
            self.add(&t.id, delta);
        }
    }

    fn set_category(&mut self, category: Category, weight: i32) {
        let catalog = self.catalog;
        for id in catalog.ids_in(category) {
            self.set(id, weight);
        }
    }

    fn add_category(&mut self, category: Category, delta: i32) {
        let catalog = self.catalog;
        for id in catalog.ids_in(category) {
            self.add(id, delta);
        }
    }
}

/// Final (unclamped) weight of every action for this context, in catalog order.
pub fn action_weights<'a>(
    catalog: &'a Catalog,
    ctx: &DecisionContext<'_>,
) -> IndexMap<&'a str, i32> {
    let mut w = Weights::new(catalog);
    let forward = Movement::StepForward.id();
    let backward = Movement::StepBackward.id();

    match ctx.distance {
        Distance::Far => {
            w.set(forward, FAR_STEP_FORWARD);
            w.set(backward, 0);
            w.set_category(Category::Initiating, 0);
            w.set_category(Category::Counter, 0);
            w.set_role(TechniqueRole::Interception, FAR_INTERCEPTION);
        }
        Distance::Close => {
            w.set_category(Category::Initiating, CLOSE_OTHER_TECHNIQUE);
            w.set_category(Category::Counter, CLOSE_OTHER_TECHNIQUE);
            w.set_role(TechniqueRole::RetreatingStrike, CLOSE_RETREATING_STRIKE);
            w.set(backward, CLOSE_STEP_BACKWARD);
            w.set(forward, 0);
        }
        Distance::Mid => {
            w.set(forward, MID_STEP_FORWARD);
            w.set(backward, MID_STEP_BACKWARD);
            w.set_category(Category::Initiating, MID_INITIATING);
            w.set_category(Category::Counter, MID_COUNTER);
            w.set_role(TechniqueRole::RetreatingStrike, 0);

            adapt_to_pattern(&mut w, catalog, ctx.recent_player_actions);
            adapt_to_stances(&mut w, ctx.player_stance, ctx.cpu_stance);
        }
    }

    w.table
}

fn adapt_to_pattern(w: &mut Weights<'_>, catalog: &Catalog, recent: &PlayerWindow) {
    let last: Vec<&str> = recent.last(PATTERN_LOOKBACK).collect();
    let attacks = last
        .iter()
        .filter(|id| catalog.category_of(id) == Some(Category::Initiating))
        .count();
    let rushes = last
        .iter()
        .filter(|id| **id == Movement::StepForward.id())
        .count();

    if attacks >= PATTERN_MIN_HITS {
        // Attack-happy player: answer with oji waza, avoid ai-uchi.
        w.add_category(Category::Counter, 50);
        w.add_role(TechniqueRole::Interception, 60);
        w.add_role(TechniqueRole::PlainStrike, -10);
    }
    if rushes >= PATTERN_MIN_HITS {
        // Rushing player: catch them on the way in.
        w.add_role(TechniqueRole::Interception, 50);
        w.add_role(TechniqueRole::EvasiveCounter, 30);
        w.add_role(TechniqueRole::PlainStrike, 20);
    }
}

fn adapt_to_stances(w: &mut Weights<'_>, player: Stance, cpu: Stance) {
    match player {
        Stance::Aggressive => {
            w.add_role(TechniqueRole::Interception, 30);
            w.add_role(TechniqueRole::ParryRiposte, 20);
            w.add(Movement::StepForward.id(), -10);
        }
        Stance::Defensive => {
            w.add_role(TechniqueRole::Feint, 10);
        }
    }

    if cpu == Stance::Aggressive {
        w.add_role(TechniqueRole::PlainStrike, 25);
        w.add_category(Category::Counter, -10);
    }
}

/// Draws one id with probability proportional to its (floored, non-negative)
/// weight. Returns `None` when every weight is zero.
pub fn draw_weighted<'a, R: RandomSource>(
    weights: &IndexMap<&'a str, i32>,
    rng: &mut R,
) -> Option<&'a str> {
    let total: u32 = weights.values().map(|w| (*w).max(0) as u32).sum();
    if total == 0 {
        return None;
    }
    let mut ticket = rng.index(total);
    for (id, w) in weights {
        let w = (*w).max(0) as u32;
        if ticket < w {
            return Some(*id);
        }
        ticket -= w;
    }
    None
}

/// Picks the CPU's action for this turn. Never fails: falls back to stepping in.
pub fn decide_cpu_action<R: RandomSource>(
    catalog: &Catalog,
    ctx: &DecisionContext<'_>,
    rng: &mut R,
) -> Action {
    let weights = action_weights(catalog, ctx);
    debug!(distance = ?ctx.distance, ?weights, "cpu weights");

    let choice = choose_action(catalog, &weights, rng);
    debug!(action = choice.id(), "cpu decided");
    choice
}

fn choose_action<R: RandomSource>(
    catalog: &Catalog,
    weights: &IndexMap<&str, i32>,
    rng: &mut R,
) -> Action {
    draw_weighted(weights, rng)
        .and_then(|id| catalog.parse_action(id))
        .unwrap_or(Action::Move(Movement::StepForward))
}
