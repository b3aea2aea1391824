#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use kendo_engine::{
    Arbiter, ArbiterError, ArbiterRequest, Catalog, MatchState, RandomSource, Referee, Verdict,
    Winner,
};

/// Random source with scripted draws. Lottery tickets default to the last
/// slot, so the CPU picks the last action with positive weight.
#[derive(Default)]
pub struct Scripted {
    pub tickets: VecDeque<u32>,
    pub units: VecDeque<f64>,
}

impl Scripted {
    pub fn rolls(units: &[f64]) -> Self {
        Self {
            tickets: VecDeque::new(),
            units: units.iter().copied().collect(),
        }
    }

    pub fn tickets(tickets: &[u32]) -> Self {
        Self {
            tickets: tickets.iter().copied().collect(),
            units: VecDeque::new(),
        }
    }
}

impl RandomSource for Scripted {
    fn unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(0.0)
    }

    fn index(&mut self, len: u32) -> u32 {
        self.tickets
            .pop_front()
            .map(|t| t.min(len - 1))
            .unwrap_or(len - 1)
    }
}

/// Arbiter that replays verdicts in order and counts calls. When the script
/// runs out it answers NONE.
#[derive(Default)]
pub struct ScriptedArbiter {
    verdicts: Mutex<VecDeque<Result<Winner, ()>>>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<ArbiterRequest>>,
}

impl ScriptedArbiter {
    pub fn new(verdicts: &[Winner]) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.iter().copied().map(Ok).collect()),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            verdicts: Mutex::new(std::iter::repeat(Err(())).take(64).collect()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Arbiter for ScriptedArbiter {
    async fn judge(&self, request: &ArbiterRequest) -> Result<Verdict, ArbiterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.verdicts.lock().unwrap().pop_front();
        match next.unwrap_or(Ok(Winner::None)) {
            Ok(winner) => Ok(Verdict {
                theoretical_winner: winner,
                reason_narrative: format!(
                    "{} vs {}.",
                    request.player_action.name, request.cpu_action.name
                ),
            }),
            Err(()) => Err(ArbiterError::Parse("garbled".into())),
        }
    }
}

pub fn referee<A: Arbiter, R: RandomSource>(arbiter: A, rng: R) -> Referee<A, R> {
    Referee::new(Catalog::builtin().unwrap(), arbiter, rng)
}

pub fn fresh() -> MatchState {
    MatchState::default()
}
