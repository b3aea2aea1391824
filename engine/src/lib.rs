use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub mod arbiter;
pub mod catalog;
pub mod config;
pub mod distance;
pub mod error;
pub mod session;
pub mod state;
pub mod strategy;
pub mod turn;

pub use arbiter::{AnyArbiter, Arbiter, ArbiterRequest, LlmArbiter, UnavailableArbiter, Verdict};
pub use catalog::{Action, ActionProfile, Catalog, Category, Movement, Technique, TechniqueRole};
pub use config::{load_config, parse_config, ArbiterSettings, ConfigFormat, MatchConfig};
pub use distance::{resolve_distance, Direction, Distance};
pub use error::{ArbiterError, CatalogError, TurnRejection};
pub use session::MatchSession;
pub use state::{MatchState, MatchStatus, PlayerWindow, POINTS_TO_WIN, WINDOW_LEN};
pub use strategy::{action_weights, decide_cpu_action, draw_weighted, DecisionContext};
pub use turn::{
    score_verdict, PendingTurn, Referee, TurnKind, TurnOutcome, TurnReport, IPPON_THRESHOLD,
};

/// Combat posture (kamae).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    /// Chudan: the standard mid-level guard.
    #[default]
    #[serde(alias = "chudan")]
    Defensive,
    /// Jodan: overhead guard, strong men strike, exposed wrists.
    #[serde(alias = "jodan")]
    Aggressive,
}

impl Stance {
    pub fn label(self) -> &'static str {
        match self {
            Stance::Defensive => "Chudan (中段)",
            Stance::Aggressive => "Jodan (上段)",
        }
    }

    pub fn parse(s: &str) -> Option<Stance> {
        match s.trim().to_lowercase().as_str() {
            "defensive" | "chudan" => Some(Stance::Defensive),
            "aggressive" | "jodan" => Some(Stance::Aggressive),
            _ => None,
        }
    }
}

/// One of the two fighters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Player,
    Cpu,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Player => "Player",
            Side::Cpu => "CPU",
        }
    }
}

/// Who takes the point on a turn, if anyone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Player,
    Cpu,
    #[default]
    None,
}

impl Winner {
    pub fn side(self) -> Option<Side> {
        match self {
            Winner::Player => Some(Side::Player),
            Winner::Cpu => Some(Side::Cpu),
            Winner::None => None,
        }
    }
}

/// Uniform randomness consumed by the decision lottery and the Ippon roll.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: u32) -> u32;
}

pub struct Dice {
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RandomSource for Dice {
    fn unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    fn index(&mut self, len: u32) -> u32 {
        self.rng.gen_range(0..len.max(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn unit(&mut self) -> f64 {
        (**self).unit()
    }

    fn index(&mut self, len: u32) -> u32 {
        (**self).index(len)
    }
}
