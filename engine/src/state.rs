use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::distance::Distance;
use crate::{Side, Stance};

/// How many of the player's latest actions the CPU remembers.
pub const WINDOW_LEN: usize = 5;
/// First to this many points wins the match (sanbon shobu is out of scope).
pub const POINTS_TO_WIN: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    InProgress,
    Over { winner: Side },
}

/// Sliding window of the player's most recent action ids, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PlayerWindow(VecDeque<String>);

impl PlayerWindow {
    pub fn push(&mut self, id: impl Into<String>) {
        self.0.push_back(id.into());
        while self.0.len() > WINDOW_LEN {
            self.0.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.0.iter().map(String::as_str)
    }

    /// The newest `n` entries, oldest first.
    pub fn last(&self, n: usize) -> impl Iterator<Item = &str> + '_ {
        self.iter().skip(self.len().saturating_sub(n))
    }
}

impl From<Vec<String>> for PlayerWindow {
    fn from(ids: Vec<String>) -> Self {
        let mut window = PlayerWindow::default();
        for id in ids {
            window.push(id);
        }
        window
    }
}

impl From<PlayerWindow> for Vec<String> {
    fn from(window: PlayerWindow) -> Self {
        window.0.into_iter().collect()
    }
}

/// Snapshot of a match. Each resolved turn produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Bumped for every published snapshot.
    pub version: u64,
    pub player_stance: Stance,
    pub cpu_stance: Stance,
    pub distance: Distance,
    pub player_score: u8,
    pub cpu_score: u8,
    pub history: Vec<String>,
    pub recent_player_actions: PlayerWindow,
    pub busy: bool,
    #[serde(flatten)]
    pub status: MatchStatus,
    /// Side that scored on the latest turn, for one-shot hit effects.
    #[serde(default)]
    pub last_scorer: Option<Side>,
}

impl MatchState {
    pub fn new(player_stance: Stance, cpu_stance: Stance) -> Self {
        Self::starting_at(player_stance, cpu_stance, Distance::Mid)
    }

    pub fn starting_at(player_stance: Stance, cpu_stance: Stance, distance: Distance) -> Self {
        Self {
            version: 0,
            player_stance,
            cpu_stance,
            distance,
            player_score: 0,
            cpu_score: 0,
            history: Vec::new(),
            recent_player_actions: PlayerWindow::default(),
            busy: false,
            status: MatchStatus::InProgress,
            last_scorer: None,
        }
    }

    pub fn from_config(cfg: &MatchConfig) -> Self {
        Self::starting_at(cfg.player_stance, cfg.cpu_stance, cfg.starting_distance)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, MatchStatus::Over { .. })
    }

    pub fn winner(&self) -> Option<Side> {
        match self.status {
            MatchStatus::Over { winner } => Some(winner),
            MatchStatus::InProgress => None,
        }
    }

    pub fn score(&self, side: Side) -> u8 {
        match side {
            Side::Player => self.player_score,
            Side::Cpu => self.cpu_score,
        }
    }

    /// Adds a point and ends the match once a side reaches [`POINTS_TO_WIN`].
    pub(crate) fn award_point(&mut self, side: Side) {
        if self.is_over() {
            return;
        }
        let score = match side {
            Side::Player => &mut self.player_score,
            Side::Cpu => &mut self.cpu_score,
        };
        *score = (*score + 1).min(POINTS_TO_WIN);
        if *score >= POINTS_TO_WIN {
            self.status = MatchStatus::Over { winner: side };
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(Stance::Defensive, Stance::Aggressive)
    }
}
