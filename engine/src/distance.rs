use serde::{Deserialize, Serialize};

use crate::catalog::{Action, Movement};

/// Maai: separation between the two fighters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    /// Toh-ma: out of reach.
    #[serde(alias = "toh_ma")]
    Far,
    /// Issoku-itto: one step, one strike.
    #[default]
    #[serde(alias = "issoku_itto")]
    Mid,
    /// Chika-ma: clinch range.
    #[serde(alias = "chika_ma")]
    Close,
}

impl Distance {
    pub fn label(self) -> &'static str {
        match self {
            Distance::Far => "Toh-ma",
            Distance::Mid => "Issoku-itto",
            Distance::Close => "Chika-ma",
        }
    }

    pub fn parse(s: &str) -> Option<Distance> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "far" | "toh_ma" => Some(Distance::Far),
            "mid" | "issoku_itto" => Some(Distance::Mid),
            "close" | "chika_ma" => Some(Distance::Close),
            _ => None,
        }
    }

    /// One level nearer; Close is the floor.
    pub fn closer(self) -> Distance {
        match self {
            Distance::Far => Distance::Mid,
            Distance::Mid | Distance::Close => Distance::Close,
        }
    }

    /// One level farther; Far is the ceiling.
    pub fn farther(self) -> Distance {
        match self {
            Distance::Close => Distance::Mid,
            Distance::Mid | Distance::Far => Distance::Far,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Neither,
}

impl Direction {
    pub fn of(action: &Action) -> Direction {
        match action.movement() {
            Some(Movement::StepForward) => Direction::Forward,
            Some(Movement::StepBackward) => Direction::Backward,
            None => Direction::Neither,
        }
    }
}

/// Distance after both sides act. Only the direction of each action matters,
/// not which side took it.
pub fn resolve_distance(current: Distance, player: &Action, cpu: &Action) -> Distance {
    use Direction::*;
    match (Direction::of(player), Direction::of(cpu)) {
        (Forward, Forward) => Distance::Close,
        (Backward, Backward) => Distance::Far,
        (Forward, Neither) | (Neither, Forward) => current.closer(),
        (Backward, Neither) | (Neither, Backward) => current.farther(),
        // Opposite steps cancel out.
        (Forward, Backward) | (Backward, Forward) => current,
        (Neither, Neither) => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_romanized_labels() {
        assert_eq!(Distance::parse("Toh-ma"), Some(Distance::Far));
        assert_eq!(Distance::parse("issoku-itto"), Some(Distance::Mid));
        assert_eq!(Distance::parse("CLOSE"), Some(Distance::Close));
        assert_eq!(Distance::parse("near"), None);
    }

    #[test]
    fn steps_saturate_at_the_ends() {
        assert_eq!(Distance::Close.closer(), Distance::Close);
        assert_eq!(Distance::Far.farther(), Distance::Far);
        assert_eq!(Distance::Far.closer().closer(), Distance::Close);
    }
}
