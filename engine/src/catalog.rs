use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

const BUILTIN_TECHNIQUES: &str = include_str!("../content/techniques.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Shikake waza: the attacker takes the initiative.
    Initiating,
    /// Oji waza: answers the opponent's attack.
    Counter,
}

/// Tactical role a technique plays in the CPU's weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueRole {
    PlainStrike,
    Interception,
    Feint,
    RetreatingStrike,
    EvasiveCounter,
    ParryRiposte,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technique {
    pub id: String,
    pub name: String,
    pub japanese: String,
    pub category: Category,
    #[serde(default)]
    pub role: Option<TechniqueRole>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    StepForward,
    StepBackward,
}

impl Movement {
    pub const ALL: [Movement; 2] = [Movement::StepForward, Movement::StepBackward];

    pub fn id(self) -> &'static str {
        match self {
            Movement::StepForward => "move_forward",
            Movement::StepBackward => "move_backward",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Movement::StepForward => "Step In",
            Movement::StepBackward => "Step Back",
        }
    }

    pub fn from_id(id: &str) -> Option<Movement> {
        Movement::ALL.into_iter().find(|m| m.id() == id)
    }
}

/// What one side does in a turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Technique(String),
    Move(Movement),
}

impl Action {
    pub fn id(&self) -> &str {
        match self {
            Action::Technique(id) => id,
            Action::Move(m) => m.id(),
        }
    }

    pub fn movement(&self) -> Option<Movement> {
        match self {
            Action::Move(m) => Some(*m),
            Action::Technique(_) => None,
        }
    }

    pub fn is_movement(&self) -> bool {
        matches!(self, Action::Move(_))
    }
}

/// Human-readable view of an action, as sent to the arbiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionProfile {
    pub id: String,
    pub name: String,
    pub japanese: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    techniques: Vec<Technique>,
}

impl Catalog {
    /// The eleven techniques bundled with the engine.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_TECHNIQUES)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let techniques: Vec<Technique> = serde_json::from_str(text)?;
        Self::from_techniques(techniques)
    }

    pub fn from_techniques(techniques: Vec<Technique>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        let mut roles = HashSet::new();
        for t in &techniques {
            if Movement::from_id(&t.id).is_some() {
                return Err(CatalogError::ReservedId(t.id.clone()));
            }
            if !ids.insert(t.id.as_str()) {
                return Err(CatalogError::DuplicateId(t.id.clone()));
            }
            if let Some(role) = t.role {
                if !roles.insert(role) {
                    return Err(CatalogError::DuplicateRole(role));
                }
            }
        }
        Ok(Self { techniques })
    }

    pub fn techniques(&self) -> &[Technique] {
        &self.techniques
    }

    pub fn technique(&self, id: &str) -> Option<&Technique> {
        self.techniques.iter().find(|t| t.id == id)
    }

    pub fn by_role(&self, role: TechniqueRole) -> Option<&Technique> {
        self.techniques.iter().find(|t| t.role == Some(role))
    }

    pub fn ids_in(&self, category: Category) -> impl Iterator<Item = &str> + '_ {
        self.techniques
            .iter()
            .filter(move |t| t.category == category)
            .map(|t| t.id.as_str())
    }

    /// Every selectable id: techniques in catalog order, then the two movements.
    pub fn action_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.techniques
            .iter()
            .map(|t| t.id.as_str())
            .chain(Movement::ALL.into_iter().map(|m| -> &str { m.id() }))
    }

    pub fn category_of(&self, id: &str) -> Option<Category> {
        self.technique(id).map(|t| t.category)
    }

    /// Maps a wire id to an action; `None` for ids the catalog does not know.
    pub fn parse_action(&self, id: &str) -> Option<Action> {
        if let Some(m) = Movement::from_id(id) {
            return Some(Action::Move(m));
        }
        self.technique(id).map(|t| Action::Technique(t.id.clone()))
    }

    pub fn profile(&self, action: &Action) -> ActionProfile {
        match action {
            Action::Move(m) => ActionProfile {
                id: m.id().to_string(),
                name: m.name().to_string(),
                japanese: m.name().to_string(),
                description: "Movement".to_string(),
            },
            Action::Technique(id) => match self.technique(id) {
                Some(t) => ActionProfile {
                    id: t.id.clone(),
                    name: t.name.clone(),
                    japanese: t.japanese.clone(),
                    description: t.description.clone(),
                },
                None => ActionProfile {
                    id: id.clone(),
                    name: id.clone(),
                    japanese: id.clone(),
                    description: String::new(),
                },
            },
        }
    }
}
