use thiserror::Error;

use crate::catalog::TechniqueRole;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid technique catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("technique id '{0}' appears more than once")]
    DuplicateId(String),

    #[error("technique role {0:?} is assigned to more than one technique")]
    DuplicateRole(TechniqueRole),

    #[error("technique id '{0}' is reserved for movement")]
    ReservedId(String),
}

/// Why the arbiter could not produce a verdict. Always recovered by the referee.
#[derive(Error, Debug)]
pub enum ArbiterError {
    #[error("arbiter not configured: {0}")]
    Config(String),

    #[error("arbiter transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("arbiter returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("arbiter response unreadable: {0}")]
    Parse(String),

    #[error("arbiter returned an empty response")]
    EmptyResponse,
}

/// A turn request that was declined without touching the match state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnRejection {
    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("a turn is already being resolved")]
    Busy,

    #[error("the match is over")]
    MatchOver,
}
