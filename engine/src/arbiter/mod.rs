//! Boundary to the external judge that decides who had the advantage in an
//! interactive turn. The engine never judges techniques itself.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::ActionProfile;
use crate::config::ArbiterSettings;
use crate::distance::Distance;
use crate::error::ArbiterError;
use crate::{Stance, Winner};

mod llm;

pub use llm::{extract_json, ApiFormat, LlmArbiter};

/// Everything the arbiter is told about a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbiterRequest {
    pub player_stance: Stance,
    pub cpu_stance: Stance,
    pub distance: Distance,
    pub player_action: ActionProfile,
    pub cpu_action: ActionProfile,
}

/// Raw judgment, before the Ippon roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub theoretical_winner: Winner,
    #[serde(alias = "reasonChinese")]
    pub reason_narrative: String,
}

pub trait Arbiter {
    fn judge(
        &self,
        request: &ArbiterRequest,
    ) -> impl Future<Output = Result<Verdict, ArbiterError>> + Send;
}

/// Stand-in used when no service is configured; every judgment is deferred.
#[derive(Debug, Clone)]
pub struct UnavailableArbiter {
    reason: String,
}

impl UnavailableArbiter {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Arbiter for UnavailableArbiter {
    async fn judge(&self, _request: &ArbiterRequest) -> Result<Verdict, ArbiterError> {
        Err(ArbiterError::Config(self.reason.clone()))
    }
}

/// Arbiter picked at runtime from the environment.
pub enum AnyArbiter {
    Llm(LlmArbiter),
    Unavailable(UnavailableArbiter),
}

impl AnyArbiter {
    /// Uses the HTTP arbiter when `ARBITER_API_KEY` is set, otherwise one that
    /// always defers.
    pub fn from_env(settings: &ArbiterSettings) -> Self {
        match LlmArbiter::from_env(settings) {
            Ok(llm) => AnyArbiter::Llm(llm),
            Err(e) => {
                warn!(error = %e, "arbiter unavailable; interactive turns will be voided");
                AnyArbiter::Unavailable(UnavailableArbiter::new(e.to_string()))
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, AnyArbiter::Llm(_))
    }
}

impl Arbiter for AnyArbiter {
    async fn judge(&self, request: &ArbiterRequest) -> Result<Verdict, ArbiterError> {
        match self {
            AnyArbiter::Llm(a) => a.judge(request).await,
            AnyArbiter::Unavailable(a) => a.judge(request).await,
        }
    }
}
