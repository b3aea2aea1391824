//! HTTP arbiter backed by a chat-completion API.
//!
//! Supports the Anthropic messages API and OpenAI-compatible endpoints
//! (OpenAI, DeepSeek, local gateways). The model only sees the two actions
//! and their context; scoring stays with the referee.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Arbiter, ArbiterRequest, Verdict};
use crate::config::ArbiterSettings;
use crate::error::ArbiterError;

const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    pub fn detect(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }
}

pub struct LlmArbiter {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmArbiter {
    pub fn new(api_key: String, settings: &ArbiterSettings) -> Result<Self, ArbiterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_key,
            api_url: settings.api_url.clone(),
            model: settings.model.clone(),
            api_format: ApiFormat::detect(&settings.api_url),
        })
    }

    /// Required: `ARBITER_API_KEY`.
    pub fn from_env(settings: &ArbiterSettings) -> Result<Self, ArbiterError> {
        let api_key = std::env::var("ARBITER_API_KEY")
            .map_err(|_| ArbiterError::Config("ARBITER_API_KEY not set".into()))?;
        Self::new(api_key, settings)
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, ArbiterError> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String, ArbiterError> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArbiterError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: AnthropicResponse = response.json().await?;
        completion
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or(ArbiterError::EmptyResponse)
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String, ArbiterError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArbiterError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: OpenAIResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(ArbiterError::EmptyResponse)
    }
}

impl Arbiter for LlmArbiter {
    async fn judge(&self, request: &ArbiterRequest) -> Result<Verdict, ArbiterError> {
        let user = judge_prompt(request);
        let text = self.complete(SHINPAN_SYSTEM_PROMPT, &user).await?;
        debug!(response = %text, "arbiter replied");
        parse_verdict(&text)
    }
}

pub(crate) fn parse_verdict(text: &str) -> Result<Verdict, ArbiterError> {
    let json = extract_json(text)?;
    serde_json::from_str(json)
        .map_err(|e| ArbiterError::Parse(format!("{} - response: {}", e, text)))
}

/// Outermost `{...}` in a model reply that may carry prose or code fences.
pub fn extract_json(response: &str) -> Result<&str, ArbiterError> {
    let start = response
        .find('{')
        .ok_or_else(|| ArbiterError::Parse("no JSON object in response".into()))?;
    let end = response
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| ArbiterError::Parse("no closing brace in response".into()))?;
    Ok(&response[start..=end])
}

fn judge_prompt(req: &ArbiterRequest) -> String {
    format!(
        "Current state:\n\
         - Distance: {}\n\
         - Player stance: {}\n\
         - CPU stance: {}\n\
         \n\
         Actions:\n\
         - Player action: {} ({}) - {}\n\
         - CPU action: {} ({}) - {}\n\
         \n\
         Judge this exchange and answer with the JSON object only.",
        req.distance.label(),
        req.player_stance.label(),
        req.cpu_stance.label(),
        req.player_action.name,
        req.player_action.japanese,
        req.player_action.description,
        req.cpu_action.name,
        req.cpu_action.japanese,
        req.cpu_action.description,
    )
}

const SHINPAN_SYSTEM_PROMPT: &str = r#"You are a master kendo referee (shinpan) judging one exchange of a match between a Player and a CPU.

RULES OF JUDGMENT:
1. Distance matters heavily.
   - Hiki waza only works at Chika-ma (close). Used at Issoku-itto or Toh-ma it fails.
   - Most strikes need Issoku-itto (striking distance).
   - From Toh-ma (far) only movement or special long-range attempts can work.
2. Technique interactions.
   - Oji waza (counters) generally beat shikake waza (attacks) when executed against the right target.
   - Debana waza beats the start of a standard strike.
   - Simultaneous attacks (ai-uchi) are a clash with no winner unless one side has clearly superior timing.
   - If both sides only move, nobody scores.
3. Stance.
   - Jodan is aggressive and strong against basic blocks but exposed to kote and tsuki.

Decide who held the THEORETICAL advantage: PLAYER, CPU or NONE.
Explain in one or two dramatic sentences, as a referee's commentary.

OUTPUT FORMAT (JSON only, no explanation):
{
  "theoreticalWinner": "PLAYER" | "CPU" | "NONE",
  "reasonNarrative": "short commentary"
}
"#;

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
