use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::distance::Distance;
use crate::Stance;

pub const DEFAULT_ARBITER_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_ARBITER_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Where to reach the arbiter. The API key is read from `ARBITER_API_KEY` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ArbiterSettings {
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ArbiterSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ARBITER_URL.to_string(),
            model: DEFAULT_ARBITER_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ArbiterSettings {
    /// Defaults overridden by `ARBITER_API_URL` / `ARBITER_MODEL` when set.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("ARBITER_API_URL") {
            self.api_url = url;
        }
        if let Ok(model) = std::env::var("ARBITER_MODEL") {
            self.model = model;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct MatchConfig {
    pub player_stance: Stance,
    pub cpu_stance: Stance,
    pub starting_distance: Distance,
    pub seed: Option<u64>,
    /// Optional technique catalog replacing the built-in one.
    pub techniques_path: Option<String>,
    pub arbiter: ArbiterSettings,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            player_stance: Stance::Defensive,
            cpu_stance: Stance::Aggressive,
            starting_distance: Distance::Mid,
            seed: None,
            techniques_path: None,
            arbiter: ArbiterSettings::default(),
        }
    }
}

impl MatchConfig {
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.techniques_path {
            Some(path) => load_catalog(path),
            None => Ok(Catalog::builtin()?),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase) {
            Some(ext) if ext == "yaml" || ext == "yml" => Ok(ConfigFormat::Yaml),
            Some(ext) if ext == "json" => Ok(ConfigFormat::Json),
            _ => bail!("unsupported config extension: {}", path.display()),
        }
    }
}

pub fn parse_config(text: &str, format: ConfigFormat) -> Result<MatchConfig> {
    let cfg = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(text).context("invalid YAML match config")?,
        ConfigFormat::Json => serde_json::from_str(text).context("invalid JSON match config")?,
    };
    Ok(cfg)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<MatchConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read match config: {}", path.display()))?;
    parse_config(&text, format)
        .with_context(|| format!("failed to parse match config: {}", path.display()))
}

pub fn load_catalog(path: &str) -> Result<Catalog> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read techniques JSON: {}", path))?;
    let catalog = Catalog::from_json(&text)
        .with_context(|| format!("failed to load techniques JSON: {}", path))?;
    Ok(catalog)
}
