use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use postspin_schema::Tone;
use postspin_utils::types::{ConfigSource, StageId};

pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_HUMANIZATION_ITERATIONS: u32 = 3;
pub const DEFAULT_MIN_AUTHENTICITY_SCORE: f64 = 85.0;
pub const DEFAULT_MIN_ORIGINALITY_SCORE: f64 = 70.0;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;
pub const DEFAULT_PROVIDER: &str = "openai";

/// Which draft becomes the final post once the humanization loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdoptionPolicy {
    /// The most recent revision, even if an earlier draft scored higher.
    #[default]
    Latest,
    /// The highest authenticity seen; originality then recency break ties.
    Best,
}

impl fmt::Display for AdoptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Best => write!(f, "best"),
        }
    }
}

impl FromStr for AdoptionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(Self::Latest),
            "best" => Ok(Self::Best),
            other => Err(format!("unknown adoption policy '{other}' (expected latest or best)")),
        }
    }
}

/// Limits that drive the humanization loop and the originality gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinThresholds {
    /// Cap on writer + humanizer calls.
    pub max_humanization_iterations: u32,
    pub min_authenticity_score: f64,
    pub min_originality_score: f64,
    pub adoption: AdoptionPolicy,
}

impl Default for SpinThresholds {
    fn default() -> Self {
        Self {
            max_humanization_iterations: DEFAULT_MAX_HUMANIZATION_ITERATIONS,
            min_authenticity_score: DEFAULT_MIN_AUTHENTICITY_SCORE,
            min_originality_score: DEFAULT_MIN_ORIGINALITY_SCORE,
            adoption: AdoptionPolicy::Latest,
        }
    }
}

/// `[defaults]`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    pub model: Option<String>,
    /// Seconds allowed per stage call.
    pub stage_timeout: Option<u64>,
    pub verbose: Option<bool>,
    pub log_json: Option<bool>,
    pub batch_concurrency: Option<usize>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            model: None,
            stage_timeout: Some(DEFAULT_STAGE_TIMEOUT_SECS),
            verbose: Some(false),
            log_json: Some(false),
            batch_concurrency: Some(DEFAULT_BATCH_CONCURRENCY),
        }
    }
}

/// `[spin]`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpinConfig {
    pub max_humanization_iterations: Option<u32>,
    pub min_authenticity_score: Option<f64>,
    pub min_originality_score: Option<f64>,
    pub adoption: Option<AdoptionPolicy>,
    pub default_tone: Option<Tone>,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            max_humanization_iterations: Some(DEFAULT_MAX_HUMANIZATION_ITERATIONS),
            min_authenticity_score: Some(DEFAULT_MIN_AUTHENTICITY_SCORE),
            min_originality_score: Some(DEFAULT_MIN_ORIGINALITY_SCORE),
            adoption: Some(AdoptionPolicy::Latest),
            default_tone: Some(Tone::Professional),
        }
    }
}

/// Settings shared by the HTTP providers (`[llm.openai]`, `[llm.openrouter]`, `[llm.anthropic]`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HttpProviderConfig {
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Maximum number of calls per process.
    pub budget: Option<u32>,
    /// Ask OpenAI-compatible endpoints for a JSON object response.
    pub json_mode: Option<bool>,
}

/// `[llm.replay]`: canned responses keyed by stage, for offline runs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReplayConfig {
    pub path: Option<PathBuf>,
}

/// `[llm]`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    pub provider: Option<String>,
    pub fallback_provider: Option<String>,
    pub openai: Option<HttpProviderConfig>,
    pub openrouter: Option<HttpProviderConfig>,
    pub anthropic: Option<HttpProviderConfig>,
    pub replay: Option<ReplayConfig>,
}

impl LlmConfig {
    /// Provider-specific section for an HTTP provider name.
    #[must_use]
    pub fn http_provider(&self, name: &str) -> Option<&HttpProviderConfig> {
        match name {
            "openai" => self.openai.as_ref(),
            "openrouter" => self.openrouter.as_ref(),
            "anthropic" => self.anthropic.as_ref(),
            _ => None,
        }
    }
}

/// `[stages.<name>]`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StageConfig {
    pub model: Option<String>,
    pub timeout: Option<u64>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StagesConfig {
    pub analyzer: Option<StageConfig>,
    pub angle_generator: Option<StageConfig>,
    pub writer: Option<StageConfig>,
    pub humanizer: Option<StageConfig>,
}

impl StagesConfig {
    #[must_use]
    pub fn get(&self, stage: StageId) -> Option<&StageConfig> {
        match stage {
            StageId::Analyzer => self.analyzer.as_ref(),
            StageId::AngleGenerator => self.angle_generator.as_ref(),
            StageId::Writer => self.writer.as_ref(),
            StageId::Humanizer => self.humanizer.as_ref(),
        }
    }
}

/// Effective configuration after discovery.
///
/// Build one with [`Config::discover`] for CLI behaviour, or start from
/// [`Config::default`] when embedding and set fields directly.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub defaults: Defaults,
    pub spin: SpinConfig,
    pub llm: LlmConfig,
    pub stages: StagesConfig,
    /// Where each top-level setting came from.
    pub source_attribution: HashMap<String, ConfigSource>,
    /// The config file that was loaded, if any.
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Model for a stage: `[stages.<name>] model` > `defaults.model`.
    ///
    /// `None` lets the backend fall back to its provider default.
    #[must_use]
    pub fn model_for_stage(&self, stage: StageId) -> Option<String> {
        self.stages
            .get(stage)
            .and_then(|s| s.model.clone())
            .or_else(|| self.defaults.model.clone())
    }

    #[must_use]
    pub fn timeout_for_stage(&self, stage: StageId) -> Duration {
        let secs = self
            .stages
            .get(stage)
            .and_then(|s| s.timeout)
            .or(self.defaults.stage_timeout)
            .unwrap_or(DEFAULT_STAGE_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn temperature_for_stage(&self, stage: StageId) -> Option<f32> {
        self.stages.get(stage).and_then(|s| s.temperature)
    }

    #[must_use]
    pub fn thresholds(&self) -> SpinThresholds {
        let fallback = SpinThresholds::default();
        SpinThresholds {
            max_humanization_iterations: self
                .spin
                .max_humanization_iterations
                .unwrap_or(fallback.max_humanization_iterations),
            min_authenticity_score: self
                .spin
                .min_authenticity_score
                .unwrap_or(fallback.min_authenticity_score),
            min_originality_score: self
                .spin
                .min_originality_score
                .unwrap_or(fallback.min_originality_score),
            adoption: self.spin.adoption.unwrap_or(fallback.adoption),
        }
    }

    #[must_use]
    pub fn default_tone(&self) -> Tone {
        self.spin.default_tone.unwrap_or_default()
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        self.llm.provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    #[must_use]
    pub fn batch_concurrency(&self) -> usize {
        self.defaults
            .batch_concurrency
            .unwrap_or(DEFAULT_BATCH_CONCURRENCY)
    }

    /// Effective values with their sources, sorted by key.
    #[must_use]
    pub fn effective_settings(&self) -> Vec<(String, String, ConfigSource)> {
        let thresholds = self.thresholds();
        let values = [
            ("model", self.defaults.model.clone().unwrap_or_else(|| "(provider default)".into())),
            ("stage_timeout", format!("{}s", self.defaults.stage_timeout.unwrap_or(DEFAULT_STAGE_TIMEOUT_SECS))),
            ("verbose", self.defaults.verbose.unwrap_or(false).to_string()),
            ("log_json", self.defaults.log_json.unwrap_or(false).to_string()),
            ("batch_concurrency", self.batch_concurrency().to_string()),
            ("max_humanization_iterations", thresholds.max_humanization_iterations.to_string()),
            ("min_authenticity_score", thresholds.min_authenticity_score.to_string()),
            ("min_originality_score", thresholds.min_originality_score.to_string()),
            ("adoption", thresholds.adoption.to_string()),
            ("default_tone", self.default_tone().to_string()),
            ("llm_provider", self.provider().to_string()),
            ("fallback_provider", self.llm.fallback_provider.clone().unwrap_or_else(|| "(none)".into())),
        ];
        let mut settings: Vec<_> = values
            .into_iter()
            .map(|(key, value)| {
                let source = self
                    .source_attribution
                    .get(key)
                    .cloned()
                    .unwrap_or(ConfigSource::Default);
                (key.to_string(), value, source)
            })
            .collect();
        settings.sort_by(|a, b| a.0.cmp(&b.0));
        settings
    }
}
