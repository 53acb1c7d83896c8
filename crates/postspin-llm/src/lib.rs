//! LLM backend abstraction for postspin.
//!
//! Every provider implements [`LlmBackend`]. [`from_config_with_fallback`] picks the
//! provider named in configuration, wraps it in a call budget when one is set, and
//! falls back to `llm.fallback_provider` if the primary cannot be constructed.

mod anthropic_backend;
mod budgeted_backend;
mod http_client;
mod openai_backend;
mod replay_backend;
mod settings;
mod types;

pub use budgeted_backend::{BUDGET_ENV_VAR, BudgetedBackend};
pub use replay_backend::{RecordedCall, ReplayBackend};
pub use types::{LlmBackend, LlmFallbackInfo, LlmInvocation, LlmResult, Message, Role};
pub use postspin_utils::error::LlmError;

use anthropic_backend::AnthropicBackend;
use budgeted_backend::resolve_budget_limit;
use openai_backend::{Flavor, OpenAiCompatibleBackend};
use postspin_config::Config;
use postspin_utils::redaction::redact_error_message;
use tracing::{error, info, warn};

fn with_budget(backend: Box<dyn LlmBackend>, config_budget: Option<u32>) -> Box<dyn LlmBackend> {
    match resolve_budget_limit(config_budget) {
        Some(limit) => Box::new(BudgetedBackend::new(backend, limit)),
        None => backend,
    }
}

/// `[llm.<provider>] budget`, the only place a provider's call budget is configured.
fn configured_budget(config: &Config, provider: &str) -> Option<u32> {
    config.llm.http_provider(provider).and_then(|s| s.budget)
}

/// Construct a backend for one provider, without fallback.
fn construct_backend_for_provider(
    provider: &str,
    config: &Config,
) -> Result<Box<dyn LlmBackend>, LlmError> {
    let budget = configured_budget(config, provider);
    match provider {
        "openai" => {
            let backend = OpenAiCompatibleBackend::new_from_config(Flavor::OpenAi, config)?;
            Ok(with_budget(Box::new(backend), budget))
        }
        "openrouter" => {
            let backend = OpenAiCompatibleBackend::new_from_config(Flavor::OpenRouter, config)?;
            Ok(with_budget(Box::new(backend), budget))
        }
        "anthropic" => {
            let backend = AnthropicBackend::new_from_config(config)?;
            Ok(with_budget(Box::new(backend), budget))
        }
        "replay" => {
            let path = config
                .llm
                .replay
                .as_ref()
                .and_then(|r| r.path.as_deref())
                .ok_or_else(|| {
                    LlmError::Misconfiguration("llm.replay.path is not set".to_string())
                })?;
            Ok(Box::new(ReplayBackend::from_file(path)?))
        }
        unknown => Err(LlmError::Unsupported(format!(
            "Unknown LLM provider '{unknown}'. Supported providers: openai, openrouter, anthropic, replay."
        ))),
    }
}

/// Create a backend from configuration, returning fallback metadata when used.
///
/// # Errors
///
/// Returns the primary provider's error when it cannot be constructed and either no
/// fallback is configured or the fallback fails as well.
pub fn from_config_with_fallback(
    config: &Config,
) -> Result<(Box<dyn LlmBackend>, Option<LlmFallbackInfo>), LlmError> {
    let provider = config.provider();

    let primary_error = match construct_backend_for_provider(provider, config) {
        Ok(backend) => {
            info!(provider, "LLM backend ready");
            return Ok((backend, None));
        }
        Err(e) => e,
    };

    let Some(fallback_provider) = config.llm.fallback_provider.as_deref() else {
        return Err(primary_error);
    };

    let reason = redact_error_message(&primary_error.to_string());
    warn!(
        provider,
        fallback_provider,
        reason = %reason,
        "Primary provider failed during construction, trying fallback"
    );

    match construct_backend_for_provider(fallback_provider, config) {
        Ok(backend) => Ok((
            backend,
            Some(LlmFallbackInfo {
                primary_provider: provider.to_string(),
                fallback_provider: fallback_provider.to_string(),
                reason,
            }),
        )),
        Err(fallback_error) => {
            error!(
                fallback_provider,
                error = %redact_error_message(&fallback_error.to_string()),
                "Fallback provider also failed"
            );
            Err(primary_error)
        }
    }
}

/// Create a backend from configuration, discarding fallback metadata.
///
/// # Errors
///
/// See [`from_config_with_fallback`].
pub fn from_config(config: &Config) -> Result<Box<dyn LlmBackend>, LlmError> {
    from_config_with_fallback(config).map(|(backend, _)| backend)
}
