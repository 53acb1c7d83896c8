//! Error taxonomy for postspin.
//!
//! Each layer has its own error enum: [`LlmError`] for provider calls, [`SpinError`] for
//! a pipeline run, [`ConfigError`] for configuration loading. [`PostspinError`] wraps them
//! at the CLI boundary. All of them implement [`UserFriendlyError`] so the CLI can print
//! a message, some context and a few suggestions instead of a bare `Display` string.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::redaction::redact_error_message;
use crate::types::StageId;

/// Errors surfaced to the operator through the CLI.
#[derive(Error, Debug)]
pub enum PostspinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Spin failed: {0}")]
    Spin(#[from] SpinError),

    /// The spin request itself is unusable (bad JSON, missing fields, empty content).
    #[error("Invalid request: {0}")]
    Request(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for errors that can explain themselves to an operator.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories used to group errors in CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Provider,
    ResourceLimits,
    Generation,
    Validation,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Provider => write!(f, "LLM Provider"),
            Self::ResourceLimits => write!(f, "Resource Limits"),
            Self::Generation => write!(f, "Generation"),
            Self::Validation => write!(f, "Validation"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration discovery failed: {0}")]
    DiscoveryFailed(String),
}

/// Failures of a single LLM invocation.
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    /// HTTP connectivity or request construction failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Budget exceeded: attempted {attempted} calls, limit is {limit}")]
    BudgetExceeded { limit: u32, attempted: u32 },

    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Why a spin run stopped early.
#[derive(Error, Debug)]
pub enum SpinError {
    /// The model service failed for this stage.
    #[error("{stage} stage failed: {source}")]
    Service {
        stage: StageId,
        #[source]
        source: LlmError,
    },

    /// The stage answered, but the answer does not satisfy the stage's output schema.
    #[error("{stage} stage returned output that does not match its schema: {}", issues.join("; "))]
    SchemaValidation { stage: StageId, issues: Vec<String> },

    /// The angle generator recommended an angle it did not produce.
    #[error("recommended angle index {index} is out of range for {count} generated angle(s)")]
    InvalidSelection { index: i64, count: usize },

    /// The stage did not answer within its time budget.
    #[error("{stage} stage timed out after {duration:?}")]
    StageTimeout { stage: StageId, duration: Duration },
}

/// Coarse classification of [`SpinError`] used for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinErrorKind {
    SchemaValidation,
    Service,
    InvalidSelection,
    Timeout,
}

impl SpinErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaValidation => "schema_validation",
            Self::Service => "service",
            Self::InvalidSelection => "invalid_selection",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for SpinErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SpinError {
    #[must_use]
    pub fn kind(&self) -> SpinErrorKind {
        match self {
            Self::Service { source, .. } => match source {
                LlmError::Timeout { .. } => SpinErrorKind::Timeout,
                _ => SpinErrorKind::Service,
            },
            Self::SchemaValidation { .. } => SpinErrorKind::SchemaValidation,
            Self::InvalidSelection { .. } => SpinErrorKind::InvalidSelection,
            Self::StageTimeout { .. } => SpinErrorKind::Timeout,
        }
    }

    /// The stage that failed. Angle selection is attributed to the angle generator.
    #[must_use]
    pub fn stage(&self) -> StageId {
        match self {
            Self::Service { stage, .. }
            | Self::SchemaValidation { stage, .. }
            | Self::StageTimeout { stage, .. } => *stage,
            Self::InvalidSelection { .. } => StageId::AngleGenerator,
        }
    }
}

impl PostspinError {
    /// Message, context and suggestions formatted for stderr, with credentials redacted.
    ///
    /// ```rust
    /// use postspin_utils::error::PostspinError;
    ///
    /// let err = PostspinError::Request("original_post.content must not be empty".into());
    /// let message = err.display_for_user();
    /// assert!(message.starts_with("Error: The spin request is invalid"));
    /// assert!(message.contains("Suggestions:"));
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        redact_error_message(&output)
    }
}

impl UserFriendlyError for PostspinError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Llm(err) => err.user_message(),
            Self::Spin(err) => err.user_message(),
            Self::Request(msg) => format!("The spin request is invalid: {msg}"),
            Self::Io(err) => format!("I/O error: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Llm(err) => err.context(),
            Self::Spin(err) => err.context(),
            Self::Request(_) => Some(
                "A request needs original_post (content, author_name) and company_profile \
                 (company_name, industry) at minimum."
                    .to_string(),
            ),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Llm(err) => err.suggestions(),
            Self::Spin(err) => err.suggestions(),
            Self::Request(_) => vec![
                "Validate the JSON with a linter before passing it in".to_string(),
                "Use --file to read a request from disk instead of quoting it inline".to_string(),
            ],
            Self::Io(_) => vec!["Check that the path exists and is readable".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Llm(err) => err.category(),
            Self::Spin(err) => err.category(),
            Self::Request(_) => ErrorCategory::Validation,
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(msg) => format!("Configuration file could not be loaded: {msg}"),
            Self::MissingRequired(what) => format!("Required setting is missing: {what}"),
            Self::InvalidValue { key, value } => format!("Setting '{key}' is invalid: {value}"),
            Self::DiscoveryFailed(msg) => format!("Could not locate configuration: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Configuration is read from .postspin/config.toml (searched upward from the \
             working directory), then environment variables, then CLI flags."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of the config file".to_string(),
                "Run 'postspin config' to see which file was picked up".to_string(),
            ],
            Self::MissingRequired(_) => {
                vec!["Add the missing key to .postspin/config.toml".to_string()]
            }
            Self::InvalidValue { .. } => vec![
                "Fix the value in the config file or pass a valid CLI flag".to_string(),
            ],
            Self::DiscoveryFailed(_) => vec![
                "Pass --config <path> explicitly".to_string(),
                "Set POSTSPIN_HOME to the directory containing config.toml".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("LLM transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("LLM provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("LLM provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("LLM provider service outage: {msg}"),
            Self::Timeout { duration } => {
                format!("LLM invocation timed out after {duration:?}")
            }
            Self::BudgetExceeded { limit, attempted } => format!(
                "LLM budget exceeded: attempted {attempted} calls, limit is {limit}"
            ),
            Self::Misconfiguration(msg) => format!("LLM configuration error: {msg}"),
            Self::Unsupported(msg) => format!("LLM feature not supported: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ProviderAuth(_) => Some(
                "Authentication errors indicate a missing or invalid API key.".to_string(),
            ),
            Self::ProviderQuota(_) | Self::BudgetExceeded { .. } => Some(
                "Rate limits and call budgets cap how many model calls a run may make."
                    .to_string(),
            ),
            Self::ProviderOutage(_) => {
                Some("Provider outages are temporary service disruptions.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) => vec![
                "Verify network connectivity to the provider".to_string(),
                "Run with --verbose to see each attempt".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Check that the API key environment variable named in [llm.<provider>] is set"
                    .to_string(),
            ],
            Self::ProviderQuota(_) | Self::ProviderOutage(_) => vec![
                "Wait a few minutes and try again".to_string(),
                "Configure llm.fallback_provider".to_string(),
            ],
            Self::Timeout { .. } => vec![
                "Increase defaults.stage_timeout or pass --stage-timeout".to_string(),
            ],
            Self::BudgetExceeded { .. } => vec![
                "Raise the budget in [llm.<provider>] or via POSTSPIN_LLM_BUDGET".to_string(),
            ],
            Self::Misconfiguration(_) | Self::Unsupported(_) => vec![
                "Check the [llm] section of .postspin/config.toml".to_string(),
                "Supported providers: openai, openrouter, anthropic, replay".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::ProviderOutage(_) | Self::Timeout { .. } => {
                ErrorCategory::Provider
            }
            Self::ProviderQuota(_) | Self::BudgetExceeded { .. } => ErrorCategory::ResourceLimits,
            Self::ProviderAuth(_) | Self::Misconfiguration(_) | Self::Unsupported(_) => {
                ErrorCategory::Configuration
            }
        }
    }
}

impl UserFriendlyError for SpinError {
    fn user_message(&self) -> String {
        match self {
            Self::Service { source, .. } => source.user_message(),
            Self::SchemaValidation { stage, issues } => format!(
                "The {stage} stage produced malformed output ({} issue(s))",
                issues.len()
            ),
            Self::InvalidSelection { index, count } => format!(
                "The angle generator recommended angle #{index} but produced only {count}"
            ),
            Self::StageTimeout { stage, duration } => {
                format!("The {stage} stage did not finish within {duration:?}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::SchemaValidation { issues, .. } => Some(issues.join("\n")),
            Self::Service { source, .. } => source.context(),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Service { source, .. } => source.suggestions(),
            Self::SchemaValidation { .. } | Self::InvalidSelection { .. } => vec![
                "Retry the run; model output varies between calls".to_string(),
                "Try a stronger model for this stage via [stages.<name>] model".to_string(),
            ],
            Self::StageTimeout { .. } => vec![
                "Raise [stages.<name>] timeout or defaults.stage_timeout".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Service { source, .. } => source.category(),
            Self::SchemaValidation { .. } | Self::InvalidSelection { .. } => {
                ErrorCategory::Generation
            }
            Self::StageTimeout { .. } => ErrorCategory::Provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_error_kinds() {
        let schema = SpinError::SchemaValidation {
            stage: StageId::Analyzer,
            issues: vec!["hook_type: unknown variant".into()],
        };
        assert_eq!(schema.kind(), SpinErrorKind::SchemaValidation);
        assert_eq!(schema.stage(), StageId::Analyzer);

        let selection = SpinError::InvalidSelection { index: 7, count: 3 };
        assert_eq!(selection.kind().as_str(), "invalid_selection");
        assert_eq!(selection.stage(), StageId::AngleGenerator);

        let provider_timeout = SpinError::Service {
            stage: StageId::Writer,
            source: LlmError::Timeout {
                duration: Duration::from_secs(3),
            },
        };
        assert_eq!(provider_timeout.kind(), SpinErrorKind::Timeout);
    }

    #[test]
    fn schema_error_display_lists_issues() {
        let err = SpinError::SchemaValidation {
            stage: StageId::Writer,
            issues: vec!["draft_content is empty".into(), "hashtags: 7 > 5".into()],
        };
        assert_eq!(
            err.to_string(),
            "writer stage returned output that does not match its schema: \
             draft_content is empty; hashtags: 7 > 5"
        );
    }

    #[test]
    fn service_error_chains_source() {
        use std::error::Error as _;
        let err = SpinError::Service {
            stage: StageId::Humanizer,
            source: LlmError::ProviderOutage("503".into()),
        };
        assert!(err.source().is_some());
        assert_eq!(err.category(), ErrorCategory::Provider);
    }

    #[test]
    fn postspin_error_delegates_to_inner() {
        let err = PostspinError::from(ConfigError::InvalidValue {
            key: "spin.max_humanization_iterations".into(),
            value: "0 (must be 1..=10)".into(),
        });
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.user_message().contains("spin.max_humanization_iterations"));
        assert!(!err.suggestions().is_empty());
    }
}
