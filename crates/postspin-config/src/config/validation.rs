use postspin_utils::error::ConfigError;
use postspin_utils::types::StageId;

use super::Config;

/// Provider names accepted by `llm.provider` and `llm.fallback_provider`.
pub const KNOWN_PROVIDERS: [&str; 4] = ["openai", "openrouter", "anthropic", "replay"];

fn invalid(key: impl Into<String>, value: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.into(),
        value: value.into(),
    }
}

fn check_timeout(key: &str, secs: u64) -> Result<(), ConfigError> {
    if !(5..=1800).contains(&secs) {
        return Err(invalid(key, format!("{secs} (must be between 5 and 1800 seconds)")));
    }
    Ok(())
}

fn check_temperature(key: &str, temperature: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&temperature) {
        return Err(invalid(key, format!("{temperature} (must be between 0.0 and 2.0)")));
    }
    Ok(())
}

impl Config {
    /// Validate configuration values.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.defaults.stage_timeout {
            check_timeout("defaults.stage_timeout", timeout)?;
        }

        if let Some(concurrency) = self.defaults.batch_concurrency
            && !(1..=32).contains(&concurrency)
        {
            return Err(invalid(
                "defaults.batch_concurrency",
                format!("{concurrency} (must be between 1 and 32)"),
            ));
        }

        if let Some(iterations) = self.spin.max_humanization_iterations
            && !(1..=10).contains(&iterations)
        {
            return Err(invalid(
                "spin.max_humanization_iterations",
                format!("{iterations} (must be between 1 and 10)"),
            ));
        }

        for (key, score) in [
            ("spin.min_authenticity_score", self.spin.min_authenticity_score),
            ("spin.min_originality_score", self.spin.min_originality_score),
        ] {
            if let Some(score) = score
                && !(0.0..=100.0).contains(&score)
            {
                return Err(invalid(key, format!("{score} (must be between 0 and 100)")));
            }
        }

        for stage in StageId::ALL {
            if let Some(stage_config) = self.stages.get(stage) {
                if let Some(timeout) = stage_config.timeout {
                    check_timeout(&format!("stages.{stage}.timeout"), timeout)?;
                }
                if let Some(temperature) = stage_config.temperature {
                    check_temperature(&format!("stages.{stage}.temperature"), temperature)?;
                }
            }
        }

        self.validate_llm()
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let provider = self.provider();
        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(invalid(
                "llm.provider",
                format!("'{provider}' (expected one of: {})", KNOWN_PROVIDERS.join(", ")),
            ));
        }

        if let Some(fallback) = self.llm.fallback_provider.as_deref() {
            if !KNOWN_PROVIDERS.contains(&fallback) {
                return Err(invalid(
                    "llm.fallback_provider",
                    format!("'{fallback}' (expected one of: {})", KNOWN_PROVIDERS.join(", ")),
                ));
            }
            if fallback == provider {
                return Err(invalid(
                    "llm.fallback_provider",
                    format!("'{fallback}' is the same as llm.provider"),
                ));
            }
        }

        for name in ["openai", "openrouter", "anthropic"] {
            let Some(section) = self.llm.http_provider(name) else {
                continue;
            };
            if let Some(temperature) = section.temperature {
                check_temperature(&format!("llm.{name}.temperature"), temperature)?;
            }
            if section.max_tokens == Some(0) {
                return Err(invalid(format!("llm.{name}.max_tokens"), "0 (must be positive)"));
            }
            if section.budget == Some(0) {
                return Err(invalid(format!("llm.{name}.budget"), "0 (must be positive)"));
            }
            if let Some(env) = section.api_key_env.as_deref()
                && env.trim().is_empty()
            {
                return Err(invalid(format!("llm.{name}.api_key_env"), "must not be empty"));
            }
        }

        let uses_replay = provider == "replay" || self.llm.fallback_provider.as_deref() == Some("replay");
        if uses_replay
            && self.llm.replay.as_ref().and_then(|r| r.path.as_ref()).is_none()
        {
            return Err(ConfigError::MissingRequired(
                "llm.replay.path (required when the replay provider is selected)".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReplayConfig, StageConfig};

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn iteration_cap_must_be_positive() {
        let mut config = Config::default();
        config.spin.max_humanization_iterations = Some(0);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "spin.max_humanization_iterations"
        ));
    }

    #[test]
    fn stage_timeout_bounds() {
        let mut config = Config::default();
        config.stages.humanizer = Some(StageConfig {
            timeout: Some(2),
            ..StageConfig::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stages.humanizer.timeout"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = Config::default();
        config.llm.provider = Some("claude-cli".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn fallback_must_differ_from_primary() {
        let mut config = Config::default();
        config.llm.provider = Some("openrouter".into());
        config.llm.fallback_provider = Some("openrouter".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn replay_requires_a_path() {
        let mut config = Config::default();
        config.llm.provider = Some("replay".into());
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::MissingRequired(_)
        ));

        config.llm.replay = Some(ReplayConfig {
            path: Some("fixtures/replay.json".into()),
        });
        config.validate().unwrap();
    }

    #[test]
    fn scores_are_bounded() {
        let mut config = Config::default();
        config.spin.min_originality_score = Some(120.0);
        assert!(config.validate().is_err());
    }
}
