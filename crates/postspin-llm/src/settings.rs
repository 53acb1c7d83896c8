//! Reading an HTTP provider's section out of the configuration.

use postspin_config::Config;
use postspin_utils::error::LlmError;

use crate::types::HttpParams;

/// What an HTTP backend needs from `[llm.<provider>]` and `[defaults]`.
#[derive(Debug, Clone)]
pub(crate) struct HttpProviderSettings {
    pub api_key: String,
    pub base_url: Option<String>,
    pub default_model: String,
    pub params: HttpParams,
    pub json_mode: bool,
}

impl HttpProviderSettings {
    /// Resolve settings for `provider`.
    ///
    /// The API key is read from the env var named by `api_key_env` (or
    /// `default_key_env`). The default model is `[llm.<provider>] model`, then
    /// `defaults.model`, then `fallback_model`.
    pub fn from_config(
        config: &Config,
        provider: &str,
        default_key_env: &str,
        fallback_model: Option<&str>,
    ) -> Result<Self, LlmError> {
        let section = config.llm.http_provider(provider);

        let key_env = section
            .and_then(|s| s.api_key_env.as_deref())
            .unwrap_or(default_key_env);
        let api_key = std::env::var(key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                LlmError::Misconfiguration(format!(
                    "{provider} API key not found in environment variable '{key_env}'. \
                     Set it or configure a different api_key_env in [llm.{provider}]."
                ))
            })?;

        let default_model = section
            .and_then(|s| s.model.clone())
            .or_else(|| config.defaults.model.clone())
            .or_else(|| fallback_model.map(str::to_string))
            .ok_or_else(|| {
                LlmError::Misconfiguration(format!(
                    "no model configured for {provider}. \
                     Set [llm.{provider}] model or defaults.model."
                ))
            })?;

        let fallback = HttpParams::default();
        Ok(Self {
            api_key,
            base_url: section.and_then(|s| s.base_url.clone()),
            default_model,
            params: HttpParams {
                max_tokens: section
                    .and_then(|s| s.max_tokens)
                    .unwrap_or(fallback.max_tokens),
                temperature: section
                    .and_then(|s| s.temperature)
                    .unwrap_or(fallback.temperature),
            },
            json_mode: section.and_then(|s| s.json_mode).unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postspin_config::HttpProviderConfig;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_key_is_misconfiguration() {
        let config = Config::default();
        let err = HttpProviderSettings::from_config(
            &config,
            "anthropic",
            "POSTSPIN_TEST_UNSET_KEY",
            Some("m"),
        )
        .unwrap_err();
        assert!(matches!(err, LlmError::Misconfiguration(ref m) if m.contains("POSTSPIN_TEST_UNSET_KEY")));
    }

    #[test]
    #[serial]
    fn section_values_win_over_defaults() {
        // SAFETY: serialized test
        unsafe { std::env::set_var("POSTSPIN_TEST_SETTINGS_KEY", "k") };
        let mut config = Config::default();
        config.defaults.model = Some("global".into());
        config.llm.openrouter = Some(HttpProviderConfig {
            api_key_env: Some("POSTSPIN_TEST_SETTINGS_KEY".into()),
            model: Some("section".into()),
            max_tokens: Some(900),
            json_mode: Some(true),
            ..HttpProviderConfig::default()
        });

        let settings =
            HttpProviderSettings::from_config(&config, "openrouter", "UNUSED", None).unwrap();
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.default_model, "section");
        assert_eq!(settings.params.max_tokens, 900);
        assert!(settings.json_mode);
        // SAFETY: serialized test
        unsafe { std::env::remove_var("POSTSPIN_TEST_SETTINGS_KEY") };
    }
}
