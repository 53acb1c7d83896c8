use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use postspin_utils::error::ConfigError;
use postspin_utils::types::ConfigSource;

use super::{CliArgs, Config, Defaults, LlmConfig, SpinConfig, StagesConfig};

/// Directory searched for in the working directory and its ancestors.
const CONFIG_DIR: &str = ".postspin";
const CONFIG_FILE: &str = "config.toml";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<Defaults>,
    spin: Option<SpinConfig>,
    llm: Option<LlmConfig>,
    stages: Option<StagesConfig>,
}

/// Copy `file.$field` over `target.$field` when present and record the file as its source.
macro_rules! overlay {
    ($target:expr, $file:expr, $attr:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if $file.$field.is_some() {
                $target.$field = $file.$field;
                $attr.insert(stringify!($field).to_string(), $source.clone());
            }
        )+
    };
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover configuration starting from a specific directory.
    ///
    /// The path-driven variant used by tests; file lookup never touches the process cwd.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut source_attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut spin = SpinConfig::default();
        let mut llm = LlmConfig::default();
        let mut stages = StagesConfig::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            let source = ConfigSource::ConfigFile(path.clone());
            let attr = &mut source_attribution;

            if let Some(file_defaults) = file_config.defaults {
                overlay!(
                    defaults, file_defaults, attr, source,
                    model, stage_timeout, verbose, log_json, batch_concurrency,
                );
            }
            if let Some(file_spin) = file_config.spin {
                overlay!(
                    spin, file_spin, attr, source,
                    max_humanization_iterations, min_authenticity_score,
                    min_originality_score, adoption, default_tone,
                );
            }
            if let Some(mut file_llm) = file_config.llm {
                if file_llm.provider.is_some() {
                    attr.insert("llm_provider".to_string(), source.clone());
                }
                if file_llm.fallback_provider.is_some() {
                    attr.insert("fallback_provider".to_string(), source.clone());
                }
                if let Some(replay_path) = file_llm.replay.as_mut().and_then(|r| r.path.as_mut())
                    && replay_path.is_relative()
                    && let Some(base) = path.parent()
                {
                    *replay_path = base.join(&*replay_path);
                }
                llm = file_llm;
            }
            if let Some(file_stages) = file_config.stages {
                stages = file_stages;
            }
        }

        if let Some(provider) = non_empty_env("POSTSPIN_PROVIDER") {
            llm.provider = Some(provider);
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Env);
        }
        if let Some(raw) = non_empty_env("POSTSPIN_MAX_ITERATIONS") {
            let iterations = raw.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "POSTSPIN_MAX_ITERATIONS".to_string(),
                value: format!("'{raw}' is not a positive integer"),
            })?;
            spin.max_humanization_iterations = Some(iterations);
            source_attribution.insert("max_humanization_iterations".to_string(), ConfigSource::Env);
        }

        if let Some(model) = &cli_args.model {
            defaults.model = Some(model.clone());
            source_attribution.insert("model".to_string(), ConfigSource::Cli);
        }
        if let Some(verbose) = cli_args.verbose {
            defaults.verbose = Some(verbose);
            source_attribution.insert("verbose".to_string(), ConfigSource::Cli);
        }
        if let Some(log_json) = cli_args.log_json {
            defaults.log_json = Some(log_json);
            source_attribution.insert("log_json".to_string(), ConfigSource::Cli);
        }
        if let Some(timeout) = cli_args.stage_timeout {
            defaults.stage_timeout = Some(timeout);
            source_attribution.insert("stage_timeout".to_string(), ConfigSource::Cli);
        }
        if let Some(provider) = &cli_args.llm_provider {
            llm.provider = Some(provider.clone());
            source_attribution.insert("llm_provider".to_string(), ConfigSource::Cli);
        }
        if let Some(iterations) = cli_args.max_iterations {
            spin.max_humanization_iterations = Some(iterations);
            source_attribution.insert("max_humanization_iterations".to_string(), ConfigSource::Cli);
        }
        if let Some(adoption) = cli_args.adoption {
            spin.adoption = Some(adoption);
            source_attribution.insert("adoption".to_string(), ConfigSource::Cli);
        }

        let config = Self {
            defaults,
            spin,
            llm,
            stages,
            source_attribution,
            config_path,
        };
        config.validate()?;

        tracing::debug!(
            config_path = ?config.config_path,
            provider = config.provider(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Locate a config file.
    ///
    /// `POSTSPIN_HOME/config.toml` wins when set. Otherwise walks up from `start_dir`
    /// looking for `.postspin/config.toml`, stopping at a repository root (`.git`,
    /// `.hg`, `.svn`), and finally tries the user config dir (`~/.config/postspin`).
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        if let Some(home) = non_empty_env("POSTSPIN_HOME") {
            let candidate = PathBuf::from(home).join(CONFIG_FILE);
            return Ok(candidate.exists().then_some(candidate));
        }

        let mut current = Some(start_dir);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.exists() {
                return Ok(Some(candidate));
            }
            if [".git", ".hg", ".svn"].iter().any(|m| dir.join(m).exists()) {
                break;
            }
            current = dir.parent();
        }

        Ok(dirs::config_dir()
            .map(|d| d.join("postspin").join(CONFIG_FILE))
            .filter(|p| p.exists()))
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::InvalidFile(format!("{}: {e}", path.display())).into()
            }),
            // An explicit path that does not exist yet behaves like an empty file.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {e}",
                path.display()
            )),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
