//! Identifiers shared across the pipeline crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The four LLM-backed stages of a spin run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Analyzer,
    AngleGenerator,
    Writer,
    Humanizer,
}

impl StageId {
    /// All stages in pipeline order.
    pub const ALL: [StageId; 4] = [
        StageId::Analyzer,
        StageId::AngleGenerator,
        StageId::Writer,
        StageId::Humanizer,
    ];

    /// Stable name used in logs, config keys and replay scripts.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            StageId::Analyzer => "analyzer",
            StageId::AngleGenerator => "angle_generator",
            StageId::Writer => "writer",
            StageId::Humanizer => "humanizer",
        }
    }

    /// Parse a stage name. Accepts `-` in place of `_` and ignores case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an effective configuration value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Command-line flag
    Cli,
    /// Environment variable
    Env,
    /// A discovered or explicit config file
    ConfigFile(PathBuf),
    /// Built-in default
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Cli => write!(f, "cli"),
            ConfigSource::Env => write!(f, "env"),
            ConfigSource::ConfigFile(path) => write!(f, "config ({})", path.display()),
            ConfigSource::Default => write!(f, "default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_round_trip_through_parse() {
        for stage in StageId::ALL {
            assert_eq!(StageId::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(StageId::parse("Angle-Generator"), Some(StageId::AngleGenerator));
        assert_eq!(StageId::parse("editor"), None);
    }

    #[test]
    fn stage_serializes_as_snake_case() {
        let json = serde_json::to_string(&StageId::AngleGenerator).unwrap();
        assert_eq!(json, "\"angle_generator\"");
    }

    #[test]
    fn config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "cli");
        assert_eq!(
            ConfigSource::ConfigFile(PathBuf::from("/tmp/c.toml")).to_string(),
            "config (/tmp/c.toml)"
        );
    }
}
