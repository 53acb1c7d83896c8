//! Configuration for postspin.
//!
//! Precedence is CLI flags > environment > `.postspin/config.toml` > built-in defaults,
//! with the source of each effective value recorded for `postspin config`.

pub mod config;

pub use config::{
    AdoptionPolicy, CliArgs, Config, Defaults, HttpProviderConfig, LlmConfig, ReplayConfig,
    SpinConfig, SpinThresholds, StageConfig, StagesConfig,
};
