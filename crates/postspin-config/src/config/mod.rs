mod cli_args;
mod discovery;
mod model;
mod validation;

pub use cli_args::CliArgs;
pub use model::{
    AdoptionPolicy, Config, DEFAULT_BATCH_CONCURRENCY, DEFAULT_MAX_HUMANIZATION_ITERATIONS,
    DEFAULT_MIN_AUTHENTICITY_SCORE, DEFAULT_MIN_ORIGINALITY_SCORE, DEFAULT_PROVIDER,
    DEFAULT_STAGE_TIMEOUT_SECS, Defaults, HttpProviderConfig, LlmConfig, ReplayConfig,
    SpinConfig, SpinThresholds, StageConfig, StagesConfig,
};
pub use validation::KNOWN_PROVIDERS;
