use std::path::PathBuf;

use super::AdoptionPolicy;

/// Overrides collected from command-line flags. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub model: Option<String>,
    pub verbose: Option<bool>,
    pub log_json: Option<bool>,
    pub llm_provider: Option<String>,
    pub stage_timeout: Option<u64>,
    pub max_iterations: Option<u32>,
    pub adoption: Option<AdoptionPolicy>,
}
