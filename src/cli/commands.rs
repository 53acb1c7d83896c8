//! Command implementations.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use postspin_config::Config;
use postspin_engine::{BatchRunner, SpinOrchestrator};
use postspin_llm::{LlmBackend, from_config_with_fallback};
use postspin_utils::error::PostspinError;
use postspin_utils::exit_codes::ExitCode;

use crate::request::{parse_batch, parse_request};

/// Where the spin request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestSource {
    Inline(String),
    File(PathBuf),
    Stdin,
    Missing,
}

impl RequestSource {
    pub(crate) fn from_flags(inline: Option<String>, stdin: bool, file: Option<PathBuf>) -> Self {
        match (inline, stdin, file) {
            (Some(json), _, _) => Self::Inline(json),
            (None, _, Some(path)) => Self::File(path),
            (None, true, None) => Self::Stdin,
            (None, false, None) => Self::Missing,
        }
    }

    fn read(self) -> Result<String, PostspinError> {
        match self {
            Self::Inline(json) => Ok(json),
            Self::File(path) => read_file(&path),
            Self::Stdin => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                Ok(buf)
            }
            Self::Missing => Err(PostspinError::Request(
                "no request given; pass it inline, with --file or with --stdin".to_string(),
            )),
        }
    }
}

fn read_file(path: &Path) -> Result<String, PostspinError> {
    std::fs::read_to_string(path).map_err(|e| {
        PostspinError::Request(format!("cannot read {}: {e}", path.display()))
    })
}

fn make_backend(config: &Config) -> Result<Arc<dyn LlmBackend>, PostspinError> {
    let (backend, fallback) = from_config_with_fallback(config)?;
    if let Some(info) = fallback {
        warn!(
            primary = %info.primary_provider,
            fallback = %info.fallback_provider,
            reason = %info.reason,
            "Using fallback LLM provider"
        );
    }
    Ok(Arc::from(backend))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), PostspinError> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}

/// Spin one request. The result is printed even when the run failed.
pub(crate) async fn execute_spin_command(
    config: &Config,
    source: RequestSource,
    history: bool,
    strict_gates: bool,
) -> Result<ExitCode, PostspinError> {
    let request = parse_request(&source.read()?)?;
    let orchestrator = SpinOrchestrator::from_config(config, make_backend(config)?);

    let outcome = orchestrator.run(&request).await;
    if history {
        print_json(&outcome)?;
    } else {
        print_json(&outcome.result)?;
    }

    let result = &outcome.result;
    if !result.success {
        return Ok(ExitCode::SPIN_FAILED);
    }
    if strict_gates && !result.passed_all_checks() {
        warn!(
            passed_ai_check = result.passed_ai_check,
            passed_plagiarism_check = result.passed_plagiarism_check,
            "Quality gate failed"
        );
        return Ok(ExitCode::GATE_FAILED);
    }
    Ok(ExitCode::SUCCESS)
}

/// Spin every request in a file. Exits with `SPIN_FAILED` if any run failed.
pub(crate) async fn execute_batch_command(
    config: &Config,
    file: &Path,
    concurrency: Option<usize>,
) -> Result<ExitCode, PostspinError> {
    let requests = parse_batch(&read_file(file)?)?;
    let concurrency = concurrency.unwrap_or_else(|| config.batch_concurrency());
    let orchestrator = Arc::new(SpinOrchestrator::from_config(config, make_backend(config)?));

    info!(requests = requests.len(), concurrency, "Starting batch");
    let results = BatchRunner::new(orchestrator, concurrency)
        .spin_all(requests)
        .await;
    print_json(&results)?;

    let failed = results.iter().filter(|r| !r.success).count();
    info!(total = results.len(), failed, "Batch complete");
    Ok(if failed > 0 {
        ExitCode::SPIN_FAILED
    } else {
        ExitCode::SUCCESS
    })
}

pub(crate) fn execute_config_command(config: &Config) -> Result<ExitCode, PostspinError> {
    println!("Effective configuration:");
    match &config.config_path {
        Some(path) => println!("  config file: {}", path.display()),
        None => println!("  config file: (none)"),
    }
    for (key, value, source) in config.effective_settings() {
        println!("  {key} = {value}  [{source}]");
    }
    Ok(ExitCode::SUCCESS)
}
