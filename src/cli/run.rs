//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, installs tracing, builds the
//! tokio runtime and dispatches to the command handlers. It prints every error itself.

use clap::Parser;

use postspin_config::{CliArgs, Config};
use postspin_utils::error::{ConfigError, PostspinError};
use postspin_utils::exit_codes::ExitCode;
use postspin_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::commands;

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` for any non-zero exit; main.rs only maps it to the process
/// exit status and never prints.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    let cli_args = cli_args_from(&cli);

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = config_failure(err);
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    let verbose = config.defaults.verbose.unwrap_or(false);
    let log_json = config.defaults.log_json.unwrap_or(false);
    if let Err(e) = init_tracing(verbose, log_json) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Spin {
                request,
                stdin,
                file,
                history,
                strict_gates,
                ..
            } => {
                let source = commands::RequestSource::from_flags(request, stdin, file);
                commands::execute_spin_command(&config, source, history, strict_gates).await
            }
            Commands::Batch { file, concurrency } => {
                commands::execute_batch_command(&config, &file, concurrency).await
            }
            Commands::Config => commands::execute_config_command(&config),
        }
    });

    match result {
        Ok(code) if code == ExitCode::SUCCESS => Ok(()),
        Ok(code) => Err(code),
        Err(err) => {
            eprintln!("{}", err.display_for_user());
            Err(err.to_exit_code())
        }
    }
}

/// Collect overrides from flags. Boolean flags only override when set, so a config
/// file can still turn them on.
fn cli_args_from(cli: &Cli) -> CliArgs {
    let (max_iterations, adoption) = match &cli.command {
        Commands::Spin {
            max_iterations,
            adoption,
            ..
        } => (*max_iterations, *adoption),
        _ => (None, None),
    };

    CliArgs {
        config_path: cli.config.clone(),
        model: cli.model.clone(),
        verbose: cli.verbose.then_some(true),
        log_json: cli.log_json.then_some(true),
        llm_provider: cli.llm_provider.clone(),
        stage_timeout: cli.stage_timeout,
        max_iterations,
        adoption,
    }
}

fn config_failure(err: anyhow::Error) -> PostspinError {
    match err.downcast::<ConfigError>() {
        Ok(config_error) => PostspinError::Config(config_error),
        Err(other) => PostspinError::Config(ConfigError::DiscoveryFailed(format!("{other:#}"))),
    }
}
