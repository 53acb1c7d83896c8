//! Tracing setup and structured stage events.
//!
//! Logs always go to stderr; stdout is reserved for the JSON result.

use tracing::{Level, error, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::SpinErrorKind;
use crate::redaction::redact_error_message;
use crate::types::StageId;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` selects `postspin=debug` and the
/// default is `postspin=info` with everything else at `warn`. With `json` each event is
/// one JSON object per line.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("postspin=debug,info")
            } else {
                EnvFilter::try_new("postspin=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping a single stage invocation.
pub fn stage_span(run_id: &str, stage: StageId) -> tracing::Span {
    span!(
        Level::INFO,
        "stage",
        run_id = %run_id,
        stage = %stage,
    )
}

pub fn log_stage_start(run_id: &str, stage: StageId, model: &str) {
    info!(
        run_id = %run_id,
        stage = %stage,
        model = %model,
        "Starting stage"
    );
}

pub fn log_stage_complete(run_id: &str, stage: StageId, duration_ms: u128) {
    info!(
        run_id = %run_id,
        stage = %stage,
        duration_ms = %duration_ms,
        "Stage completed"
    );
}

/// Log a stage failure. The message is redacted before it is emitted.
pub fn log_stage_error(
    run_id: &str,
    stage: StageId,
    kind: SpinErrorKind,
    error: &str,
    duration_ms: u128,
) {
    let sanitized = redact_error_message(error);
    match kind {
        // rejected model output logs at warn, provider failures at error
        SpinErrorKind::SchemaValidation | SpinErrorKind::InvalidSelection => warn!(
            run_id = %run_id,
            stage = %stage,
            kind = %kind,
            duration_ms = %duration_ms,
            error = %sanitized,
            "Stage output rejected"
        ),
        SpinErrorKind::Service | SpinErrorKind::Timeout => error!(
            run_id = %run_id,
            stage = %stage,
            kind = %kind,
            duration_ms = %duration_ms,
            error = %sanitized,
            "Stage failed"
        ),
    }
}
