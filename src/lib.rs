//! postspin turns a post that performed well for someone else into an original post
//! for your company.
//!
//! A run analyses the source post, generates alternative angles on its theme, writes a
//! draft for the recommended angle and humanizes it until the draft is declared ready or
//! the iteration budget runs out. Two quality gates are reported on the result: the AI
//! check (the last stage declared the text ready) and the plagiarism check (originality
//! at or above the threshold).
//!
//! ```no_run
//! use std::sync::Arc;
//! use postspin::{Config, CliArgs, SpinOrchestrator, parse_request};
//!
//! # async fn demo(json: &str) -> anyhow::Result<()> {
//! let config = Config::discover(&CliArgs::default())?;
//! let backend = postspin_llm::from_config(&config)?;
//! let orchestrator = SpinOrchestrator::from_config(&config, Arc::from(backend));
//! let result = orchestrator.spin(&parse_request(json)?).await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
mod request;

pub use request::{parse_batch, parse_request};

pub use postspin_config::{AdoptionPolicy, CliArgs, Config, SpinThresholds};
pub use postspin_engine::{
    BatchRunner, DraftState, GeneratorSettings, SpinOrchestrator, SpinOutcome, SpinState,
    StateSnapshot, StructuredGenerator, Termination,
};
pub use postspin_gate::{GateCondition, GateResult};
pub use postspin_llm::{LlmBackend, LlmInvocation, LlmResult, ReplayBackend};
pub use postspin_schema::{
    Analysis, Angle, AngleSet, CompanyProfile, Draft, FinalPost, Revision, SourcePost,
    SpinOptions, SpinRequest, SpinResult, TargetAudience, Tone,
};
pub use postspin_utils::error::{ConfigError, LlmError, PostspinError, SpinError};
pub use postspin_utils::exit_codes::ExitCode;
pub use postspin_utils::types::StageId;
