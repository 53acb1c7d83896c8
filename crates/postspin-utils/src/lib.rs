//! Foundation utilities shared by every postspin crate.
//!
//! - [`types`]: stage identifiers and configuration source attribution
//! - [`error`]: the error taxonomy (`LlmError`, `SpinError`, `ConfigError`, `PostspinError`)
//! - [`exit_codes`]: process exit codes for the CLI
//! - [`logging`]: tracing initialisation and per-stage structured events
//! - [`redaction`]: scrubbing of credentials from error text before it is logged

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod redaction;
pub mod types;
