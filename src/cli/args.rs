//! CLI argument definitions and parsing structures

use clap::{Parser, Subcommand};
use postspin_config::AdoptionPolicy;
use std::path::PathBuf;

/// postspin - rewrite a high-performing post as an original post for your company
#[derive(Parser, Debug)]
#[command(name = "postspin")]
#[command(about = "Rewrite a high-performing post as an original post for your company")]
#[command(long_about = r#"
postspin analyses a post that performed well, proposes new angles on its theme,
writes a draft for your company and humanizes it until it reads as written by a
person or the iteration budget runs out.

EXAMPLES:
  # Spin a request passed inline
  postspin spin '{"original_post": {...}, "company_profile": {...}}'

  # Spin a request from a file, keeping the highest-scoring draft
  postspin spin --file request.json --adoption best

  # Read the request from stdin and print the full run history
  cat request.json | postspin spin --stdin --history

  # Fail with exit code 3 when a quality gate does not pass
  postspin spin --file request.json --strict-gates

  # Spin many requests, eight at a time
  postspin batch --file requests.json --concurrency 8

  # Show the effective configuration and where each value came from
  postspin config

CONFIGURATION:
  Precedence: CLI flags > environment > config file > defaults
  The config file is found by searching upward from the working directory for
  .postspin/config.toml, or set with --config / POSTSPIN_HOME.

EXIT CODES:
  0 success, 1 internal error, 2 invalid arguments/config/request,
  3 quality gate failed (--strict-gates), 70 the run failed
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// LLM provider: openai, openrouter, anthropic or replay
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// Model used for every stage without a per-stage override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Timeout per stage call in seconds (5-1800)
    #[arg(long, global = true)]
    pub stage_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spin one request and print the SpinResult as JSON
    Spin {
        /// Request JSON passed inline
        #[arg(conflicts_with_all = ["stdin", "file"])]
        request: Option<String>,

        /// Read the request JSON from stdin
        #[arg(long, conflicts_with = "file")]
        stdin: bool,

        /// Read the request JSON from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Cap on writer + humanizer calls (1-10)
        #[arg(long)]
        max_iterations: Option<u32>,

        /// Which draft becomes the final post: latest or best
        #[arg(long)]
        adoption: Option<AdoptionPolicy>,

        /// Print the full outcome: result, state history, gates and best draft
        #[arg(long)]
        history: bool,

        /// Exit with code 3 when the AI or plagiarism check fails
        #[arg(long)]
        strict_gates: bool,
    },

    /// Spin a JSON array of requests concurrently and print the results in order
    Batch {
        /// File containing a JSON array of requests
        #[arg(long)]
        file: PathBuf,

        /// Maximum concurrent runs (1-32)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print the effective configuration with the source of each value
    Config,
}
