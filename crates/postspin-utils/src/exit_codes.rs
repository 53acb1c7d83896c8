//! Process exit codes for the `postspin` binary.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Run(s) succeeded |
//! | 1 | `INTERNAL` | Unexpected internal failure |
//! | 2 | `CLI_ARGS` | Invalid arguments, configuration or request |
//! | 3 | `GATE_FAILED` | `--strict-gates` and a quality gate did not pass |
//! | 70 | `SPIN_FAILED` | A run failed; its result was still printed |

use crate::error::{LlmError, PostspinError};

/// Type-safe exit code.
///
/// ```rust
/// use postspin_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SPIN_FAILED.as_i32(), 70);
/// assert_eq!(ExitCode::from_i32(0), ExitCode::SUCCESS);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const INTERNAL: ExitCode = ExitCode(1);
    pub const CLI_ARGS: ExitCode = ExitCode(2);
    pub const GATE_FAILED: ExitCode = ExitCode(3);
    pub const SPIN_FAILED: ExitCode = ExitCode(70);

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl PostspinError {
    /// Map an error to the exit code the CLI reports for it.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) | Self::Request(_) => ExitCode::CLI_ARGS,
            Self::Llm(LlmError::Misconfiguration(_) | LlmError::Unsupported(_)) => {
                ExitCode::CLI_ARGS
            }
            Self::Llm(_) | Self::Spin(_) => ExitCode::SPIN_FAILED,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}
