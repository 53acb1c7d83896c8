//! Call-count budget for any backend.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

use postspin_utils::error::LlmError;

use crate::types::{LlmBackend, LlmInvocation, LlmResult};

/// Environment variable that overrides any configured budget.
pub const BUDGET_ENV_VAR: &str = "POSTSPIN_LLM_BUDGET";

/// Wraps a backend and refuses calls past `limit`.
///
/// The budget counts attempted calls, not successful ones, so a failing provider
/// still consumes a slot. The count lives for the lifetime of the backend, which
/// for the CLI is the process (a whole batch shares one budget).
pub struct BudgetedBackend {
    inner: Box<dyn LlmBackend>,
    used: AtomicU32,
    limit: u32,
}

impl BudgetedBackend {
    pub fn new(inner: Box<dyn LlmBackend>, limit: u32) -> Self {
        debug!(limit, "Creating BudgetedBackend");
        Self {
            inner,
            used: AtomicU32::new(0),
            limit,
        }
    }

    /// Calls attempted so far, including refused ones.
    pub fn call_count(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Budget precedence: `POSTSPIN_LLM_BUDGET` > `[llm.<provider>] budget` > unlimited.
pub(crate) fn resolve_budget_limit(config_budget: Option<u32>) -> Option<u32> {
    match std::env::var(BUDGET_ENV_VAR).ok().map(|v| v.parse::<u32>()) {
        Some(Ok(limit)) => {
            debug!(limit, "Using budget limit from {BUDGET_ENV_VAR}");
            Some(limit)
        }
        Some(Err(_)) => {
            warn!("Ignoring unparseable {BUDGET_ENV_VAR}");
            config_budget
        }
        None => config_budget,
    }
}

#[async_trait]
impl LlmBackend for BudgetedBackend {
    async fn invoke(&self, inv: LlmInvocation) -> Result<LlmResult, LlmError> {
        // Count before calling so failures and concurrent callers are charged too.
        let previous = self.used.fetch_add(1, Ordering::SeqCst);
        let attempted = previous + 1;

        if previous >= self.limit {
            warn!(limit = self.limit, attempted, stage = %inv.stage, "Budget limit exceeded");
            return Err(LlmError::BudgetExceeded {
                limit: self.limit,
                attempted,
            });
        }

        debug!(call_count = attempted, limit = self.limit, "Budget check passed");
        self.inner.invoke(inv).await
    }
}
