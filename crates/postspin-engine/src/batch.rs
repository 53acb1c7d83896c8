//! Concurrent spinning of independent requests.
//!
//! Runs share nothing but the orchestrator (and through it the backend), so they are
//! spawned on a `JoinSet` and bounded by a semaphore. Results come back in input order.

use std::sync::Arc;

use postspin_schema::{SpinRequest, SpinResult};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::orchestrator::{SpinOrchestrator, SpinOutcome};

pub const DEFAULT_CONCURRENCY: usize = postspin_config::config::DEFAULT_BATCH_CONCURRENCY;

pub struct BatchRunner {
    orchestrator: Arc<SpinOrchestrator>,
    concurrency: usize,
}

impl BatchRunner {
    /// `concurrency` is clamped to at least 1.
    #[must_use]
    pub fn new(orchestrator: Arc<SpinOrchestrator>, concurrency: usize) -> Self {
        Self {
            orchestrator,
            concurrency: concurrency.max(1),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Spin every request and return the results in input order.
    pub async fn spin_all(&self, requests: Vec<SpinRequest>) -> Vec<SpinResult> {
        self.run_all(requests)
            .await
            .into_iter()
            .map(|outcome| match outcome {
                Ok(outcome) => outcome.result,
                Err(message) => SpinResult::failed(message),
            })
            .collect()
    }

    /// Like [`BatchRunner::spin_all`] but keeps full outcomes. A run whose task panicked
    /// or was cancelled is reported as `Err` with the reason.
    pub async fn run_all(&self, requests: Vec<SpinRequest>) -> Vec<Result<SpinOutcome, String>> {
        let total = requests.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, request) in requests.into_iter().enumerate() {
            let orchestrator = Arc::clone(&self.orchestrator);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                debug!(index, "Batch run starting");
                (index, orchestrator.run(&request).await)
            });
        }

        let mut slots: Vec<Option<Result<SpinOutcome, String>>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(Ok(outcome));
                    }
                }
                Err(join_error) => {
                    error!(error = %join_error, "Batch run task did not complete");
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err("spin task did not complete".to_string())))
            .collect()
    }
}
