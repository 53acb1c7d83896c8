//! Shared HTTP client for the HTTP-based providers.
//!
//! One `reqwest::Client` per backend, reused across calls, with a bounded retry
//! policy for server errors and network failures.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

use postspin_utils::error::LlmError;
use postspin_utils::redaction::redact_error_message;

/// Upper bound applied to any per-request timeout.
const DEFAULT_MAX_HTTP_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retries for 5xx and network failures. 4xx is never retried.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    /// Backoff before retry `n` is `initial_backoff * n`.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Client,
    max_timeout: Duration,
    retry: RetryPolicy,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client cannot be constructed
    pub fn new() -> Result<Self, LlmError> {
        Self::with_policy(DEFAULT_MAX_HTTP_TIMEOUT, RetryPolicy::default())
    }

    pub fn with_policy(max_timeout: Duration, retry: RetryPolicy) -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| {
                LlmError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            max_timeout,
            retry,
        })
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Execute a request with `min(request_timeout, max_timeout)` and the retry policy.
    ///
    /// # Errors
    ///
    /// - `ProviderAuth` for 401/403, `ProviderQuota` for 429, `Transport` for other 4xx
    /// - `ProviderOutage` for 5xx once retries are spent
    /// - `Timeout` when the request exceeds its timeout
    /// - `Transport` for network errors once retries are spent
    pub async fn execute_with_retry(
        &self,
        request_builder: RequestBuilder,
        request_timeout: Duration,
        provider_name: &str,
    ) -> Result<Response, LlmError> {
        let effective_timeout = request_timeout.min(self.max_timeout);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let request = request_builder
                .try_clone()
                .ok_or_else(|| {
                    LlmError::Transport("Failed to clone request for retry".to_string())
                })?
                .timeout(effective_timeout)
                .build()
                .map_err(|e| LlmError::Transport(format!("Failed to build request: {e}")))?;

            debug!(
                provider = provider_name,
                attempt,
                timeout_secs = effective_timeout.as_secs(),
                "Executing HTTP request"
            );

            let failure = match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_client_error() {
                        return Err(map_client_error(status, provider_name));
                    }
                    if !status.is_server_error() {
                        return Ok(response);
                    }
                    LlmError::ProviderOutage(format!(
                        "{provider_name} returned server error: {status}"
                    ))
                }
                Err(e) if e.is_timeout() => {
                    return Err(LlmError::Timeout {
                        duration: effective_timeout,
                    });
                }
                Err(e) => LlmError::Transport(format!(
                    "{provider_name} request failed: {}",
                    redact_error_message(&e.to_string())
                )),
            };

            if attempt > self.retry.max_retries {
                return Err(failure);
            }
            warn!(
                provider = provider_name,
                attempt,
                error = %failure,
                "Request failed, will retry"
            );
            tokio::time::sleep(self.retry.initial_backoff * attempt).await;
        }
    }
}

/// Map 4xx status codes to `LlmError` variants.
fn map_client_error(status: StatusCode, provider_name: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::ProviderAuth(format!("{provider_name} authentication failed: {status}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            LlmError::ProviderQuota(format!("{provider_name} rate limit exceeded: {status}"))
        }
        _ => LlmError::Transport(format!("{provider_name} returned client error: {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_defaults() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.max_timeout, DEFAULT_MAX_HTTP_TIMEOUT);
        assert_eq!(client.retry.max_retries, 2);
    }

    #[test]
    fn client_errors_map_to_variants() {
        assert!(matches!(
            map_client_error(StatusCode::UNAUTHORIZED, "openai"),
            LlmError::ProviderAuth(_)
        ));
        assert!(matches!(
            map_client_error(StatusCode::FORBIDDEN, "openai"),
            LlmError::ProviderAuth(_)
        ));
        assert!(matches!(
            map_client_error(StatusCode::TOO_MANY_REQUESTS, "openrouter"),
            LlmError::ProviderQuota(_)
        ));
        let other = map_client_error(StatusCode::BAD_REQUEST, "anthropic");
        assert!(matches!(other, LlmError::Transport(ref m) if m.contains("400")));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error_after_retries() {
        let client = HttpClient::with_policy(
            Duration::from_secs(2),
            RetryPolicy {
                max_retries: 1,
                initial_backoff: Duration::from_millis(1),
            },
        )
        .unwrap();
        // Port 9 on localhost is discard; nothing listens there in CI.
        let request = client.post("http://127.0.0.1:9/v1/chat/completions");
        let err = client
            .execute_with_retry(request, Duration::from_secs(2), "openai")
            .await
            .unwrap_err();
        assert!(
            matches!(err, LlmError::Transport(_) | LlmError::Timeout { .. }),
            "{err:?}"
        );
    }
}
