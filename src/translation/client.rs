use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use super::batch::Batch;
use super::rate_limit::RateLimiter;
use crate::errors::ProviderError;
use crate::providers::TranslationApi;

// @module: Translation client - one network call per batch, with retries

/// Explicit retry/backoff state, kept as data so termination is guaranteed
/// and the schedule is testable without a network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per batch, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles on each later attempt
    pub base_delay: Duration,
    /// Upper bound on a single backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Create a policy from configured values
    pub fn new(max_attempts: u32, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms.max(base_delay_ms)),
        }
    }

    /// Backoff before retrying after the given failed attempt (1-based).
    /// Pure: `base * 2^(attempt-1)`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1)).min(1 << 16);
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Performs the network call for one batch: submits the texts, receives the
/// translations in the same order, and resolves transient failures locally
/// through retry with exponential backoff. Fatal failures (authentication,
/// quota) propagate immediately. The client never touches the document.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    api: Arc<dyn TranslationApi>,
    retry: RetryPolicy,
    limiter: Arc<RateLimiter>,
}

impl TranslationClient {
    /// Create a client over a provider API, sharing the given rate limiter
    /// with every clone of this client
    pub fn new(api: Arc<dyn TranslationApi>, retry: RetryPolicy, limiter: Arc<RateLimiter>) -> Self {
        TranslationClient { api, retry, limiter }
    }

    /// Provider name, for logs and reports
    pub fn provider_name(&self) -> &str {
        self.api.name()
    }

    /// Verify the provider is reachable with the configured credentials
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.api.test_connection().await
    }

    /// Translate one batch, returning translated strings in batch order.
    ///
    /// Transient failures (connection errors, 5xx, rate limits, malformed
    /// responses) are retried up to the policy's attempt budget; rate-limit
    /// responses additionally honor the server-specified retry-after delay.
    /// Authentication and quota failures are returned immediately.
    pub async fn translate_batch(
        &self,
        batch: &Batch,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let texts = batch.texts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            // The limiter and the call itself are the only suspension points
            self.limiter.acquire().await;

            let outcome = match self
                .api
                .translate_batch(&texts, source_language, target_language)
                .await
            {
                Ok(translated) => validate_response(&texts, translated),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(translated) => {
                    debug!(
                        "Batch {} translated on attempt {} ({} items)",
                        batch.index + 1,
                        attempt,
                        translated.len()
                    );
                    return Ok(translated);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        warn!(
                            "Batch {} failed after {} attempts: {}",
                            batch.index + 1,
                            attempt,
                            e
                        );
                        return Err(e);
                    }

                    let mut delay = self.retry.delay_for(attempt);
                    if let Some(retry_after) = e.retry_after() {
                        delay = delay.max(retry_after);
                    }
                    let jitter = Duration::from_millis(rand::rng().random_range(0..=250));

                    warn!(
                        "Batch {} attempt {}/{} failed ({}), retrying in {:?}",
                        batch.index + 1,
                        attempt,
                        self.retry.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay + jitter).await;
                }
            }
        }
    }
}

/// Check a provider response against the submitted batch.
/// Wrong item counts and empty payloads are malformed, hence retried.
fn validate_response(
    texts: &[String],
    translated: Vec<String>,
) -> Result<Vec<String>, ProviderError> {
    if !texts.is_empty() && translated.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "empty payload for a non-empty batch".to_string(),
        ));
    }
    if translated.len() != texts.len() {
        return Err(ProviderError::MalformedResponse(format!(
            "expected {} items, got {}",
            texts.len(),
            translated.len()
        )));
    }
    Ok(translated)
}
