/*!
 * Tests for the translation client's retry, backoff and failure policy
 */

use std::sync::Arc;

use xlation::document::model::CellRef;
use xlation::errors::ProviderError;
use xlation::providers::mock::MockTranslator;
use xlation::translation::batch::Batch;
use xlation::translation::client::{RetryPolicy, TranslationClient};
use xlation::translation::extract::TranslationUnit;
use xlation::translation::rate_limit::RateLimiter;

fn batch(texts: &[&str]) -> Batch {
    Batch {
        index: 0,
        units: texts
            .iter()
            .enumerate()
            .map(|(i, t)| TranslationUnit::new(CellRef::new(0, i as u32 + 1, 1), *t))
            .collect(),
    }
}

fn client_with(mock: MockTranslator, max_attempts: u32) -> (TranslationClient, MockTranslator) {
    let shared = mock.clone();
    let client = TranslationClient::new(
        Arc::new(mock),
        RetryPolicy::new(max_attempts, 1, 10),
        Arc::new(RateLimiter::disabled()),
    );
    (client, shared)
}

/// A client that fails transiently fewer times than the attempt budget
/// recovers and returns the translations
#[tokio::test]
async fn test_translate_batch_withTransientFailures_shouldRecover() {
    let (client, mock) = client_with(MockTranslator::fail_times(2), 3);

    let result = client
        .translate_batch(&batch(&["Hello", "World"]), Some("en"), "fr")
        .await
        .unwrap();

    assert_eq!(result, vec!["[fr] Hello".to_string(), "[fr] World".to_string()]);
    assert_eq!(mock.request_count(), 3);
}

/// Exhausting the attempt budget surfaces the last transient error
#[tokio::test]
async fn test_translate_batch_withPersistentFailure_shouldExhaustRetries() {
    let (client, mock) = client_with(MockTranslator::always_failing(), 3);

    let result = client.translate_batch(&batch(&["x"]), None, "fr").await;
    assert!(matches!(result, Err(ProviderError::ApiError { .. })));
    assert_eq!(mock.request_count(), 3);
}

/// Authentication failures are fatal: exactly one call, no retries
#[tokio::test]
async fn test_translate_batch_withAuthFailure_shouldNotRetry() {
    let (client, mock) = client_with(MockTranslator::auth_failure(), 5);

    let result = client.translate_batch(&batch(&["x"]), None, "fr").await;
    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
    assert_eq!(mock.request_count(), 1);
}

/// Quota failures are fatal as well
#[tokio::test]
async fn test_translate_batch_withQuotaFailure_shouldNotRetry() {
    let (client, mock) = client_with(MockTranslator::quota_failure(), 5);

    let result = client.translate_batch(&batch(&["x"]), None, "fr").await;
    assert!(matches!(result, Err(ProviderError::QuotaExhausted(_))));
    assert_eq!(mock.request_count(), 1);
}

/// A response with the wrong item count is malformed and retried until the
/// budget runs out
#[tokio::test]
async fn test_translate_batch_withWrongCount_shouldRetryThenFail() {
    let (client, mock) = client_with(MockTranslator::wrong_count(), 2);

    let result = client.translate_batch(&batch(&["a", "b"]), None, "fr").await;
    assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
    assert_eq!(mock.request_count(), 2);
}

/// An empty payload for a non-empty batch is malformed too
#[tokio::test]
async fn test_translate_batch_withEmptyPayload_shouldRetryThenFail() {
    let (client, mock) = client_with(MockTranslator::empty_response(), 2);

    let result = client.translate_batch(&batch(&["a"]), None, "fr").await;
    assert!(matches!(result, Err(ProviderError::MalformedResponse(_))));
    assert_eq!(mock.request_count(), 2);
}

/// A rate-limited response is retried after honoring the hinted delay
#[tokio::test]
async fn test_translate_batch_withRateLimit_shouldHonorRetryAfterAndRecover() {
    let started = std::time::Instant::now();
    let (client, mock) = client_with(MockTranslator::rate_limited_once(50), 3);

    let result = client
        .translate_batch(&batch(&["Hello"]), None, "de")
        .await
        .unwrap();

    assert_eq!(result, vec!["[de] Hello".to_string()]);
    assert_eq!(mock.request_count(), 2);
    // The hinted 50ms wait must have elapsed before the second attempt
    assert!(started.elapsed() >= std::time::Duration::from_millis(50));
}
