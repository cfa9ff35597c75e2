/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockTranslator::working()` - Always succeeds with marked translations
 * - `MockTranslator::echo()` - Returns the source text unchanged
 * - `MockTranslator::fail_times(n)` - Fails transiently n times, then works
 * - `MockTranslator::auth_failure()` - Always fails with a credential error
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::TranslationApi;
use crate::errors::ProviderError;

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, prefixing each text with the target language
    Working,
    /// Always succeeds, returning the source text unchanged
    Echo,
    /// Fails with a 503 for the first `failures` calls, then works
    FailTimes {
        /// Number of leading calls that fail
        failures: usize,
    },
    /// Every call fails with a 503
    AlwaysFailing,
    /// Every call fails with an authentication error
    AuthFailure,
    /// Every call fails with a quota-exhausted error
    QuotaFailure,
    /// First call is rate-limited with a retry-after hint, then works
    RateLimitedOnce {
        /// Hinted delay in milliseconds
        retry_after_ms: u64,
    },
    /// Succeeds but drops the last item from the response
    WrongCount,
    /// Succeeds with an empty payload
    EmptyResponse,
}

/// Mock provider for exercising client and pipeline behavior
#[derive(Debug)]
pub struct MockTranslator {
    /// Behavior mode
    behavior: MockBehavior,
    /// Shared request counter
    calls: Arc<AtomicUsize>,
}

impl MockTranslator {
    /// Create a mock with the given behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Mock that always succeeds with marked translations
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Mock that returns every text unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Mock that fails transiently `failures` times before succeeding
    pub fn fail_times(failures: usize) -> Self {
        Self::new(MockBehavior::FailTimes { failures })
    }

    /// Mock that always fails transiently
    pub fn always_failing() -> Self {
        Self::new(MockBehavior::AlwaysFailing)
    }

    /// Mock that always fails with a credential error
    pub fn auth_failure() -> Self {
        Self::new(MockBehavior::AuthFailure)
    }

    /// Mock that always fails with an exhausted quota
    pub fn quota_failure() -> Self {
        Self::new(MockBehavior::QuotaFailure)
    }

    /// Mock that is rate-limited once, then works
    pub fn rate_limited_once(retry_after_ms: u64) -> Self {
        Self::new(MockBehavior::RateLimitedOnce { retry_after_ms })
    }

    /// Mock that returns one item too few
    pub fn wrong_count() -> Self {
        Self::new(MockBehavior::WrongCount)
    }

    /// Mock that returns an empty payload
    pub fn empty_response() -> Self {
        Self::new(MockBehavior::EmptyResponse)
    }

    /// Number of calls received so far, shared across clones
    pub fn request_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn translate_all(texts: &[String], target: &str, echo: bool) -> Vec<String> {
        texts
            .iter()
            .map(|t| {
                if echo {
                    t.clone()
                } else {
                    format!("[{}] {}", target, t)
                }
            })
            .collect()
    }
}

impl Clone for MockTranslator {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            calls: Arc::clone(&self.calls),
        }
    }
}

#[async_trait]
impl TranslationApi for MockTranslator {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        _source_language: Option<&str>,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => Ok(Self::translate_all(texts, target_language, false)),

            MockBehavior::Echo => Ok(Self::translate_all(texts, target_language, true)),

            MockBehavior::FailTimes { failures } => {
                if call < failures {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("simulated transient failure #{}", call + 1),
                    })
                } else {
                    Ok(Self::translate_all(texts, target_language, false))
                }
            }

            MockBehavior::AlwaysFailing => Err(ProviderError::ApiError {
                status_code: 503,
                message: "simulated provider outage".to_string(),
            }),

            MockBehavior::AuthFailure => Err(ProviderError::AuthenticationError(
                "simulated invalid API key".to_string(),
            )),

            MockBehavior::QuotaFailure => Err(ProviderError::QuotaExhausted(
                "simulated exhausted character quota".to_string(),
            )),

            MockBehavior::RateLimitedOnce { retry_after_ms } => {
                if call == 0 {
                    Err(ProviderError::RateLimited {
                        retry_after: Some(Duration::from_millis(retry_after_ms)),
                    })
                } else {
                    Ok(Self::translate_all(texts, target_language, false))
                }
            }

            MockBehavior::WrongCount => {
                let mut out = Self::translate_all(texts, target_language, false);
                out.pop();
                Ok(out)
            }

            MockBehavior::EmptyResponse => Ok(Vec::new()),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::AuthFailure => Err(ProviderError::AuthenticationError(
                "simulated invalid API key".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
