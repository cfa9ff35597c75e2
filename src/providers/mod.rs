/*!
 * Provider implementations for machine translation services.
 *
 * This module contains client implementations for the supported services:
 * - DeepL: DeepL REST API v2
 * - Google: Google Cloud Translation v2
 *
 * A mock provider is included for exercising the pipeline in tests.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must
/// follow, allowing them to be used interchangeably by the translation client.
#[async_trait]
pub trait TranslationApi: Send + Sync + Debug {
    /// Short provider name for logs and reports
    fn name(&self) -> &'static str;

    /// Translate a batch of texts.
    ///
    /// # Arguments
    /// * `texts` - Source strings, in order
    /// * `source_language` - ISO 639-1 source code, None for auto-detection
    /// * `target_language` - ISO 639-1 target code
    ///
    /// # Returns
    /// * Translated strings in the same order and count as `texts`
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError>;

    /// Test the connection and credentials
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

pub mod deepl;
pub mod google;
pub mod mock;
