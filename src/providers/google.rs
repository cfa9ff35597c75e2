use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::TranslationApi;
use crate::errors::ProviderError;

/// Google Cloud Translation v2 client
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// API key, passed as a query parameter
    api_key: String,
    /// API endpoint URL
    endpoint: String,
}

/// Default Google Cloud Translation endpoint
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com";

/// Translation request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Texts to translate, in order
    q: &'a [String],

    /// Target language code
    target: String,

    /// Source language code, omitted for auto-detection
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,

    /// Request plain text handling so no HTML entities come back
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl GoogleTranslate {
    /// Create a new Google Translate client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/language/translate/v2", base)
    }

    /// Normalize a language code to the lowercase form Google expects
    fn wire_code(code: &str) -> String {
        code.trim().to_lowercase()
    }
}

#[async_trait]
impl TranslationApi for GoogleTranslate {
    fn name(&self) -> &'static str {
        "Google Translate"
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let request = TranslateRequest {
            q: texts,
            target: Self::wire_code(target_language),
            source: source_language.map(Self::wire_code),
            format: "text",
        };

        let response = self
            .client
            .post(self.api_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let err = error_from_response(status, response).await;
            error!("Google Translate API error: {}", err);
            return Err(err);
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        // Translating a single word is the cheapest credential check the
        // v2 API offers
        let probe = vec!["hello".to_string()];
        self.translate_batch(&probe, Some("en"), "fr").await.map(|_| ())
    }
}

fn request_error(err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::ConnectionError(err.to_string())
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}

/// Map an unsuccessful HTTP response to the taxonomy.
///
/// Google reports both credential and quota problems as 403; the body is
/// inspected to tell them apart (`dailyLimitExceeded`, `userRateLimitExceeded`
/// and friends carry the word "limit" or "quota").
async fn error_from_response(status: StatusCode, response: Response) -> ProviderError {
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error response body".to_string());

    match status.as_u16() {
        401 => ProviderError::AuthenticationError(body),
        403 => {
            let lowered = body.to_lowercase();
            if lowered.contains("quota") || lowered.contains("limit") {
                ProviderError::QuotaExhausted(body)
            } else {
                ProviderError::AuthenticationError(body)
            }
        }
        429 => ProviderError::RateLimited { retry_after },
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}
