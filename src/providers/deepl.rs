use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::TranslationApi;
use crate::errors::ProviderError;

/// DeepL client for the DeepL REST API v2
#[derive(Debug)]
pub struct DeepL {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (free or pro)
    endpoint: String,
}

/// Default endpoint for free-tier API keys
pub const FREE_ENDPOINT: &str = "https://api-free.deepl.com";

/// Endpoint for pro API keys
pub const PRO_ENDPOINT: &str = "https://api.deepl.com";

/// DeepL translate request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Texts to translate, in order
    text: &'a [String],

    /// Target language in DeepL wire format
    target_lang: String,

    /// Source language, omitted for auto-detection
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

/// DeepL translate response
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    /// One entry per submitted text, in order
    translations: Vec<Translation>,
}

/// Individual translation in a DeepL response
#[derive(Debug, Deserialize)]
struct Translation {
    /// The translated text
    text: String,

    /// Language the service detected for the source text
    #[serde(default)]
    #[allow(dead_code)]
    detected_source_language: Option<String>,
}

/// Account usage as reported by /v2/usage
#[derive(Debug, Deserialize)]
pub struct DeepLUsage {
    /// Characters consumed in the current period
    pub character_count: u64,
    /// Character allowance for the current period
    pub character_limit: u64,
}

impl DeepL {
    /// Create a new DeepL client
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

    fn api_url(&self, path: &str) -> String {
        let base = if self.endpoint.is_empty() {
            FREE_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}{}", base, path)
    }

    /// Query account usage, also a cheap credential check
    pub async fn usage(&self) -> Result<DeepLUsage, ProviderError> {
        let response = self
            .client
            .get(self.api_url("/v2/usage"))
            .header(header::AUTHORIZATION, format!("DeepL-Auth-Key {}", self.api_key))
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        response
            .json::<DeepLUsage>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("usage response: {}", e)))
    }

    /// Convert an ISO 639-1 code to the DeepL wire format
    fn wire_code(code: &str) -> String {
        code.trim().to_uppercase()
    }
}

#[async_trait]
impl TranslationApi for DeepL {
    fn name(&self) -> &'static str {
        "DeepL"
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let request = TranslateRequest {
            text: texts,
            target_lang: Self::wire_code(target_language),
            source_lang: source_language.map(Self::wire_code),
        };

        let response = self
            .client
            .post(self.api_url("/v2/translate"))
            .header(header::AUTHORIZATION, format!("DeepL-Auth-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let err = error_from_response(status, response).await;
            error!("DeepL API error: {}", err);
            return Err(err);
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.usage().await.map(|_| ())
    }
}

/// Map a transport-level reqwest error to the taxonomy
fn request_error(err: reqwest::Error) -> ProviderError {
    if err.is_connect() || err.is_timeout() {
        ProviderError::ConnectionError(err.to_string())
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}

/// Map an unsuccessful HTTP response to the taxonomy.
///
/// DeepL specifics: 456 means the character quota is exhausted; 429 carries
/// an optional Retry-After delay that the client honors before retrying.
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
        401 | 403 => ProviderError::AuthenticationError(body),
        456 => ProviderError::QuotaExhausted(body),
        429 => ProviderError::RateLimited { retry_after },
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}
