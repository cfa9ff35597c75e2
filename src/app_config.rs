use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::language_utils;
use crate::translation::pipeline::JobOptions;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO 639-1, or "auto" for detection)
    pub source_language: String,

    /// Target language code (ISO 639-1)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: DeepL
    #[default]
    DeepL,
    // @provider: Google Cloud Translation
    Google,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DeepL => "DeepL",
            Self::Google => "Google Translate",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DeepL => "deepl".to_string(),
            Self::Google => "google".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "deepl" => Ok(Self::DeepL),
            "google" => Ok(Self::Google),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Max cells per request; 0 picks a size automatically
    #[serde(default = "default_batch_item_limit")]
    pub batch_item_limit: usize,

    // @field: Max chars per request
    #[serde(default = "default_batch_char_limit")]
    pub batch_char_limit: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per second)
    #[serde(default)]
    pub rate_limit_rps: Option<f64>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::DeepL => Self {
                provider_type: "deepl".to_string(),
                api_key: String::new(),
                endpoint: default_deepl_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                batch_item_limit: default_batch_item_limit(),
                batch_char_limit: default_batch_char_limit(),
                timeout_secs: default_timeout_secs(),
                rate_limit_rps: default_deepl_rate_limit(),
            },
            TranslationProvider::Google => Self {
                provider_type: "google".to_string(),
                api_key: String::new(),
                endpoint: default_google_endpoint(),
                concurrent_requests: default_concurrent_requests(),
                batch_item_limit: default_batch_item_limit(),
                batch_char_limit: default_batch_char_limit(),
                timeout_secs: default_timeout_secs(),
                rate_limit_rps: default_google_rate_limit(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::DeepL),
                ProviderConfig::new(TranslationProvider::Google),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Configuration block for the selected provider
    pub fn get_provider_config(&self) -> Option<&ProviderConfig> {
        let wanted = self.provider.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == wanted)
    }

    /// API key of the selected provider
    pub fn get_api_key(&self) -> String {
        self.get_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Endpoint of the selected provider
    pub fn get_endpoint(&self) -> String {
        self.get_provider_config()
            .map(|p| p.endpoint.clone())
            .unwrap_or_default()
    }

    /// Request timeout of the selected provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Pipeline options assembled from the selected provider and the
    /// common retry settings
    pub fn job_options(&self) -> JobOptions {
        let provider = self.get_provider_config();
        JobOptions {
            batch_item_limit: provider
                .map(|p| p.batch_item_limit)
                .unwrap_or_else(default_batch_item_limit),
            batch_char_limit: provider
                .map(|p| p.batch_char_limit)
                .unwrap_or_else(default_batch_char_limit),
            max_concurrency: provider
                .map(|p| p.concurrent_requests)
                .unwrap_or_else(default_concurrent_requests),
            retry_count: self.common.retry_count,
            retry_backoff_ms: self.common.retry_backoff_ms,
            max_backoff_ms: self.common.max_backoff_ms,
            rate_limit_rps: provider.and_then(|p| p.rate_limit_rps),
        }
    }
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubling per attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound for a single backoff delay (in milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_batch_item_limit() -> usize {
    50
}

fn default_batch_char_limit() -> usize {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_deepl_endpoint() -> String {
    "https://api-free.deepl.com".to_string()
}

fn default_google_endpoint() -> String {
    "https://translation.googleapis.com".to_string()
}

fn default_deepl_rate_limit() -> Option<f64> {
    // Free-tier accounts are throttled well below this
    Some(5.0)
}

fn default_google_rate_limit() -> Option<f64> {
    Some(10.0)
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: "auto".to_string(),
            target_language: "en".to_string(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file, falling back to the user config directory and
    /// finally to defaults when no file exists
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        if let Some(fallback) = Self::user_config_path() {
            if fallback.exists() {
                return Self::from_file(fallback);
            }
        }

        Ok(Self::default())
    }

    /// Default location in the user's configuration directory
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xlation").join("conf.json"))
    }

    /// Write the configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate language codes, provider selection and limits
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_language_code(&self.source_language)
            .with_context(|| format!("Invalid source language: {}", self.source_language))?;
        language_utils::validate_language_code(&self.target_language)
            .with_context(|| format!("Invalid target language: {}", self.target_language))?;
        if self.target_language.trim().eq_ignore_ascii_case(language_utils::AUTO_DETECT) {
            return Err(anyhow!("Target language cannot be 'auto'"));
        }

        let provider = self
            .translation
            .get_provider_config()
            .ok_or_else(|| {
                anyhow!(
                    "No configuration for selected provider: {}",
                    self.translation.provider
                )
            })?;

        if provider.api_key.trim().is_empty() {
            return Err(anyhow!(
                "API key missing for provider: {}",
                self.translation.provider.display_name()
            ));
        }
        if !provider.endpoint.is_empty() {
            url::Url::parse(&provider.endpoint)
                .with_context(|| format!("Invalid endpoint URL: {}", provider.endpoint))?;
        }
        if provider.batch_char_limit == 0 {
            return Err(anyhow!("batch_char_limit must be greater than 0"));
        }
        if provider.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be greater than 0"));
        }
        if self.translation.common.retry_count == 0 {
            return Err(anyhow!("retry_count must be greater than 0"));
        }

        Ok(())
    }
}
