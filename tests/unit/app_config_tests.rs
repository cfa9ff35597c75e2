/*!
 * Tests for configuration loading and validation
 */

use xlation::app_config::{Config, ProviderConfig, TranslationProvider};

fn config_with_key(provider: TranslationProvider, api_key: &str) -> Config {
    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.translation.provider = provider;
    for p in &mut config.translation.available_providers {
        p.api_key = api_key.to_string();
    }
    config
}

#[test]
fn test_default_config_shouldSelectDeepL() {
    let config = Config::default();
    assert_eq!(config.translation.provider, TranslationProvider::DeepL);
    assert_eq!(config.source_language, "auto");
    assert_eq!(config.translation.available_providers.len(), 2);
}

#[test]
fn test_get_provider_config_shouldResolveSelectedProvider() {
    let config = config_with_key(TranslationProvider::Google, "g-key");
    let provider = config.translation.get_provider_config().unwrap();
    assert_eq!(provider.provider_type, "google");
    assert_eq!(config.translation.get_api_key(), "g-key");
}

#[test]
fn test_validate_withMissingApiKey_shouldFail() {
    let mut config = Config::default();
    config.target_language = "fr".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withApiKey_shouldPass() {
    let config = config_with_key(TranslationProvider::DeepL, "key");
    config.validate().unwrap();
}

#[test]
fn test_validate_withBadLanguage_shouldFail() {
    let mut config = config_with_key(TranslationProvider::DeepL, "key");
    config.target_language = "xx".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withAutoTarget_shouldFail() {
    let mut config = config_with_key(TranslationProvider::DeepL, "key");
    config.target_language = "auto".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_provider_from_str_shouldAcceptKnownNames() {
    assert_eq!(
        "deepl".parse::<TranslationProvider>().unwrap(),
        TranslationProvider::DeepL
    );
    assert_eq!(
        "Google".parse::<TranslationProvider>().unwrap(),
        TranslationProvider::Google
    );
    assert!("bing".parse::<TranslationProvider>().is_err());
}

#[test]
fn test_job_options_shouldComeFromSelectedProvider() {
    let mut config = config_with_key(TranslationProvider::DeepL, "key");
    if let Some(p) = config
        .translation
        .available_providers
        .iter_mut()
        .find(|p| p.provider_type == "deepl")
    {
        p.batch_item_limit = 25;
        p.batch_char_limit = 2000;
        p.concurrent_requests = 2;
        p.rate_limit_rps = Some(3.0);
    }
    config.translation.common.retry_count = 5;

    let options = config.translation.job_options();
    assert_eq!(options.batch_item_limit, 25);
    assert_eq!(options.batch_char_limit, 2000);
    assert_eq!(options.max_concurrency, 2);
    assert_eq!(options.retry_count, 5);
    assert_eq!(options.rate_limit_rps, Some(3.0));
}

#[test]
fn test_config_json_roundtrip_shouldPreserveFields() {
    let config = config_with_key(TranslationProvider::Google, "secret");
    let json = serde_json::to_string(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.translation.provider, TranslationProvider::Google);
    assert_eq!(parsed.translation.get_api_key(), "secret");
    assert_eq!(parsed.target_language, "fr");
}

#[test]
fn test_config_json_withPartialProvider_shouldFillDefaults() {
    let json = r#"{
        "source_language": "ja",
        "target_language": "en",
        "translation": {
            "provider": "deepl",
            "available_providers": [
                { "type": "deepl", "api_key": "k" }
            ]
        }
    }"#;
    let parsed: Config = serde_json::from_str(json).unwrap();
    let provider: &ProviderConfig = parsed.translation.get_provider_config().unwrap();

    assert_eq!(provider.api_key, "k");
    assert_eq!(provider.batch_item_limit, 50);
    assert_eq!(provider.batch_char_limit, 5000);
    assert_eq!(provider.concurrent_requests, 4);
    parsed.validate().unwrap();
}
