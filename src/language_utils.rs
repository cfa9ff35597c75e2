use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and describing the
/// ISO 639-1 (2-letter) codes the translation providers work with.
/// The special value `auto` asks the provider to detect the source language.

/// Code accepted in place of a source language to request auto-detection
pub const AUTO_DETECT: &str = "auto";

/// Validate a language code as ISO 639-1, or `auto`
pub fn validate_language_code(code: &str) -> Result<()> {
    let normalized = code.trim().to_lowercase();

    if normalized == AUTO_DETECT {
        return Ok(());
    }
    if normalized.len() == 2 && Language::from_639_1(&normalized).is_some() {
        return Ok(());
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a code to lowercase ISO 639-1, mapping `auto` to None
pub fn normalize_source_language(code: &str) -> Result<Option<String>> {
    let normalized = code.trim().to_lowercase();
    if normalized.is_empty() || normalized == AUTO_DETECT {
        return Ok(None);
    }
    validate_language_code(&normalized)?;
    Ok(Some(normalized))
}

/// English display name for a language code (e.g. `fr` -> `French`)
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();
    Language::from_639_1(&normalized)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Unknown language code: {}", code))
}

/// Whether two codes refer to the same language
pub fn language_codes_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a == b {
        return true;
    }
    match (Language::from_639_1(&a), Language::from_639_1(&b)) {
        (Some(la), Some(lb)) => la == lb,
        _ => false,
    }
}
