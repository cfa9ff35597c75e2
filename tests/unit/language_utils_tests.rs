/*!
 * Tests for language code utilities
 */

use xlation::language_utils::{
    get_language_name, language_codes_match, normalize_source_language, validate_language_code,
};

#[test]
fn test_validate_language_code_withIso6391_shouldPass() {
    validate_language_code("en").unwrap();
    validate_language_code("ja").unwrap();
    validate_language_code("VI").unwrap();
    validate_language_code(" fr ").unwrap();
}

#[test]
fn test_validate_language_code_withAuto_shouldPass() {
    validate_language_code("auto").unwrap();
    validate_language_code("AUTO").unwrap();
}

#[test]
fn test_validate_language_code_withGarbage_shouldFail() {
    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("english").is_err());
    assert!(validate_language_code("").is_err());
}

#[test]
fn test_normalize_source_language_shouldMapAutoToNone() {
    assert_eq!(normalize_source_language("auto").unwrap(), None);
    assert_eq!(normalize_source_language("").unwrap(), None);
    assert_eq!(
        normalize_source_language("EN").unwrap(),
        Some("en".to_string())
    );
    assert!(normalize_source_language("nope").is_err());
}

#[test]
fn test_get_language_name_shouldReturnEnglishName() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_language_codes_match_shouldCompareCaseInsensitively() {
    assert!(language_codes_match("en", "EN"));
    assert!(language_codes_match(" fr", "fr "));
    assert!(!language_codes_match("en", "fr"));
}
