use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::model::CellValue;

// @module: Cell classification - decides what gets translated

// @const: Date and time patterns that mark a value as numeric-like
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{2,4}$").unwrap(),
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").unwrap(),
        Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?$").unwrap(),
    ]
});

// @const: Digits with number formatting only (thousands separators, percent)
static FORMATTED_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s.,%-]+$").unwrap());

// @const: Patterns for string values that must never be touched
static OPAQUE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Cell references like A1, B2C3
        Regex::new(r"^[A-Z]{1,10}\d+$").unwrap(),
        // Error values like #REF!, #NAME?
        Regex::new(r"^#[A-Z]+[!?]?$").unwrap(),
        // All caps identifier constants
        Regex::new(r"^[A-Z_]{2,}$").unwrap(),
        // Absolute references like $A$1
        Regex::new(r"^\$[A-Z]+\$\d+$").unwrap(),
    ]
});

/// Category assigned to a cell by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Plain text eligible for translation
    Translatable,
    /// A formula, never modified
    Formula,
    /// A numeric or date-like value, never modified
    Numeric,
    /// No content
    Empty,
    /// Content that is neither text nor numeric (booleans, error values,
    /// cell references, identifier constants), never modified
    Opaque,
}

/// Classify a cell value.
///
/// Pure and total: every value maps to exactly one category and the input is
/// never modified. A text payload is Translatable only if it is non-empty
/// after trimming, does not begin with the formula marker, and does not look
/// like a number or date under [`is_numeric_like`].
pub fn classify(value: &CellValue) -> Classification {
    match value {
        CellValue::Empty => Classification::Empty,
        CellValue::Formula(_) => Classification::Formula,
        CellValue::Numeric(_) => Classification::Numeric,
        CellValue::Other(_) => Classification::Opaque,
        CellValue::Text(text) => classify_text(text),
    }
}

fn classify_text(text: &str) -> Classification {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Classification::Empty;
    }

    if trimmed.starts_with('=') {
        return Classification::Formula;
    }

    if is_numeric_like(trimmed) {
        return Classification::Numeric;
    }

    if OPAQUE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return Classification::Opaque;
    }

    Classification::Translatable
}

/// The numeric/date detection rule, applied to a trimmed string.
///
/// A value is numeric-like when any of the following holds:
/// 1. it parses as a floating point number;
/// 2. removing `.`, `,` and `-` leaves only ASCII digits (at least one);
/// 3. it consists only of digits, whitespace and `.`, `,`, `%`, `-`
///    formatting characters (at least one digit);
/// 4. it matches a `D-M-Y` / `Y-M-D` date or `H:MM[:SS]` time pattern.
pub fn is_numeric_like(trimmed: &str) -> bool {
    if trimmed.parse::<f64>().is_ok() {
        return true;
    }

    let stripped: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '.' | ',' | '-'))
        .collect();
    if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }

    if trimmed.chars().any(|c| c.is_ascii_digit()) && FORMATTED_NUMBER_REGEX.is_match(trimmed) {
        return true;
    }

    DATE_PATTERNS.iter().any(|p| p.is_match(trimmed))
}
