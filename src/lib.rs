/*!
 * # xlation - Excel workbook translation
 *
 * A Rust library for translating the text content of spreadsheet documents
 * while leaving everything else untouched.
 *
 * ## Features
 *
 * - Load xlsx/xlsm workbooks into a position-addressable document model
 * - Classify cells so formulas, numbers, dates and constants are never touched
 * - Batch translatable text under item and character budgets
 * - Translate batches concurrently with retry, backoff and rate limiting:
 *   - DeepL REST API v2
 *   - Google Cloud Translation v2
 * - Merge translations back at their exact original positions
 * - Save workbooks with styles, merges, sizing and formulas preserved
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Workbook model and cell classification
 * - `workbook`: xlsx loading and saving
 * - `translation`: The translation pipeline:
 *   - `translation::extract`: Text extraction
 *   - `translation::batch`: Batch packing
 *   - `translation::client`: Network calls with retry and backoff
 *   - `translation::rate_limit`: Shared requests-per-second ceiling
 *   - `translation::merge`: Writing results back
 *   - `translation::pipeline`: The orchestrator
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for translation services:
 *   - `providers::deepl`: DeepL API client
 *   - `providers::google`: Google Cloud Translation client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod workbook;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{classify, CellRef, CellValue, Classification, Document, Sheet};
pub use errors::{AppError, DocumentError, JobError, MergeError, ProviderError};
pub use translation::{
    extract, merge_batch, pack_batches, Batch, CancelToken, JobOptions, JobOutcome, JobRequest,
    Pipeline, Progress, RateLimiter, RetryPolicy, TranslationClient, TranslationUnit,
};
pub use workbook::{load_document, save_document};
