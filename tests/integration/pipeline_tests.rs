/*!
 * End-to-end tests for the translation pipeline
 */

use std::sync::{Arc, Mutex};

use xlation::document::model::{CellRef, CellValue};
use xlation::errors::{ErrorCategory, JobError};
use xlation::providers::mock::MockTranslator;
use xlation::translation::client::{RetryPolicy, TranslationClient};
use xlation::translation::pipeline::{
    CancelToken, JobOptions, JobOutcome, JobRequest, Pipeline, Progress,
};
use xlation::translation::rate_limit::RateLimiter;

use crate::common;

fn test_options() -> JobOptions {
    JobOptions {
        batch_item_limit: 50,
        batch_char_limit: 5000,
        max_concurrency: 4,
        retry_count: 3,
        retry_backoff_ms: 1,
        max_backoff_ms: 10,
        rate_limit_rps: None,
    }
}

fn pipeline_with(mock: &MockTranslator, options: &JobOptions) -> Pipeline {
    let client = TranslationClient::new(
        Arc::new(mock.clone()),
        RetryPolicy::new(options.retry_count, options.retry_backoff_ms, options.max_backoff_ms),
        Arc::new(RateLimiter::from_config(options.rate_limit_rps)),
    );
    Pipeline::new(client)
}

fn request(options: JobOptions) -> JobRequest {
    JobRequest::new(Some("en".to_string()), "fr", options)
}

fn progress_recorder() -> (Arc<Mutex<Vec<Progress>>>, impl Fn(Progress)) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |p| sink.lock().unwrap().push(p))
}

/// Echo translation leaves the document textually identical
#[tokio::test]
async fn test_pipeline_withEchoTranslation_shouldRoundTrip() {
    let mut document = common::mixed_document();
    let before = common::snapshot(&document);

    let mock = MockTranslator::echo();
    let pipeline = pipeline_with(&mock, &test_options());
    let (_, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Completed(stats) => {
            assert_eq!(stats.units, 5);
            assert_eq!(stats.batches, 1);
        }
        other => panic!("expected Completed, got {:?}", other),
    }
    assert_eq!(common::snapshot(&document), before);
}

/// The acceptance scenario: one translatable cell among a formula and a
/// number; only the text cell changes
#[tokio::test]
async fn test_pipeline_withThreeSheetScenario_shouldTranslateSingleCell() {
    let mut document = common::three_sheet_document();

    let mock = MockTranslator::working();
    let pipeline = pipeline_with(&mock, &test_options());
    let (_, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Completed(stats) => assert_eq!(stats.units, 1),
        other => panic!("expected Completed, got {:?}", other),
    }

    assert_eq!(
        document.cell(CellRef::new(0, 1, 1)),
        Some(&CellValue::Text("[fr] Hello".to_string()))
    );
    assert_eq!(
        document.cell(CellRef::new(0, 2, 1)),
        Some(&CellValue::Formula("=SUM(B1:B2)".to_string()))
    );
    assert_eq!(
        document.cell(CellRef::new(0, 3, 1)),
        Some(&CellValue::Numeric("42".to_string()))
    );
}

/// Transient failures below the retry budget do not fail the job
#[tokio::test]
async fn test_pipeline_withRecoverableFailures_shouldComplete() {
    let mut document = common::document_with_texts(&["Hello", "World"]);

    let mock = MockTranslator::fail_times(2);
    let pipeline = pipeline_with(&mock, &test_options());
    let (_, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    assert!(matches!(outcome, JobOutcome::Completed(_)));
    assert_eq!(mock.request_count(), 3);
    assert_eq!(
        document.cell(CellRef::new(0, 1, 1)),
        Some(&CellValue::Text("[fr] Hello".to_string()))
    );
    assert_eq!(
        document.cell(CellRef::new(0, 2, 1)),
        Some(&CellValue::Text("[fr] World".to_string()))
    );
}

/// An authentication failure terminates the job and the document is
/// bit-for-bit unchanged
#[tokio::test]
async fn test_pipeline_withAuthFailure_shouldFailAndLeaveDocumentUntouched() {
    let mut document = common::mixed_document();
    let before = common::snapshot(&document);

    let mock = MockTranslator::auth_failure();
    let pipeline = pipeline_with(&mock, &test_options());
    let (events, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Failed(e) => {
            assert_eq!(e.category(), ErrorCategory::Authentication);
            assert!(matches!(e, JobError::Provider(_)));
        }
        other => panic!("expected Failed, got {:?}", other),
    }

    // One call, no retries, no merge
    assert_eq!(mock.request_count(), 1);
    assert_eq!(common::snapshot(&document), before);

    // No merge progress was reported, only the initial (0, total) event
    let events = events.lock().unwrap();
    assert!(events.iter().all(|p| p.batches_completed == 0));
}

/// Exhausted transient retries fail the job without modifying the document
#[tokio::test]
async fn test_pipeline_withPersistentOutage_shouldFailWithNetworkCategory() {
    let mut document = common::document_with_texts(&["Hello"]);
    let before = common::snapshot(&document);

    let mock = MockTranslator::always_failing();
    let pipeline = pipeline_with(&mock, &test_options());
    let (_, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Failed(e) => assert_eq!(e.category(), ErrorCategory::Network),
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(mock.request_count(), 3);
    assert_eq!(common::snapshot(&document), before);
}

/// The batching scenario: 250 ten-character cells with a 50-item limit
/// produce five batches, and progress is reported after each merge in order
#[tokio::test]
async fn test_pipeline_with250Cells_shouldEmitFiveBatchesAndOrderedProgress() {
    let texts: Vec<String> = (0..250).map(|i| format!("text-{:05}", i)).collect();
    let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
    let mut document = common::document_with_texts(&refs);

    let mock = MockTranslator::working();
    let pipeline = pipeline_with(&mock, &test_options());
    let (events, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Completed(stats) => {
            assert_eq!(stats.units, 250);
            assert_eq!(stats.batches, 5);
        }
        other => panic!("expected Completed, got {:?}", other),
    }

    let events = events.lock().unwrap();
    let merged: Vec<usize> = events
        .iter()
        .filter(|p| p.batches_completed > 0)
        .map(|p| p.batches_completed)
        .collect();
    assert_eq!(merged, vec![1, 2, 3, 4, 5]);
    assert!(events.iter().all(|p| p.batches_total == 5));

    // Every cell was translated in place
    for (i, original) in texts.iter().enumerate() {
        assert_eq!(
            document.cell(CellRef::new(0, i as u32 + 1, 1)),
            Some(&CellValue::Text(format!("[fr] {}", original)))
        );
    }
}

/// A cell exceeding the character budget gets a batch of its own and is
/// still translated
#[tokio::test]
async fn test_pipeline_withOversizedCell_shouldIsolateItInSingletonBatch() {
    let oversized = "x".repeat(6000);
    let mut document = common::document_with_texts(&["short one", &oversized, "short two"]);

    let mock = MockTranslator::working();
    let pipeline = pipeline_with(&mock, &test_options());
    let (_, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Completed(stats) => {
            assert_eq!(stats.batches, 3);
            assert_eq!(stats.warnings.len(), 1);
        }
        other => panic!("expected Completed, got {:?}", other),
    }
    assert_eq!(
        document.cell(CellRef::new(0, 2, 1)),
        Some(&CellValue::Text(format!("[fr] {}", oversized)))
    );
}

/// A cancellation observed before dispatch yields Cancelled and no
/// provider calls
#[tokio::test]
async fn test_pipeline_withPreCancelledToken_shouldSkipAllWork() {
    let mut document = common::document_with_texts(&["Hello"]);
    let before = common::snapshot(&document);

    let mock = MockTranslator::working();
    let pipeline = pipeline_with(&mock, &test_options());
    let (_, on_progress) = progress_recorder();

    let cancel = CancelToken::new();
    cancel.cancel();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &cancel)
        .await;

    assert!(matches!(outcome, JobOutcome::Cancelled));
    assert_eq!(mock.request_count(), 0);
    assert_eq!(common::snapshot(&document), before);
}

/// A document with nothing to translate completes immediately with an
/// empty progress report
#[tokio::test]
async fn test_pipeline_withNoTranslatableCells_shouldShortCircuit() {
    let mut document = common::document_with_texts(&[]);

    let mock = MockTranslator::working();
    let pipeline = pipeline_with(&mock, &test_options());
    let (events, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(test_options()), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Completed(stats) => {
            assert_eq!(stats.units, 0);
            assert_eq!(stats.batches, 0);
        }
        other => panic!("expected Completed, got {:?}", other),
    }
    assert_eq!(mock.request_count(), 0);

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![Progress {
            batches_completed: 0,
            batches_total: 0
        }]
    );
}

/// Concurrent workers never change the final placement: with many small
/// batches and parallel dispatch, every translation lands at its address
#[tokio::test]
async fn test_pipeline_withConcurrentBatches_shouldMergeDeterministically() {
    let texts: Vec<String> = (0..40).map(|i| format!("row {}", i)).collect();
    let refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
    let mut document = common::document_with_texts(&refs);

    let mut options = test_options();
    options.batch_item_limit = 4;
    options.max_concurrency = 8;

    let mock = MockTranslator::working();
    let pipeline = pipeline_with(&mock, &options);
    let (_, on_progress) = progress_recorder();

    let outcome = pipeline
        .run(&mut document, &request(options), on_progress, &CancelToken::new())
        .await;

    match outcome {
        JobOutcome::Completed(stats) => assert_eq!(stats.batches, 10),
        other => panic!("expected Completed, got {:?}", other),
    }
    for (i, original) in texts.iter().enumerate() {
        assert_eq!(
            document.cell(CellRef::new(0, i as u32 + 1, 1)),
            Some(&CellValue::Text(format!("[fr] {}", original)))
        );
    }
}
