use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio::sync::Semaphore;
use uuid::Uuid;

use super::batch::{optimal_batch_size, pack_batches};
use super::client::TranslationClient;
use super::extract::extract;
use super::merge::merge_batch;
use crate::document::model::Document;
use crate::errors::{JobError, ProviderError};

// @module: Pipeline orchestrator - extract, batch, translate, merge

/// Cooperative cancellation flag, observed at suspension points.
///
/// Cancellation never aborts an in-flight network call; the call finishes
/// and its result is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Progress snapshot emitted after each merged batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Batches merged so far
    pub batches_completed: usize,
    /// Total batches in this job
    pub batches_total: usize,
}

/// Per-job tuning knobs, supplied by the configuration layer
#[derive(Debug, Clone)]
pub struct JobOptions {
    /// Maximum units per batch; 0 picks a size from corpus characteristics
    pub batch_item_limit: usize,
    /// Maximum combined characters per batch
    pub batch_char_limit: usize,
    /// Maximum batches translated concurrently
    pub max_concurrency: usize,
    /// Attempts per batch, including the first
    pub retry_count: u32,
    /// Base backoff in milliseconds, doubling per attempt
    pub retry_backoff_ms: u64,
    /// Cap on a single backoff delay in milliseconds
    pub max_backoff_ms: u64,
    /// Requests-per-second ceiling shared by all workers; None disables
    pub rate_limit_rps: Option<f64>,
}

impl Default for JobOptions {
    fn default() -> Self {
        JobOptions {
            batch_item_limit: 50,
            batch_char_limit: 5000,
            max_concurrency: 4,
            retry_count: 3,
            retry_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            rate_limit_rps: Some(5.0),
        }
    }
}

/// One end-to-end translation run over a document
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Unique id for logs and reports
    pub job_id: Uuid,
    /// Source language code, None for provider auto-detection
    pub source_language: Option<String>,
    /// Target language code
    pub target_language: String,
    /// Tuning knobs
    pub options: JobOptions,
}

impl JobRequest {
    /// Create a request with a fresh job id
    pub fn new(
        source_language: Option<String>,
        target_language: impl Into<String>,
        options: JobOptions,
    ) -> Self {
        JobRequest {
            job_id: Uuid::new_v4(),
            source_language,
            target_language: target_language.into(),
            options,
        }
    }
}

/// Summary of a completed job
#[derive(Debug, Clone, Default)]
pub struct JobStats {
    /// Translation units extracted
    pub units: usize,
    /// Batches dispatched
    pub batches: usize,
    /// Total source characters submitted
    pub characters: usize,
    /// Wall-clock duration of the job
    pub duration: Duration,
    /// Non-fatal anomalies observed during the run
    pub warnings: Vec<String>,
}

/// Terminal result of a job
#[derive(Debug)]
pub enum JobOutcome {
    /// All batches translated and merged; the document is fully translated
    Completed(JobStats),
    /// Cancellation observed; the document was not saved-worthy and any
    /// in-flight results were discarded
    Cancelled,
    /// A batch failed fatally or exhausted retries; the document is
    /// unmodified (merging never started) unless the merge itself failed
    Failed(JobError),
}

/// Orchestrator states, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Idle,
    Extracting,
    Batching,
    Translating,
    Merging,
    Completed,
    Cancelled,
    Failed,
}

/// Sequences extraction, batching, translation and merging for one job
pub struct Pipeline {
    client: TranslationClient,
}

impl Pipeline {
    /// Create a pipeline over a translation client
    pub fn new(client: TranslationClient) -> Self {
        Pipeline { client }
    }

    /// Run one job against the document.
    ///
    /// Batches are translated concurrently under the configured bound, but
    /// merging is applied strictly in original batch order once every batch
    /// has returned, so the final document does not depend on network
    /// completion order. On failure the document is left unmodified; on
    /// cancellation in-flight calls finish and their results are discarded.
    pub async fn run(
        &self,
        document: &mut Document,
        request: &JobRequest,
        progress: impl Fn(Progress),
        cancel: &CancelToken,
    ) -> JobOutcome {
        let started = Instant::now();
        let mut state = PipelineState::Idle;
        let job_id = request.job_id;

        // Extracting
        advance(job_id, &mut state, PipelineState::Extracting);
        if cancel.is_cancelled() {
            advance(job_id, &mut state, PipelineState::Cancelled);
            return JobOutcome::Cancelled;
        }
        let units = extract(document);
        if units.is_empty() {
            info!("Job {}: no translatable cells, nothing to do", job_id);
            progress(Progress {
                batches_completed: 0,
                batches_total: 0,
            });
            advance(job_id, &mut state, PipelineState::Completed);
            return JobOutcome::Completed(JobStats {
                duration: started.elapsed(),
                ..JobStats::default()
            });
        }

        // Batching
        advance(job_id, &mut state, PipelineState::Batching);
        if cancel.is_cancelled() {
            advance(job_id, &mut state, PipelineState::Cancelled);
            return JobOutcome::Cancelled;
        }
        let unit_count = units.len();
        let characters: usize = units.iter().map(|u| u.char_len()).sum();
        let item_limit = if request.options.batch_item_limit == 0 {
            let avg = characters as f64 / unit_count as f64;
            let auto = optimal_batch_size(unit_count, avg);
            debug!("Job {}: auto batch size {} for {} units", job_id, auto, unit_count);
            auto
        } else {
            request.options.batch_item_limit
        };
        let batches = pack_batches(units, item_limit, request.options.batch_char_limit);
        let total_batches = batches.len();

        let mut warnings: Vec<String> = batches
            .iter()
            .filter(|b| b.char_total() > request.options.batch_char_limit)
            .map(|b| {
                format!(
                    "Batch {} exceeds the character budget on its own ({} chars)",
                    b.index + 1,
                    b.char_total()
                )
            })
            .collect();

        info!(
            "Job {}: {} units in {} batches ({} chars total)",
            job_id, unit_count, total_batches, characters
        );
        progress(Progress {
            batches_completed: 0,
            batches_total: total_batches,
        });

        // Translating
        advance(job_id, &mut state, PipelineState::Translating);
        let semaphore = Arc::new(Semaphore::new(request.options.max_concurrency.max(1)));
        // Raised by the first fatal batch so queued batches stop dispatching
        let abort = CancelToken::new();

        let results = stream::iter(batches.iter())
            .map(|batch| {
                let client = self.client.clone();
                let semaphore = Arc::clone(&semaphore);
                let cancel = cancel.clone();
                let abort = abort.clone();
                let source = request.source_language.clone();
                let target = request.target_language.clone();

                async move {
                    let _permit = semaphore.acquire().await.unwrap();

                    // Observed before dispatching each batch
                    if cancel.is_cancelled() || abort.is_cancelled() {
                        return (batch.index, None);
                    }

                    let result = client
                        .translate_batch(batch, source.as_deref(), &target)
                        .await;
                    if result.is_err() {
                        abort.cancel();
                    }
                    (batch.index, Some(result))
                }
            })
            .buffer_unordered(request.options.max_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        if cancel.is_cancelled() {
            advance(job_id, &mut state, PipelineState::Cancelled);
            return JobOutcome::Cancelled;
        }

        // Reorder by batch index; completion order is not deterministic
        let mut sorted = results;
        sorted.sort_by_key(|(index, _)| *index);

        let mut translated: Vec<Vec<String>> = Vec::with_capacity(total_batches);
        let mut first_error: Option<(usize, ProviderError)> = None;
        for (index, result) in sorted {
            match result {
                Some(Ok(strings)) => translated.push(strings),
                Some(Err(e)) => {
                    if first_error.is_none() {
                        first_error = Some((index, e));
                    }
                }
                // Skipped after another batch raised the abort flag
                None => {}
            }
        }

        if let Some((index, e)) = first_error {
            warn!("Job {}: batch {} failed fatally: {}", job_id, index + 1, e);
            advance(job_id, &mut state, PipelineState::Failed);
            return JobOutcome::Failed(JobError::Provider(e));
        }
        if translated.len() != total_batches {
            advance(job_id, &mut state, PipelineState::Failed);
            return JobOutcome::Failed(JobError::Provider(ProviderError::RequestFailed(
                format!(
                    "{} of {} batches were never dispatched",
                    total_batches - translated.len(),
                    total_batches
                ),
            )));
        }

        // Merging - no suspension points from here on, so cancellation is
        // only observed before the phase starts
        if cancel.is_cancelled() {
            advance(job_id, &mut state, PipelineState::Cancelled);
            return JobOutcome::Cancelled;
        }
        advance(job_id, &mut state, PipelineState::Merging);
        for (batch, strings) in batches.iter().zip(&translated) {
            if let Err(e) = merge_batch(document, batch, strings) {
                warn!("Job {}: merge aborted: {}", job_id, e);
                warnings.push(format!("merge aborted at batch {}", batch.index + 1));
                advance(job_id, &mut state, PipelineState::Failed);
                return JobOutcome::Failed(JobError::Merge(e));
            }
            progress(Progress {
                batches_completed: batch.index + 1,
                batches_total: total_batches,
            });
        }

        advance(job_id, &mut state, PipelineState::Completed);
        JobOutcome::Completed(JobStats {
            units: unit_count,
            batches: total_batches,
            characters,
            duration: started.elapsed(),
            warnings,
        })
    }
}

fn advance(job_id: Uuid, state: &mut PipelineState, next: PipelineState) {
    debug!("Job {}: {:?} -> {:?}", job_id, *state, next);
    *state = next;
}
