/*!
 * The translation pipeline.
 *
 * Modules, in pipeline order:
 * - `extract`: walk the document and collect translatable text
 * - `batch`: pack extracted units into bounded request batches
 * - `rate_limit`: token bucket shared by all in-flight requests
 * - `client`: one network call per batch, with retry and backoff
 * - `merge`: write translated strings back at their recorded addresses
 * - `pipeline`: the orchestrator sequencing all of the above
 */

pub mod batch;
pub mod client;
pub mod extract;
pub mod merge;
pub mod pipeline;
pub mod rate_limit;

pub use batch::{pack_batches, Batch};
pub use client::{RetryPolicy, TranslationClient};
pub use extract::{extract, TranslationUnit};
pub use merge::merge_batch;
pub use pipeline::{CancelToken, JobOptions, JobOutcome, JobRequest, Pipeline, Progress};
pub use rate_limit::RateLimiter;
