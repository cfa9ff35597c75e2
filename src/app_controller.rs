use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, TranslationProvider};
use crate::errors::ErrorCategory;
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::deepl::DeepL;
use crate::providers::google::GoogleTranslate;
use crate::providers::TranslationApi;
use crate::translation::client::{RetryPolicy, TranslationClient};
use crate::translation::pipeline::{CancelToken, JobOutcome, JobRequest, Pipeline};
use crate::translation::rate_limit::RateLimiter;
use crate::workbook;

// @module: Application controller for workbook translation

/// Main application controller for workbook translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    /// Run the main workflow for a file or a directory of workbooks
    pub async fn run(&self, input_path: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        if input_path.is_dir() {
            self.run_folder(input_path, output_dir, force_overwrite).await
        } else {
            let multi_progress = MultiProgress::new();
            self.run_file(input_path, output_dir, &multi_progress, force_overwrite)
                .await
        }
    }

    /// Translate every workbook found under a directory
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: PathBuf,
        force_overwrite: bool,
    ) -> Result<()> {
        let files =
            FileManager::find_workbook_files(&input_dir, &self.config.target_language)?;
        if files.is_empty() {
            warn!("No workbook files found under {:?}", input_dir);
            return Ok(());
        }

        info!("Found {} workbook file(s) to process", files.len());
        let multi_progress = MultiProgress::new();
        let mut failures = 0usize;

        for file in files {
            if let Err(e) = self
                .run_file(file.clone(), output_dir.clone(), &multi_progress, force_overwrite)
                .await
            {
                error!("Failed to process {:?}: {}", file, e);
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(anyhow!("{} file(s) failed to translate", failures));
        }
        Ok(())
    }

    /// Translate one workbook with progress reporting
    async fn run_file(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        FileManager::ensure_dir(&output_dir)?;

        let output_path = FileManager::generate_output_path(
            &input_file,
            &output_dir,
            &self.config.target_language,
        );
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(());
        }

        // Load the workbook into the document model
        let mut document = workbook::load_document(&input_file)
            .with_context(|| format!("Failed to load workbook: {:?}", input_file))?;

        for summary in workbook::sheet_summaries(&document) {
            debug!(
                "Sheet '{}': {}/{} translatable cells ({} x {})",
                summary.name,
                summary.translatable_cells,
                summary.populated_cells,
                summary.max_row,
                summary.max_col
            );
        }

        // Assemble client and pipeline from configuration
        let source_language =
            language_utils::normalize_source_language(&self.config.source_language)?;
        let client = self.build_client()?;
        let request = JobRequest::new(
            source_language,
            self.config.target_language.clone(),
            self.config.translation.job_options(),
        );
        let pipeline = Pipeline::new(client);

        // Cooperative cancellation on Ctrl-C
        let cancel = CancelToken::new();
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Cancellation requested, letting in-flight requests finish");
                signal_token.cancel();
            }
        });

        // Progress bar for batch completion
        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        info!(
            "🌐 xlation: {} → {} via {}",
            self.config.source_language,
            self.config.target_language,
            self.config.translation.provider.display_name()
        );
        progress_bar.set_message("Translating");

        let pb = progress_bar.clone();
        let outcome = pipeline
            .run(
                &mut document,
                &request,
                move |progress| {
                    pb.set_length(progress.batches_total as u64);
                    pb.set_position(progress.batches_completed as u64);
                },
                &cancel,
            )
            .await;

        progress_bar.finish_and_clear();

        match outcome {
            JobOutcome::Completed(stats) => {
                workbook::save_document(&document, &output_path)
                    .with_context(|| format!("Failed to save workbook: {:?}", output_path))?;

                if !stats.warnings.is_empty() {
                    info!(
                        "Translation completed with {} warning(s).",
                        stats.warnings.len()
                    );
                    self.write_issues_log(&output_dir, &request, &stats.warnings)?;
                }

                let elapsed = start_time.elapsed();
                info!(
                    "Translated {} cells in {} batches. Total: {} - Translation: {}",
                    stats.units,
                    stats.batches,
                    Self::format_duration(elapsed),
                    Self::format_duration(stats.duration)
                );
                info!("Output written to {:?}", output_path);
                Ok(())
            }
            JobOutcome::Cancelled => {
                warn!("Job cancelled; {:?} was left untouched", input_file);
                Ok(())
            }
            JobOutcome::Failed(e) => {
                let category = e.category();
                error!("Translation failed ({}): {}", category, e);
                match category {
                    ErrorCategory::Authentication => {
                        error!("Check the API key for {} in the config file",
                            self.config.translation.provider.display_name());
                    }
                    ErrorCategory::Quota => {
                        error!("The provider's translation quota is exhausted; try later or upgrade the plan");
                    }
                    ErrorCategory::Network => {
                        error!("The source workbook was not modified; re-running the job is safe");
                    }
                    ErrorCategory::Internal => {}
                }
                Err(anyhow!("Translation job failed: {}", e))
            }
        }
    }

    /// Print per-sheet content counts without translating
    pub fn inspect(&self, input_file: &Path) -> Result<()> {
        let document = workbook::load_document(input_file)
            .with_context(|| format!("Failed to load workbook: {:?}", input_file))?;

        info!("Workbook: {:?}", input_file);
        for summary in workbook::sheet_summaries(&document) {
            info!(
                "  {}: {} populated cells, {} translatable, grid {}x{}",
                summary.name,
                summary.populated_cells,
                summary.translatable_cells,
                summary.max_row,
                summary.max_col
            );
        }
        Ok(())
    }

    /// Verify provider connectivity and credentials
    pub async fn check_connection(&self) -> Result<()> {
        let client = self.build_client()?;
        info!("Checking connection to {}...", client.provider_name());
        client
            .test_connection()
            .await
            .map_err(|e| anyhow!("Connection check failed: {}", e))?;
        info!("Connection OK");

        // DeepL also reports account usage, worth surfacing here
        if self.config.translation.provider == TranslationProvider::DeepL {
            let translation = &self.config.translation;
            let deepl = DeepL::new(
                translation.get_api_key(),
                translation.get_endpoint(),
                translation.get_timeout_secs(),
            );
            if let Ok(usage) = deepl.usage().await {
                info!(
                    "DeepL usage: {}/{} characters",
                    usage.character_count, usage.character_limit
                );
            }
        }
        Ok(())
    }

    /// Build the translation client from the configured provider
    fn build_client(&self) -> Result<TranslationClient> {
        let translation = &self.config.translation;
        let provider_config = translation
            .get_provider_config()
            .ok_or_else(|| anyhow!("No configuration for provider: {}", translation.provider))?;

        let api: Arc<dyn TranslationApi> = match translation.provider {
            TranslationProvider::DeepL => Arc::new(DeepL::new(
                provider_config.api_key.clone(),
                provider_config.endpoint.clone(),
                provider_config.timeout_secs,
            )),
            TranslationProvider::Google => Arc::new(GoogleTranslate::new(
                provider_config.api_key.clone(),
                provider_config.endpoint.clone(),
                provider_config.timeout_secs,
            )),
        };

        let retry = RetryPolicy::new(
            translation.common.retry_count,
            translation.common.retry_backoff_ms,
            translation.common.max_backoff_ms,
        );
        let limiter = Arc::new(RateLimiter::from_config(provider_config.rate_limit_rps));

        Ok(TranslationClient::new(api, retry, limiter))
    }

    /// Append job warnings to the issues log next to the output files
    fn write_issues_log(
        &self,
        output_dir: &Path,
        request: &JobRequest,
        warnings: &[String],
    ) -> Result<()> {
        let log_path = output_dir.join("xlation.issues.log");
        let mut lines = vec![format!(
            "=== Job {} - {} - {} ===",
            request.job_id,
            self.config.translation.provider.display_name(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )];
        lines.extend(warnings.iter().cloned());

        if let Err(e) = FileManager::append_lines(&log_path, &lines) {
            warn!("Failed to write issues log: {}", e);
        }
        Ok(())
    }

    /// Format a duration as a human readable string
    fn format_duration(duration: std::time::Duration) -> String {
        let total_secs = duration.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        if minutes > 0 {
            format!("{}m {:02}s", minutes, seconds)
        } else {
            format!("{}.{:01}s", seconds, duration.subsec_millis() / 100)
        }
    }
}
