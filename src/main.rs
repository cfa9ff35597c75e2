// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use crate::app_config::{Config, TranslationProvider};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod document;
mod errors;
mod file_utils;
mod language_utils;
mod providers;
mod translation;
mod workbook;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    DeepL,
    Google,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::DeepL => TranslationProvider::DeepL,
            CliTranslationProvider::Google => TranslationProvider::Google,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate workbook text using a translation provider (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Generate shell completions for xlation
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input workbook file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code (e.g. 'en', 'ja'), or 'auto' for detection
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'en', 'fr', 'vi')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// List per-sheet cell counts without translating
    #[arg(short, long)]
    inspect: bool,

    /// Verify provider connectivity and credentials, then exit
    #[arg(long)]
    check: bool,
}

/// xlation - workbook translation from the command line
///
/// Translates the text cells of Excel workbooks while preserving formulas,
/// numbers, styles and layout.
#[derive(Parser, Debug)]
#[command(name = "xlation")]
#[command(version = "1.0.0")]
#[command(about = "Excel workbook translation tool")]
#[command(long_about = "xlation translates the text content of Excel workbooks using DeepL or \
Google Translate, leaving formulas, numeric values, styles, merges and sizing untouched.

EXAMPLES:
    xlation report.xlsx                        # Translate using default config
    xlation -f report.xlsx                     # Force overwrite existing output
    xlation -p deepl -t fr report.xlsx         # Translate to French with DeepL
    xlation -s ja -t en report.xlsx            # Japanese to English
    xlation -i report.xlsx                     # Show sheet statistics only
    xlation --check report.xlsx                # Verify API credentials
    xlation --log-level debug /spreadsheets/   # Process a whole directory
    xlation completions bash > xlation.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If no config file exists, a default one is
    used and provider credentials must come from it.

SUPPORTED PROVIDERS:
    deepl  - DeepL REST API v2 (requires API key)
    google - Google Cloud Translation v2 (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input workbook file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output directory (defaults to the input file's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Source language code (e.g. 'en', 'ja'), or 'auto' for detection
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'en', 'fr', 'vi')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// List per-sheet cell counts without translating
    #[arg(short, long)]
    inspect: bool,

    /// Verify provider connectivity and credentials, then exit
    #[arg(long)]
    check: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "xlation", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args directly
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_path,
                output_dir: cli.output_dir,
                force_overwrite: cli.force_overwrite,
                provider: cli.provider,
                source_language: cli.source_language,
                target_language: cli.target_language,
                config_path: cli.config_path,
                log_level: cli.log_level,
                inspect: cli.inspect,
                check: cli.check,
            };
            run_translate(translate_args).await
        }
    }
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut config = Config::load_or_default(&args.config_path)?;

    // CLI flags override the config file
    if let Some(provider) = args.provider {
        config.translation.provider = provider.into();
    }
    if let Some(source) = args.source_language {
        config.source_language = source;
    }
    if let Some(target) = args.target_language {
        config.target_language = target;
    }
    if let Some(level) = args.log_level {
        config.log_level = level.into();
    }

    let level = match config.log_level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    };
    log::set_max_level(level);

    let controller = Controller::with_config(config.clone())?;

    // Inspection needs no credentials
    if args.inspect {
        return controller.inspect(&args.input_path);
    }

    config.validate()?;

    if args.check {
        return controller.check_connection().await;
    }

    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => {
            if args.input_path.is_dir() {
                args.input_path.clone()
            } else {
                args.input_path
                    .parent()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."))
            }
        }
    };

    controller
        .run(args.input_path, output_dir, args.force_overwrite)
        .await
}
