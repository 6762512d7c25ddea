// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::ollama::{OllamaClient, ServiceManager};
use crate::pipeline::TranslationPipeline;
use crate::slicer::TextSlicer;

mod app_config;
mod errors;
mod file_utils;
mod ollama;
mod pipeline;
mod slicer;

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

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a UTF-8 text document (default command)
    Translate(TranslateArgs),

    /// Manage the local Ollama service
    Service {
        #[command(subcommand)]
        action: ServiceCommand,
    },

    /// Generate shell completions for doctrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    /// Start the service and wait until it answers
    Start {
        /// Seconds to wait for the service to come up
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },
    /// Stop the service
    Stop {
        /// Seconds to wait for the stop command to exit
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Restart the service
    Restart {
        /// Seconds to wait for the stop phase
        #[arg(long, default_value_t = 30)]
        stop_timeout: u64,
        /// Seconds to wait for the start phase
        #[arg(long, default_value_t = 60)]
        start_timeout: u64,
    },
    /// Report whether the service answers a probe
    Status,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input UTF-8 text file to translate (txt/html/md/rst/tex/adoc/xml/srt/vtt, ...)
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "settings.json")]
    config_path: String,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language (free-form, e.g. "French")
    #[arg(short, long)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Skip the backend connectivity test before translating
    #[arg(long)]
    skip_connection_test: bool,
}

/// doctrans - Document Translation with a local LLM
///
/// Splits a UTF-8 text document into token-bounded slices, translates each
/// slice with a local Ollama endpoint and reassembles the output next to the
/// input file with a "-translated" suffix.
#[derive(Parser, Debug)]
#[command(name = "doctrans")]
#[command(version = "1.0.0")]
#[command(about = "Translate long documents with a local Ollama endpoint")]
#[command(long_about = "doctrans splits a UTF-8 text document into token-bounded slices, translates
each slice with a local Ollama endpoint, and reassembles the output while
preserving paragraph breaks and blank-line structure.

EXAMPLES:
    doctrans paper.md                         # Translate using settings.json
    doctrans -t French paper.md               # Override the target language
    doctrans -m qwen2.5:14b paper.md          # Override the model
    doctrans --skip-connection-test paper.md  # Skip the startup probe
    doctrans service status                   # Probe the local service
    doctrans completions bash                 # Generate bash completions

CONFIGURATION:
    Settings are read from settings.json by default (override with --config).
    A missing or unparseable file falls back to built-in defaults with a
    warning; a missing file is created so the settings editor can open it.

OUTPUT:
    The translated document is written next to the input file, with
    \"-translated\" appended to the file stem. Progress is reported on stderr
    as \"Translating: <percent>% complete (<done>/<total> slices)\".")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input UTF-8 text file to translate
    #[arg(value_name = "INPUT_FILE")]
    input_file: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "settings.json")]
    config_path: String,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Target language (free-form, e.g. "French")
    #[arg(short, long)]
    target_language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Skip the backend connectivity test before translating
    #[arg(long)]
    skip_connection_test: bool,
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
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} [{}] {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default;
    // the level is updated after the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "doctrans", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Service { action }) => {
            let config = load_config(&cli.config_path, &None)?;
            run_service(action, &config).await
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_file = cli
                .input_file
                .ok_or_else(|| anyhow!("INPUT_FILE is required when no subcommand is specified"))?;

            let translate_args = TranslateArgs {
                input_file,
                config_path: cli.config_path,
                model: cli.model,
                target_language: cli.target_language,
                log_level: cli.log_level,
                skip_connection_test: cli.skip_connection_test,
            };
            run_translate(translate_args).await
        }
    }
}

/// Load the configuration, creating a default file when none exists
fn load_config(config_path: &str, cli_log_level: &Option<CliLogLevel>) -> Result<Config> {
    let config = if Path::new(config_path).exists() {
        Config::load_or_default(config_path)
    } else {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config = Config::default();
        if let Err(e) = config.save(config_path) {
            warn!("Could not write default config: {}", e);
        }
        config
    };

    let mut config = config;
    if let Some(log_level) = cli_log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let mut config = load_config(&options.config_path, &options.log_level)?;

    // Override config with CLI options if provided
    if let Some(model) = &options.model {
        config.ollama.model = model.clone();
    }
    if let Some(target_language) = &options.target_language {
        config.translation.target_language = target_language.clone();
    }
    if options.skip_connection_test {
        config.general.skip_connection_test = true;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let input_file = &options.input_file;
    if !FileManager::file_exists(input_file) {
        return Err(anyhow!("File does not exist: {:?}", input_file));
    }

    let output_path = FileManager::translated_output_path(input_file);

    let client = OllamaClient::new(&config.ollama);

    // Probe the backend before committing to a long run
    if !config.general.skip_connection_test {
        info!("Testing Ollama connection...");
        if !client.test_connection().await {
            return Err(anyhow!(
                "Cannot connect to Ollama service. Please ensure Ollama is running."
            ));
        }
        info!("Ollama connection test passed");
    }

    let text = FileManager::read_to_string(input_file)?;

    let slicer = TextSlicer::new(
        config.translation.target_tokens_per_slice,
        &config.translation.para_separator,
    );
    let pipeline = TranslationPipeline::new(
        client,
        slicer,
        config.translation.resolved_system_prompt(),
    );

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
    let mut writer = BufWriter::new(file);

    pipeline
        .run(&text, &mut writer, |done, total| {
            let percent = if total > 0 { done * 100 / total } else { 0 };
            eprintln!(
                "Translating: {}% complete ({}/{} slices)",
                percent, done, total
            );
        })
        .await?;

    info!("Translated output written to {:?}", output_path);
    Ok(())
}

async fn run_service(action: ServiceCommand, config: &Config) -> Result<()> {
    let client = OllamaClient::new(&config.ollama);
    let manager = ServiceManager::new(&client);

    match action {
        ServiceCommand::Start { timeout } => {
            manager.start(timeout).await?;
        }
        ServiceCommand::Stop { timeout } => {
            manager.stop(timeout).await?;
        }
        ServiceCommand::Restart {
            stop_timeout,
            start_timeout,
        } => {
            manager.restart(stop_timeout, start_timeout).await?;
        }
        ServiceCommand::Status => {
            let status = manager.status().await;
            if status.connectable {
                info!("Ollama service is running and connectable");
            } else {
                warn!("Ollama service is not connectable");
            }
        }
    }

    Ok(())
}
