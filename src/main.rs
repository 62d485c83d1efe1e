// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use subtran::app_config::{Config, LogLevel};
use subtran::app_controller::Controller;
use subtran::errors::AppError;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for subtran
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subtran - line-by-line subtitle translation with a local LLM
///
/// Translates SRT and SSA/ASS subtitles one caption at a time through an
/// Ollama model, keeping every timestamp untouched.
#[derive(Parser, Debug)]
#[command(name = "subtran")]
#[command(version)]
#[command(about = "Subtitle translation with a local Ollama model")]
#[command(subcommand_negates_reqs = true)]
#[command(long_about = "subtran translates subtitle files caption by caption using an Ollama model.

EXAMPLES:
    subtran -s=movie.srt                               # English to neutral Spanish with phi4
    subtran -s=movie.srt -t=movie.es.srt -l=fr         # Translate to French into a chosen file
    subtran -s=show.ass -o=German -l=\"Brazilian Portuguese\" -m=llama3.2
    subtran completions bash > subtran.bash            # Generate bash completions

CONFIGURATION:
    Settings are read from subtran.json when present (see --config).
    Command line flags override values from the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source subtitle file
    #[arg(short = 's', long = "source", value_name = "FILE", required = true)]
    source: Option<PathBuf>,

    /// Output file (default: <source>_translated.<ext>)
    #[arg(short = 't', long = "target", value_name = "FILE")]
    target: Option<PathBuf>,

    /// Language of the source subtitles, as a name or ISO code
    #[arg(short = 'o', long = "original-language", value_name = "LANGUAGE")]
    original_language: Option<String>,

    /// Language to translate into, as a name or ISO code
    #[arg(short = 'l', long = "language", value_name = "LANGUAGE")]
    language: Option<String>,

    /// Ollama model to use
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Ollama server URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = "subtran.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
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
        // The logger passes everything; `log::set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
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
            let (emoji, colour) = Self::decoration(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {}{}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Configuration file values overridden by command line flags
fn build_config(cli: &CommandLineOptions) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(&cli.config_path)
        .with_context(|| format!("Cannot use config file {:?}", cli.config_path))?;

    if let Some(language) = &cli.original_language {
        config.source_language = language.clone();
    }
    if let Some(language) = &cli.language {
        config.target_language = language.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(log_level) = cli.log_level {
        config.log_level = log_level;
    }

    Ok(config)
}

async fn run_translate(cli: CommandLineOptions) -> Result<(), AppError> {
    let config = build_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    let source = cli
        .source
        .ok_or_else(|| AppError::Config("a source file is required (-s)".to_string()))?;

    let controller = Controller::with_config(config)?;
    controller.run(source, cli.target).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Start at info; the configured level is applied once the config is loaded
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Cannot install logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subtran", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    match run_translate(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
