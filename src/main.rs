// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use fandikana::app_config::{self, Config, TranslationProvider};
use fandikana::server::{self, AppState};
use fandikana::translation::Direction;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "huggingface")]
    HuggingFace,
    Ollama,
    Mock,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::HuggingFace => TranslationProvider::HuggingFace,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::Mock => TranslationProvider::Mock,
        }
    }
}

/// CLI Wrapper for Direction to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDirection {
    BmmToMg,
    MgToBmm,
}

impl From<CliDirection> for Direction {
    fn from(cli_direction: CliDirection) -> Self {
        match cli_direction {
            CliDirection::BmmToMg => Direction::BmmToMg,
            CliDirection::MgToBmm => Direction::MgToBmm,
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
    /// Serve the HTTP translation API (default command)
    Serve(ServeArgs),

    /// Translate a single paragraph and print the result
    Translate(TranslateArgs),

    /// Generate shell completions for fandikana
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Overrides applied on top of the configuration file
#[derive(clap::Args, Debug, Clone, Default)]
struct ProviderArgs {
    /// Model provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Provider endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Skip the provider check performed before serving
    #[arg(long)]
    no_startup_check: bool,
}

#[derive(clap::Args, Debug, Default)]
struct ServeArgs {
    /// Socket address to listen on, e.g. 0.0.0.0:8000
    #[arg(long, env = "FANDIKANA_LISTEN")]
    listen: Option<String>,

    #[command(flatten)]
    provider: ProviderArgs,
}

#[derive(clap::Args, Debug)]
struct TranslateArgs {
    /// Translation direction (defaults to the configured default direction)
    #[arg(short, long, value_enum)]
    direction: Option<CliDirection>,

    /// Text to translate; read from stdin when omitted
    #[arg(value_name = "TEXT")]
    text: Option<String>,

    #[command(flatten)]
    provider: ProviderArgs,
}

/// fandikana - Betsimisaraka / official Malagasy translation service
///
/// Translates paragraphs sentence by sentence with a pretrained
/// sequence-to-sequence model, keeping punctuation and line breaks in place.
#[derive(Parser, Debug)]
#[command(name = "fandikana")]
#[command(version)]
#[command(about = "Betsimisaraka / official Malagasy translation service")]
#[command(long_about = "fandikana serves a sentence-level translation model between Northern Betsimisaraka
Malagasy and official Malagasy over a small JSON HTTP API.

EXAMPLES:
    fandikana                                   # Serve using conf.json
    fandikana serve --listen 127.0.0.1:9000     # Serve on a specific address
    fandikana serve -p mock --no-startup-check  # Serve with the offline echo provider
    fandikana translate 'Salama. Manao ahoana?' # Translate one paragraph
    echo 'Salama.' | fandikana translate -d mg-to-bmm
    fandikana completions bash > fandikana.bash

ROUTES:
    POST /translate             {\"text\": ...} in the default direction
    POST /translate-bmm-to-mg   Betsimisaraka -> official Malagasy
    POST /translate-mg-to-bmm   official Malagasy -> Betsimisaraka
    GET  /healthz

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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
        // The logger itself accepts everything; log::set_max_level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and label for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (colour, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, label, record.args()
            );
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

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "fandikana", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => {
            run_translate(&cli.config_path, cli.log_level, args).await
        }
        Some(Commands::Serve(args)) => {
            run_serve(&cli.config_path, cli.log_level, args).await
        }
        None => {
            run_serve(&cli.config_path, cli.log_level, ServeArgs::default()).await
        }
    }
}

/// Load the configuration file, apply CLI overrides and validate the result
fn load_config(
    config_path: &str,
    log_level: Option<CliLogLevel>,
    overrides: &ProviderArgs,
) -> Result<Config> {
    let mut config = Config::load_or_create(Path::new(config_path))?;

    if let Some(provider) = &overrides.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(endpoint) = &overrides.endpoint {
        config.translation.active_provider_config_mut().endpoint = endpoint.clone();
    }

    if overrides.no_startup_check {
        config.translation.startup_check = false;
    }

    match log_level {
        Some(level) => config.log_level = level.into(),
        // If log level was not set via command line, update it from config now
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

async fn run_serve(config_path: &str, log_level: Option<CliLogLevel>, args: ServeArgs) -> Result<()> {
    let mut config = load_config(config_path, log_level, &args.provider)?;

    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    config.validate()
        .context("Configuration validation failed")?;

    info!(
        "Starting fandikana with {} provider (default direction: {})",
        config.translation.provider.display_name(),
        config.translation.default_direction
    );

    // Provider clients are built and checked once; a failure here stops the process
    let state = AppState::initialize(&config.translation)
        .await
        .context("Failed to initialize translation pipelines")?;

    server::serve(&config.server, Arc::new(state)).await?;

    Ok(())
}

async fn run_translate(config_path: &str, log_level: Option<CliLogLevel>, args: TranslateArgs) -> Result<()> {
    let config = load_config(config_path, log_level, &args.provider)?;

    config.translation.validate()
        .context("Configuration validation failed")?;

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    if text.is_empty() {
        return Err(anyhow!("No text provided"));
    }

    let direction = args.direction
        .map(Direction::from)
        .unwrap_or(config.translation.default_direction);

    let state = AppState::initialize(&config.translation)
        .await
        .context("Failed to initialize translation pipelines")?;

    let translated = state.pipeline(direction)
        .translate_paragraph(&text)
        .await
        .context("Translation failed")?;

    println!("{}", translated);

    Ok(())
}
