// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::Path;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use subreview::app_config::{self, CompletionProvider, Config};
use subreview::review::{ColorPolicy, FormatStrategy};
use subreview::Controller;

/// CLI Wrapper for CompletionProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliCompletionProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
}

impl From<CliCompletionProvider> for CompletionProvider {
    fn from(cli_provider: CliCompletionProvider) -> Self {
        match cli_provider {
            CliCompletionProvider::OpenAI => CompletionProvider::OpenAI,
            CliCompletionProvider::Anthropic => CompletionProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for ColorPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliColorPolicy {
    /// Only an explicit white background marks a row
    StrictExplicit,
    /// Unformatted cells count as white too
    DefaultWhite,
}

impl From<CliColorPolicy> for ColorPolicy {
    fn from(cli_policy: CliColorPolicy) -> Self {
        match cli_policy {
            CliColorPolicy::StrictExplicit => ColorPolicy::StrictExplicit,
            CliColorPolicy::DefaultWhite => ColorPolicy::DefaultWhite,
        }
    }
}

/// CLI Wrapper for FormatStrategy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliFormatStrategy {
    /// One format read per document
    Bulk,
    /// One format read per row
    PerCell,
}

impl From<CliFormatStrategy> for FormatStrategy {
    fn from(cli_strategy: CliFormatStrategy) -> Self {
        match cli_strategy {
            CliFormatStrategy::Bulk => FormatStrategy::Bulk,
            CliFormatStrategy::PerCell => FormatStrategy::PerCell,
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
    /// Review the documents listed in the master index (default command)
    #[command(alias = "review")]
    Run(RunArgs),

    /// Generate shell completions for subreview
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// Review only this document instead of the master index
    #[arg(short, long, value_name = "URL")]
    document: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Completion provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliCompletionProvider>,

    /// Model name to use for the review
    #[arg(short, long)]
    model: Option<String>,

    /// How a background colour marks a row for review
    #[arg(long, value_enum)]
    policy: Option<CliColorPolicy>,

    /// How background colours are fetched
    #[arg(long, value_enum)]
    strategy: Option<CliFormatStrategy>,

    /// Also review rows whose category column is already filled
    #[arg(long)]
    no_output_guard: bool,

    /// Plan and log the writes without sending them
    #[arg(long)]
    dry_run: bool,

    /// Log prompts and completions at info level
    #[arg(long)]
    debug: bool,

    /// URL of the master index spreadsheet
    #[arg(long, env = "MASTER_SPREADSHEET_URL")]
    master_url: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    /// Google OAuth access token for the Sheets API
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    google_access_token: Option<String>,
}

/// subreview - AI review of spreadsheet translations
///
/// Reviews first-pass Japanese translations of English transcripts stored in
/// spreadsheets and writes back corrected translations and error categories.
#[derive(Parser, Debug)]
#[command(name = "subreview")]
#[command(version = "0.1.0")]
#[command(about = "AI-powered review of spreadsheet translations")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "subreview reads the documents listed in a master spreadsheet and reviews every row whose
colour cell has a white background, writing the corrected translation and an error category back.

EXAMPLES:
    subreview                                       # Review every document in the master index
    subreview --document <URL>                      # Review a single document
    subreview -p anthropic -m claude-3-5-sonnet-latest
    subreview --policy default-white --dry-run      # Show planned writes only
    subreview completions bash > subreview.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

ENVIRONMENT:
    MASTER_SPREADSHEET_URL, OPENAI_API_KEY, ANTHROPIC_API_KEY, GOOGLE_ACCESS_TOKEN")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
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

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
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
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
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
    // The level is lowered or raised once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subreview", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Run(args)) => run_review(args).await,
        None => run_review(cli.run).await,
    }
}

/// Load the config file, or write a default one when it does not exist
fn load_or_create_config(config_path: &str) -> Result<Config> {
    let path = Path::new(config_path);
    if path.exists() {
        return Config::from_file(path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.write_to(path)?;
    Ok(config)
}

/// Apply command line and environment overrides to the loaded config
fn apply_overrides(config: &mut Config, options: &RunArgs) {
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(provider) = &options.provider {
        config.completion.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.completion.model = model.clone();
    }
    if let Some(policy) = &options.policy {
        config.review.policy = policy.clone().into();
    }
    if let Some(strategy) = &options.strategy {
        config.review.strategy = strategy.clone().into();
    }
    if options.no_output_guard {
        config.review.require_empty_output = false;
    }
    if options.dry_run {
        config.review.dry_run = true;
    }
    if options.debug {
        config.review.debug = true;
    }
    if let Some(master_url) = &options.master_url {
        config.master_url = master_url.clone();
    }
    if let Some(token) = &options.google_access_token {
        config.sheets.access_token = token.clone();
    }

    let api_key = match config.completion.provider {
        CompletionProvider::OpenAI => &options.openai_api_key,
        CompletionProvider::Anthropic => &options.anthropic_api_key,
    };
    if let Some(key) = api_key {
        config.completion.api_key = key.clone();
    }
}

async fn run_review(options: RunArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_or_create_config(&options.config)?;
    apply_overrides(&mut config, &options);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(level_filter(&config.log_level));

    info!(
        "🚀 subreview: {} ({}), policy {:?}, strategy {:?}",
        config.completion.provider.display_name(),
        config.completion.get_model(),
        config.review.policy,
        config.review.strategy
    );

    let controller = Controller::with_config(config)?;

    let summary = match &options.document {
        Some(url) => controller.run_documents(std::slice::from_ref(url)).await,
        None => controller.run().await?,
    };

    if !summary.failures.is_empty() {
        warn!("{} of {} documents failed", summary.failures.len(), summary.processed);
    }

    Ok(())
}
