//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use deepnotes_core::mkdocs::rebuild_nav;
use deepnotes_core::sync::{SyncProgress, SyncReport, sync_notes};
use deepnotes_notion::{ClientOptions, NotionClient};
use deepnotes_shared::{
    AppConfig, CONFIG_FILE_NAME, init_config, load_config, resolve_credentials,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// deepnotes: publish a Notion notes database as an MkDocs site.
#[derive(Parser)]
#[command(
    name = "deepnotes",
    version,
    about = "Mirror completed Notion pages into Markdown and rebuild the MkDocs navigation.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the project config file.
    #[arg(long, default_value = CONFIG_FILE_NAME, env = "DEEPNOTES_CONFIG", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Write every completed Notion page to the docs directory.
    Sync,

    /// Rebuild the `nav` section of mkdocs.yml from the docs directory.
    Nav,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

const LOG_TARGETS: [&str; 5] = [
    "deepnotes_cli",
    "deepnotes_core",
    "deepnotes_notion",
    "deepnotes_markdown",
    "deepnotes_shared",
];

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync => cmd_sync(&cli.config).await,
        Command::Nav => cmd_nav(&cli.config),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&cli.config),
            ConfigAction::Show => cmd_config_show(&cli.config),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_sync(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    // Fail on missing credentials before any request is made.
    let credentials = resolve_credentials(&config.notion)?;

    let client = NotionClient::new(ClientOptions::from_config(&config.notion, credentials))?;
    let docs_dir = &config.site.docs_dir;

    info!(docs_dir = %docs_dir.display(), "starting sync");

    let reporter = CliProgress::new();
    let report = reporter
        .clear_on_error(sync_notes(&client, docs_dir, &reporter).await)
        .wrap_err("sync failed")?;

    println!();
    println!("  Sync complete.");
    println!("  Matched: {}", report.matched);
    println!("  Written: {}", report.written.len());
    if report.skipped_blocks > 0 {
        println!("  Skipped blocks: {}", report.skipped_blocks);
    }
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_nav(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let notes = rebuild_nav(&config.site).wrap_err("navigation rebuild failed")?;

    println!(
        "Updated {} with {notes} notes from {}",
        config.site.mkdocs_config.display(),
        config.site.docs_dir.display()
    );
    Ok(())
}

fn cmd_config_init(config_path: &Path) -> Result<()> {
    let path = init_config(config_path)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: &Path) -> Result<()> {
    let config: AppConfig = load_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");

    for var in [&config.notion.api_key_env, &config.notion.database_id_env] {
        let state = match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => "set",
            _ => "missing",
        };
        println!("# {var}: {state}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let progress = Self::with_bar(ProgressBar::new_spinner());
        progress.spinner.enable_steady_tick(Duration::from_millis(80));
        progress
    }

    fn with_bar(spinner: ProgressBar) -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.set_message("Querying Notion");
        Self { spinner }
    }

    /// Stop the spinner when the sync fails so the error prints on a clean line.
    fn clear_on_error<T, E>(&self, result: std::result::Result<T, E>) -> std::result::Result<T, E> {
        if result.is_err() {
            self.spinner.finish_and_clear();
        }
        result
    }
}

impl SyncProgress for CliProgress {
    fn pages_matched(&self, total: usize) {
        if total == 0 {
            self.spinner.set_message("No pages matched");
        } else {
            self.spinner.set_message(format!("Found {total} completed pages"));
        }
    }

    fn document_saved(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Saved [{current}/{total}] {}", path.display()));
    }

    fn done(&self, _report: &SyncReport) {
        self.spinner.finish_and_clear();
    }
}
