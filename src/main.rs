//! AgentQA - agent QA score dashboard
//!
//! A CLI tool that pulls agent QA records from several Google Sheets
//! tabs, merges them, and lets you search, filter, sort, paginate and
//! export the result.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, config, export failure, etc.)

mod cli;
mod config;
mod dashboard;
mod models;
mod pipeline;
mod report;
mod source;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use dashboard::Dashboard;
use pipeline::QueryState;
use source::{FixtureSource, GoogleSheetsSource, SheetsConfig, TableSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so [general].verbose can pick the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("AgentQA v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    if let Err(e) = run(args, config).await {
        error!("Run failed: {}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .agentqa.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Set [sheets].spreadsheet_id and api_key, and adjust [[sources]].");
    Ok(())
}

/// Initialize logging at `level`.
///
/// Logs go to stderr so rendered views on stdout can be piped.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load, query, render and optionally export.
async fn run(args: Args, config: Config) -> Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;

    let descriptors = config.descriptors();
    let source = build_source(&args, &config)?;
    let state = initial_state(&args, &config);

    let mut dashboard = Dashboard::new(
        source,
        descriptors,
        PathBuf::from(&config.export.filename),
        state,
    );

    let format = config.general.format;
    dashboard
        .load(!args.quiet && format == OutputFormat::Table)
        .await;

    if args.interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        return dashboard.run_interactive(stdin, std::io::stdout()).await;
    }

    let view = dashboard
        .view()
        .context("Records were not loaded")?;

    let output = match format {
        OutputFormat::Table => report::render_table(&view),
        OutputFormat::Markdown => report::generate_markdown_report(&view),
        OutputFormat::Json => report::generate_json_report(&view)?,
    };
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    if let Some(ref target) = args.export {
        let (count, path) = dashboard.export(target.clone())?;
        if !args.quiet {
            eprintln!("✅ Exported {} records to {}", count, path.display());
        }
    }

    Ok(())
}

/// Where the configuration came from.
///
/// Config is read before the subscriber exists, so this is logged later.
#[derive(Debug, PartialEq)]
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Fallback(String),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => {
                info!("Loaded default config from {}", config::CONFIG_FILE_NAME)
            }
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
            ConfigOrigin::Fallback(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Fallback(format!("{:#}", e)))),
    }
}

/// Pick the table source: a fixture file if given, the Sheets API otherwise.
fn build_source(args: &Args, config: &Config) -> Result<Arc<dyn TableSource>> {
    if let Some(ref fixture) = args.fixture {
        info!("Reading tables from fixture: {}", fixture.display());
        return Ok(Arc::new(FixtureSource::load(fixture)?));
    }

    config.validate_remote().map_err(anyhow::Error::msg)?;

    let sheets = GoogleSheetsSource::new(SheetsConfig {
        base_url: config.sheets.base_url.clone(),
        spreadsheet_id: config.sheets.spreadsheet_id.clone(),
        api_key: config.sheets.api_key.clone(),
    })?;
    Ok(Arc::new(sheets))
}

/// Query state from command-line flags.
fn initial_state(args: &Args, config: &Config) -> QueryState {
    let mut state = QueryState::default();
    state.set_search_text(args.search.clone());
    state.set_page(args.page);

    if let Some(ref label) = args.source {
        if !config.sources.iter().any(|s| &s.label == label) {
            warn!("No configured source is labelled '{}'", label);
        }
        state.set_source_filter(Some(label.clone()));
    }

    if let Some(key) = args.sort {
        state.toggle_sort(key);
        if args.descending {
            state.toggle_sort(key);
        }
    }

    state
}
