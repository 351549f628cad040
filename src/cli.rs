//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::RecordField;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// AgentQA - search and export agent QA scores
///
/// Pulls QA records from every configured Google Sheets tab, merges them,
/// and shows a filtered, sorted, paginated view with pass/fail summaries.
///
/// Examples:
///   agentqa --spreadsheet-id 1D1d... --search ann
///   agentqa --source WNS --sort last-name --descending --page 2
///   agentqa --fixture tables.json --export
///   agentqa --interactive
///   agentqa --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .agentqa.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Spreadsheet holding one tab per source
    #[arg(long, value_name = "ID", env = "AGENTQA_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Google Sheets API key
    #[arg(long, value_name = "KEY", env = "AGENTQA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sheets API base URL (for proxies and local test servers)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Read tables from a JSON file instead of the Sheets API
    ///
    /// Format: { "<sheet id>": [["header", ...], ["cell", ...], ...] }
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Case-insensitive substring of "first last"
    #[arg(short, long, default_value = "", value_name = "TEXT")]
    pub search: String,

    /// Only show records from this source label
    #[arg(long, value_name = "LABEL")]
    pub source: Option<String>,

    /// Sort by this column
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<RecordField>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub descending: bool,

    /// Page to show (1-based, 10 records per page)
    #[arg(short, long, default_value = "1", value_name = "N")]
    pub page: usize,

    /// Output format (table, markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write every matching record (not just the page) to a CSV file
    ///
    /// Without a value, writes to the configured export filename.
    #[arg(short, long, value_name = "FILE")]
    pub export: Option<Option<PathBuf>>,

    /// Start an interactive session after loading
    #[arg(short, long)]
    pub interactive: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .agentqa.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard view.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal table (default)
    #[default]
    Table,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.page == 0 {
            return Err("Page must be at least 1".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.interactive && self.export.is_some() {
            return Err(
                "Cannot use --export with --interactive; use the 'export' command instead"
                    .to_string(),
            );
        }

        if let Some(ref fixture) = self.fixture {
            if !fixture.is_file() {
                return Err(format!("Fixture file does not exist: {}", fixture.display()));
            }
        }

        if let Some(ref url) = self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `[general].verbose`; `--quiet` overrides it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            config: None,
            spreadsheet_id: None,
            api_key: None,
            base_url: None,
            fixture: None,
            search: String::new(),
            source: None,
            sort: None,
            descending: false,
            page: 1,
            format: None,
            export: None,
            interactive: false,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_query_flags() {
        let args = Args::try_parse_from([
            "agentqa",
            "--search",
            "ann",
            "--source",
            "WNS",
            "--sort",
            "last-name",
            "--descending",
            "--page",
            "2",
        ])
        .unwrap();

        assert_eq!(args.search, "ann");
        assert_eq!(args.source.as_deref(), Some("WNS"));
        assert_eq!(args.sort, Some(RecordField::LastName));
        assert!(args.descending);
        assert_eq!(args.page, 2);
    }

    #[test]
    fn test_descending_requires_sort() {
        assert!(Args::try_parse_from(["agentqa", "--descending"]).is_err());
    }

    #[test]
    fn test_export_with_and_without_path() {
        let bare = Args::try_parse_from(["agentqa", "--export"]).unwrap();
        assert_eq!(bare.export, Some(None));

        let with_path = Args::try_parse_from(["agentqa", "--export", "out.csv"]).unwrap();
        assert_eq!(with_path.export, Some(Some(PathBuf::from("out.csv"))));

        let absent = Args::try_parse_from(["agentqa"]).unwrap();
        assert_eq!(absent.export, None);
    }

    #[test]
    fn test_validation_zero_page() {
        let mut args = make_args();
        args.page = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_fixture() {
        let mut args = make_args();
        args.fixture = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_interactive_with_export() {
        let mut args = make_args();
        args.interactive = true;
        args.export = Some(None);
        assert!(args.validate().is_err());

        args.export = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_log_level_from_config_verbose() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
