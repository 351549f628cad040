//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.agentqa.toml` files.

use crate::cli::OutputFormat;
use crate::models::SourceDescriptor;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".agentqa.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Spreadsheet connection settings.
    #[serde(default)]
    pub sheets: SheetsSettings,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Source tables, in display order.
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            sheets: SheetsSettings::default(),
            export: ExportConfig::default(),
            sources: default_sources(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Google Sheets connection settings.
///
/// The spreadsheet id and API key have no built-in values; they come from
/// this file, the command line or the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsSettings {
    /// Sheets API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Spreadsheet holding one tab per source.
    #[serde(default)]
    pub spreadsheet_id: String,

    /// API key for read access.
    #[serde(default)]
    pub api_key: String,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            spreadsheet_id: String::new(),
            api_key: String::new(),
        }
    }
}

fn default_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File written by `--export` without a path and by `export`.
    #[serde(default = "default_export_filename")]
    pub filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: default_export_filename(),
        }
    }
}

fn default_export_filename() -> String {
    "agent-scores.csv".to_string()
}

/// One source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Sheet (tab) name on the spreadsheet.
    pub id: String,
    /// Label stamped onto records from this sheet.
    pub label: String,
}

fn default_sources() -> Vec<SourceConfig> {
    [
        ("BUW", "Buwelo"),
        ("WNS", "WNS"),
        ("TEP", "TEP"),
        ("CON", "Concentrix"),
    ]
    .into_iter()
    .map(|(id, label)| SourceConfig {
        id: id.to_string(),
        label: label.to_string(),
    })
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref id) = args.spreadsheet_id {
            self.sheets.spreadsheet_id = id.clone();
        }
        if let Some(ref key) = args.api_key {
            self.sheets.api_key = key.clone();
        }
        if let Some(ref url) = args.base_url {
            self.sheets.base_url = url.clone();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Source descriptors in display order.
    pub fn descriptors(&self) -> Vec<SourceDescriptor> {
        self.sources
            .iter()
            .map(|s| SourceDescriptor::new(s.id.clone(), s.label.clone()))
            .collect()
    }

    /// Check the settings needed to reach the Sheets API.
    pub fn validate_remote(&self) -> Result<(), String> {
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(
                "No spreadsheet id configured (set [sheets].spreadsheet_id or --spreadsheet-id)"
                    .to_string(),
            );
        }
        if self.sheets.api_key.trim().is_empty() {
            return Err(
                "No API key configured (set [sheets].api_key, --api-key or AGENTQA_API_KEY)"
                    .to_string(),
            );
        }
        if !self.sheets.base_url.starts_with("http://")
            && !self.sheets.base_url.starts_with("https://")
        {
            return Err("Sheets base URL must start with 'http://' or 'https://'".to_string());
        }
        Ok(())
    }

    /// Check settings that apply to every run.
    pub fn validate(&self) -> Result<(), String> {
        if self.sources.is_empty() {
            return Err("At least one [[sources]] entry is required".to_string());
        }
        for source in &self.sources {
            if source.id.trim().is_empty() || source.label.trim().is_empty() {
                return Err("Every source needs a non-empty id and label".to_string());
            }
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
