use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::DetectorConfig;

/// Config file looked up in the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "field-detection.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "field-detection",
    version,
    about = "Detect, label and score the input fields of an HTML page"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: field-detection.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the fields of a single page
    Detect {
        #[command(flatten)]
        source: PageSource,

        /// Output format: console, json, yaml
        #[arg(long)]
        format: Option<String>,

        /// Minimum confidence to keep (overrides config)
        #[arg(long)]
        threshold: Option<f32>,

        /// Use the lower diagnostic threshold
        #[arg(long)]
        diagnostic: bool,

        /// Append per-phase JSONL trace events to this file
        #[arg(long)]
        trace: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Run detection over every .html / .json page in a directory
    Batch {
        /// Directory of HTML pages and JSON snapshots
        #[arg(long)]
        dir: String,

        /// Output format: console, json
        #[arg(long)]
        format: Option<String>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Exactly one page input.
#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PageSource {
    /// HTML file on disk
    #[arg(long)]
    pub file: Option<String>,

    /// Page URL, fetched over HTTP
    #[arg(long)]
    pub url: Option<String>,

    /// Browser DOM snapshot (JSON)
    #[arg(long)]
    pub snapshot: Option<String>,
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `field-detection.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub detection: DetectorConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_console")]
    pub format: String,

    /// JSONL phase trace file
    pub trace: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_console(),
            trace: None,
        }
    }
}

fn default_console() -> String { "console".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if the file is missing or
/// malformed; a malformed file is reported.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => parse_config(&content).unwrap_or_else(|e| {
            warn!("Ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// CLI flags override the file; the file overrides built-in defaults.
pub fn build_detector_config(
    file: &DetectorConfig,
    threshold: Option<f32>,
    diagnostic: bool,
) -> DetectorConfig {
    let mut config = file.clone();
    if diagnostic {
        config.diagnostic = true;
    }
    if let Some(t) = threshold {
        let t = t.clamp(0.0, 1.0);
        if config.diagnostic {
            config.diagnostic_threshold = t;
        } else {
            config.threshold = t;
        }
    }
    config
}
