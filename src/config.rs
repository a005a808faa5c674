//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.survey-insights.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".survey-insights.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Survey API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Which questions feed which chart.
    #[serde(default)]
    pub questions: QuestionsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "survey_insights.md".to_string()
}

/// Survey API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the survey API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://chart-standard-insights-backend.vercel.app".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Question indices and endpoints for each chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionsConfig {
    /// Question index of the age answers (`/answers/{age}`).
    #[serde(default = "default_age")]
    pub age: u32,

    /// Question index of the gender answers.
    #[serde(default = "default_gender")]
    pub gender: u32,

    /// Question index of the location answers.
    #[serde(default = "default_location")]
    pub location: u32,

    /// Path of the pre-aggregated multi-choice tally.
    #[serde(default = "default_answer_tally_path")]
    pub answer_tally_path: String,

    /// Position of the multi-choice question in the `/questions` list.
    #[serde(default = "default_metadata_index")]
    pub metadata_index: usize,
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            age: default_age(),
            gender: default_gender(),
            location: default_location(),
            answer_tally_path: default_answer_tally_path(),
            metadata_index: default_metadata_index(),
        }
    }
}

fn default_age() -> u32 {
    0
}

fn default_gender() -> u32 {
    1
}

fn default_location() -> u32 {
    2
}

fn default_answer_tally_path() -> String {
    "answers/four/new".to_string()
}

fn default_metadata_index() -> usize {
    3
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum characters of an answer shown as a chart label.
    #[serde(default = "default_label_max")]
    pub label_max_chars: usize,

    /// Width of the text bars, in characters.
    #[serde(default = "default_bar_width")]
    pub bar_width: usize,

    /// Draw text bars next to the tables.
    #[serde(default = "default_true")]
    pub include_bars: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            label_max_chars: default_label_max(),
            bar_width: default_bar_width(),
            include_bars: true,
        }
    }
}

fn default_label_max() -> usize {
    crate::analysis::answers::DEFAULT_LABEL_MAX
}

fn default_bar_width() -> usize {
    30
}

fn default_true() -> bool {
    true
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.survey-insights.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(label_max) = args.label_max {
            self.report.label_max_chars = label_max;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        if args.no_bars {
            self.report.include_bars = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that would make every run fail or render nothing.
    ///
    /// Call after [`Config::merge_with_args`], so file values and flags are
    /// held to the same rules.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_seconds == 0 {
            bail!("[api] timeout_seconds must be at least 1");
        }
        if self.report.label_max_chars == 0 {
            bail!("[report] label_max_chars must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
