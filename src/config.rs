//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.litreview.toml` files.

use crate::report::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".litreview.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search settings.
    #[serde(default)]
    pub search: SearchSettings,

    /// Page extraction settings.
    #[serde(default)]
    pub extract: ExtractSettings,

    /// Model settings.
    #[serde(default)]
    pub model: ModelSettings,

    /// Report settings.
    #[serde(default)]
    pub report: ReportSettings,
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Number of search results to request.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Domains to restrict the search to. Empty means the defaults.
    #[serde(default)]
    pub domains: Vec<String>,

    /// Pause between outbound requests, in seconds.
    #[serde(default = "default_delay_seconds")]
    pub delay_seconds: f64,

    /// Pause between result pages from the search provider, in milliseconds.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            domains: Vec::new(),
            delay_seconds: default_delay_seconds(),
            page_delay_ms: default_page_delay_ms(),
        }
    }
}

impl SearchSettings {
    /// The inter-request delay; negative or non-finite values mean no delay.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::ZERO)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

fn default_max_results() -> usize {
    5
}

fn default_delay_seconds() -> f64 {
    2.0
}

fn default_page_delay_ms() -> u64 {
    1000
}

/// Page extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSettings {
    /// Maximum body length in characters.
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,

    /// HTTP timeout for search and page requests, in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: u64,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sentences kept in an extractive summary.
    #[serde(default = "default_summary_sentences")]
    pub summary_sentences: usize,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            max_body_chars: default_max_body_chars(),
            timeout_seconds: default_fetch_timeout(),
            user_agent: default_user_agent(),
            summary_sentences: default_summary_sentences(),
        }
    }
}

fn default_max_body_chars() -> usize {
    crate::extract::DEFAULT_MAX_BODY_CHARS
}

fn default_fetch_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    crate::extract::html::DEFAULT_USER_AGENT.to_string()
}

fn default_summary_sentences() -> usize {
    crate::extract::summary::DEFAULT_SUMMARY_SENTENCES
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Ollama model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation; unset uses the model default.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds.
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: None,
            timeout_seconds: default_model_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.1".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model_timeout() -> u64 {
    300
}

/// Report settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,
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

    /// Try to load `.litreview.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, and only
    /// when given explicitly (flag or environment variable).
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref ollama_url) = args.ollama_url {
            self.model.ollama_url = ollama_url.clone();
        }

        if let Some(temperature) = args.temperature {
            self.model.temperature = Some(temperature);
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
            self.extract.timeout_seconds = timeout;
        }

        if let Some(max_results) = args.max_results {
            self.search.max_results = max_results;
        }
        if let Some(ref domains) = args.domains {
            self.search.domains = domains.clone();
        }
        if let Some(delay) = args.delay {
            self.search.delay_seconds = delay;
        }

        if let Some(max_body_chars) = args.max_body_chars {
            self.extract.max_body_chars = max_body_chars;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Validate settings that only make sense once file and CLI are merged.
    pub fn validate(&self) -> std::result::Result<(), String> {
        crate::cli::validate_ollama_url(&self.model.ollama_url)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
