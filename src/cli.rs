//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{MAX_RESULTS, MIN_RESULTS};
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// LitReview - AI-assisted literature review
///
/// Searches academic sites for a research topic, extracts each result page,
/// asks a local Ollama model for key findings, methodology and relevance,
/// and writes a markdown review.
///
/// Examples:
///   litreview "transformer attention"
///   litreview "protein folding" --domains arxiv.org,researchgate.net --max-results 10
///   litreview "graph neural networks" --model mistral --format json
///   litreview "diffusion models" --dry-run
///   litreview --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Research topic to review
    #[arg(value_name = "QUERY", required_unless_present_any = ["init_config", "list_domains"])]
    pub query: Option<String>,

    /// Number of search results to request (1-35)
    ///
    /// Pages that fail to download are dropped, so the review can hold fewer papers.
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub max_results: Option<usize>,

    /// Domains to search (comma-separated)
    ///
    /// Example: --domains arxiv.org,ieee.org. Defaults to arxiv.org and scholar.google.com.
    #[arg(short, long, value_name = "DOMAINS", value_delimiter = ',')]
    pub domains: Option<Vec<String>>,

    /// Print suggested academic domains and exit
    #[arg(long)]
    pub list_domains: bool,

    /// Ollama model to use for analysis [default: llama3.1]
    #[arg(short, long, env = "LITREVIEW_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL [default: http://localhost:11434]
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Output file path for the report
    ///
    /// Defaults to literature_review_<YYYYMMDD_HHMMSS>.md in the current directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Seconds to wait between outbound requests
    #[arg(long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Maximum characters kept from each page
    #[arg(long, value_name = "CHARS")]
    pub max_body_chars: Option<usize>,

    /// Request timeout in seconds for page fetches and model calls
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .litreview.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Search and extract only; list the pages without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .litreview.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The trimmed query, or an empty string when none was given.
    pub fn query_text(&self) -> &str {
        self.query.as_deref().map(str::trim).unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config || self.list_domains {
            return Ok(());
        }

        if self.query_text().is_empty() {
            return Err("Please enter a search query".to_string());
        }

        if let Some(max_results) = self.max_results {
            if !(MIN_RESULTS..=MAX_RESULTS).contains(&max_results) {
                return Err(format!(
                    "Max results must be between {} and {}",
                    MIN_RESULTS, MAX_RESULTS
                ));
            }
        }

        if !self.dry_run {
            if let Some(ref url) = self.ollama_url {
                validate_ollama_url(url)?;
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(delay) = self.delay {
            if !delay.is_finite() || delay < 0.0 {
                return Err("Delay must be a non-negative number of seconds".to_string());
            }
        }

        if self.max_body_chars == Some(0) {
            return Err("Max body chars must be at least 1".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

/// Check that an Ollama endpoint uses an http(s) scheme.
pub fn validate_ollama_url(url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err("Ollama URL must start with 'http://' or 'https://'".to_string())
    }
}
