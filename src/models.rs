//! Data models for the literature review pipeline.
//!
//! This module contains the records that flow from extraction through
//! analysis into the report, plus the per-run search settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Prefix carried by the body of a page whose download or parse failed.
pub const EXTRACTION_ERROR_PREFIX: &str = "Error extracting content: ";

/// Prefix shared by every content-not-accessible body.
pub const INACCESSIBLE_PREFIX: &str = "Content not accessible";

/// Body used for pages that parsed but yielded no usable text.
pub const CONTENT_NOT_ACCESSIBLE: &str =
    "Content not accessible - might be a PDF or protected content";

/// Prefix carried by the analysis text of a paper whose model call failed.
pub const ANALYSIS_ERROR_PREFIX: &str = "Analysis error: ";

/// Domains searched when the caller does not name any.
pub const DEFAULT_DOMAINS: [&str; 2] = ["arxiv.org", "scholar.google.com"];

/// Domains offered to users as sensible academic targets.
pub const SUGGESTED_DOMAINS: [&str; 6] = [
    "arxiv.org",
    "scholar.google.com",
    "researchgate.net",
    "sciencedirect.com",
    "ieee.org",
    "springer.com",
];

/// Smallest accepted result count.
pub const MIN_RESULTS: usize = 1;

/// Largest accepted result count.
pub const MAX_RESULTS: usize = 35;

/// One extracted web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page title, or the URL when the page has none.
    pub title: String,
    /// Summary or text of the page, or a diagnostic string.
    pub body: String,
    /// Source URL.
    pub link: String,
}

impl PageResult {
    /// Whether the body carries the extraction-failure prefix.
    pub fn is_extraction_error(&self) -> bool {
        self.body.starts_with(EXTRACTION_ERROR_PREFIX)
    }

    /// Whether the body is the content-not-accessible sentinel.
    pub fn is_inaccessible(&self) -> bool {
        self.body.starts_with(INACCESSIBLE_PREFIX)
    }
}

/// Outcome of asking the model about one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Analysis {
    /// Model output, verbatim.
    Completed(String),
    /// The model call failed with this message.
    Failed(String),
}

impl Analysis {
    /// Returns true if the model call failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Analysis::Failed(_))
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Analysis::Completed(text) => write!(f, "{}", text),
            Analysis::Failed(message) => write!(f, "{}{}", ANALYSIS_ERROR_PREFIX, message),
        }
    }
}

/// A page together with its model analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedPaper {
    pub title: String,
    pub link: String,
    pub body: String,
    pub analysis: Analysis,
}

impl AnalyzedPaper {
    pub fn new(page: PageResult, analysis: Analysis) -> Self {
        Self {
            title: page.title,
            link: page.link,
            body: page.body,
            analysis,
        }
    }
}

/// Rejected search settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchConfigError {
    #[error("max results must be between 1 and 35, got {0}")]
    MaxResultsOutOfRange(usize),
}

/// Per-run search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on search hits requested from the provider.
    pub max_results: usize,
    /// Hostnames the query is restricted to.
    pub domains: Vec<String>,
}

impl SearchConfig {
    /// Build a config, checking the result bound and cleaning up domain names.
    ///
    /// Domains are trimmed, lowercased and de-duplicated in first-seen order.
    pub fn new<I, S>(max_results: usize, domains: I) -> Result<Self, SearchConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !(MIN_RESULTS..=MAX_RESULTS).contains(&max_results) {
            return Err(SearchConfigError::MaxResultsOutOfRange(max_results));
        }

        let mut cleaned: Vec<String> = Vec::new();
        for domain in domains {
            let domain = domain.as_ref().trim().to_lowercase();
            if !domain.is_empty() && !cleaned.contains(&domain) {
                cleaned.push(domain);
            }
        }

        Ok(Self {
            max_results,
            domains: cleaned,
        })
    }

    /// The domains actually searched: the configured set, or the defaults when empty.
    pub fn effective_domains(&self) -> Vec<String> {
        if self.domains.is_empty() {
            DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect()
        } else {
            self.domains.clone()
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            domains: Vec::new(),
        }
    }
}

/// Counts shown to the user once a run finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Papers in the report.
    pub total: usize,
    /// Papers whose page could not be read.
    pub inaccessible: usize,
    /// Papers whose analysis failed.
    pub analysis_failures: usize,
}

impl RunSummary {
    /// Creates a summary from the analyzed papers.
    pub fn from_papers(papers: &[AnalyzedPaper]) -> Self {
        let mut summary = Self {
            total: papers.len(),
            ..Self::default()
        };

        for paper in papers {
            if paper.body.starts_with(INACCESSIBLE_PREFIX) {
                summary.inaccessible += 1;
            }
            if paper.analysis.is_failed() {
                summary.analysis_failures += 1;
            }
        }

        summary
    }
}
