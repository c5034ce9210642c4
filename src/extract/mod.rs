//! Page extraction.
//!
//! Downloads a result URL, derives a title and a body from it and
//! classifies every failure into an [`Extraction`] value. Nothing in
//! here returns an error to the caller: one bad page never aborts a batch.

pub mod html;
pub mod summary;

use crate::models::{PageResult, CONTENT_NOT_ACCESSIBLE, EXTRACTION_ERROR_PREFIX};
use crate::text::{normalize, truncate_chars};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub use html::HttpDocumentSource;
pub use summary::{FrequencySummarizer, Summarizer};

/// Default upper bound on the body length, in characters.
pub const DEFAULT_MAX_BODY_CHARS: usize = 1500;

/// Errors raised while downloading or parsing a page.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request error: {0}")]
    Request(String),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("failed to read body: {0}")]
    Body(String),
}

/// Fields recovered from a downloaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Document title, if the document declares one.
    pub title: Option<String>,
    /// Readable text of the document.
    pub text: String,
}

/// Something that can turn a URL into a parsed document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ParsedDocument, ExtractionError>;
}

/// Classified outcome of extracting one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The page produced a title and/or body.
    Extracted(PageResult),
    /// The page was fetched but had neither a title nor any text.
    Inaccessible(PageResult),
    /// Download or parse failed.
    Failed { url: String, message: String },
}

impl Extraction {
    /// Flatten into a [`PageResult`], encoding failures in the body.
    pub fn into_page_result(self) -> PageResult {
        match self {
            Extraction::Extracted(page) | Extraction::Inaccessible(page) => page,
            Extraction::Failed { url, message } => PageResult {
                title: url.clone(),
                body: format!("{}{}", EXTRACTION_ERROR_PREFIX, message),
                link: url,
            },
        }
    }
}

/// Turns URLs into [`PageResult`]s.
pub struct PageExtractor {
    source: Arc<dyn DocumentSource>,
    summarizer: Arc<dyn Summarizer>,
    max_body_chars: usize,
}

impl PageExtractor {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        summarizer: Arc<dyn Summarizer>,
        max_body_chars: usize,
    ) -> Self {
        Self {
            source,
            summarizer,
            max_body_chars,
        }
    }

    /// Extract one page.
    ///
    /// The body is the summary when one can be produced, otherwise the
    /// full text, normalized and cut to `max_body_chars` characters.
    pub async fn extract(&self, url: &str) -> Extraction {
        let document = match self.source.fetch(url).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to extract {}: {}", url, e);
                return Extraction::Failed {
                    url: url.to_string(),
                    message: e.to_string(),
                };
            }
        };

        let parsed_title = document.title.filter(|t| !t.trim().is_empty());

        let summary = match self
            .summarizer
            .summarize(parsed_title.as_deref(), &document.text)
        {
            Ok(summary) => summary,
            Err(e) => {
                debug!("No summary for {}: {}", url, e);
                String::new()
            }
        };

        let body = if summary.trim().is_empty() {
            document.text
        } else {
            summary
        };

        if parsed_title.is_none() && body.trim().is_empty() {
            debug!("{} has no readable content", url);
            return Extraction::Inaccessible(PageResult {
                title: url.to_string(),
                body: CONTENT_NOT_ACCESSIBLE.to_string(),
                link: url.to_string(),
            });
        }

        let title = parsed_title.unwrap_or_else(|| url.to_string());
        let body = normalize(Some(&body));

        Extraction::Extracted(PageResult {
            title: normalize(Some(&title)),
            body: truncate_chars(&body, self.max_body_chars),
            link: url.to_string(),
        })
    }
}
