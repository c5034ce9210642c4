//! Test doubles for the search, document and model collaborators.

use crate::extract::summary::{Summarizer, SummaryError};
use crate::extract::{DocumentSource, ExtractionError, ParsedDocument};
use crate::llm::{LanguageModel, ModelError};
use crate::search::{SearchError, SearchProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Search provider returning a fixed URL list, or a fixed failure.
#[derive(Debug, Default)]
pub struct MockSearch {
    urls: Vec<String>,
    failure: Option<String>,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockSearch {
    pub fn with_urls(urls: Vec<&str>) -> Self {
        Self {
            urls: urls.into_iter().map(String::from).collect(),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Every `(query, limit)` pair the provider was called with.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        self.queries.lock().unwrap().push((query.to_string(), limit));
        match self.failure {
            Some(ref message) => Err(SearchError::Network(message.clone())),
            None => Ok(self.urls.clone()),
        }
    }
}

/// Document source serving canned documents keyed by URL.
#[derive(Debug, Default)]
pub struct MockDocuments {
    pages: HashMap<String, Result<ParsedDocument, String>>,
}

impl MockDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, title: Option<&str>, text: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            Ok(ParsedDocument {
                title: title.map(String::from),
                text: text.to_string(),
            }),
        );
        self
    }

    /// Fail fetches of `url` with a connection error.
    pub fn with_error(mut self, url: &str, message: &str) -> Self {
        self.pages.insert(url.to_string(), Err(message.to_string()));
        self
    }
}

#[async_trait]
impl DocumentSource for MockDocuments {
    async fn fetch(&self, url: &str) -> Result<ParsedDocument, ExtractionError> {
        match self.pages.get(url) {
            Some(Ok(document)) => Ok(document.clone()),
            Some(Err(message)) => Err(ExtractionError::Connect(message.clone())),
            None => Err(ExtractionError::Status(reqwest::StatusCode::NOT_FOUND)),
        }
    }
}

/// Summarizer that always fails, so the full text is used.
pub struct NoSummary;

impl Summarizer for NoSummary {
    fn summarize(&self, _title: Option<&str>, _text: &str) -> Result<String, SummaryError> {
        Err(SummaryError::NoSentences)
    }
}

/// Summarizer that always returns the same text.
pub struct FixedSummary(pub String);

impl Summarizer for FixedSummary {
    fn summarize(&self, _title: Option<&str>, _text: &str) -> Result<String, SummaryError> {
        Ok(self.0.clone())
    }
}

/// Language model that echoes a canned reply or always fails.
#[derive(Debug, Default)]
pub struct MockModel {
    failure: Option<String>,
    prompts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockModel {
    /// Replies with `Analysis of <paper title>`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(ref message) = self.failure {
            return Err(ModelError::Request(message.clone()));
        }

        let title = prompt
            .lines()
            .find_map(|line| line.trim().strip_prefix("Paper Title: "))
            .unwrap_or("unknown");
        Ok(format!("Analysis of {}", title))
    }
}
