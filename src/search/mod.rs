//! Academic search orchestration.
//!
//! Builds a domain-scoped query, asks the search provider for result URLs
//! and extracts each one in order, pacing requests through a [`RequestGate`].

pub mod duckduckgo;
pub mod gate;

use crate::extract::{Extraction, PageExtractor};
use crate::models::{PageResult, SearchConfig};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use duckduckgo::DuckDuckGoSearch;
pub use gate::RequestGate;

/// Keywords appended to every query to bias results toward scholarly work.
pub const ACADEMIC_KEYWORDS: &str = "(research OR paper OR study OR journal)";

/// Failure of the search call itself.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Network(String),

    #[error("search provider returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to read search results: {0}")]
    Parse(String),
}

/// Turns a query into result URLs.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError>;
}

/// Build the provider query: topic, academic keywords, then `site:` clauses.
pub fn academic_query(query: &str, domains: &[String]) -> String {
    let sites = domains
        .iter()
        .map(|domain| format!("site:{}", domain))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("{} {} ({})", query, ACADEMIC_KEYWORDS, sites)
}

/// Runs the search provider and the page extractor for one query.
pub struct AcademicSearch {
    provider: Arc<dyn SearchProvider>,
    extractor: PageExtractor,
    gate: RequestGate,
}

impl AcademicSearch {
    pub fn new(provider: Arc<dyn SearchProvider>, extractor: PageExtractor, gate: RequestGate) -> Self {
        Self {
            provider,
            extractor,
            gate,
        }
    }

    /// Search and extract, surfacing a provider failure to the caller.
    ///
    /// Pages whose extraction failed, or that came back with a title but no
    /// body, are dropped. Pages that could not be read at all are kept with
    /// the content-not-accessible body.
    pub async fn try_search_papers(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<PageResult>, SearchError> {
        let academic_query = academic_query(query, &config.effective_domains());
        info!("Searching: {}", academic_query);

        self.gate.wait().await;
        let urls = self
            .provider
            .search(&academic_query, config.max_results)
            .await?;
        info!("Search returned {} URLs", urls.len());

        let mut results = Vec::new();
        for url in urls.into_iter().take(config.max_results) {
            self.gate.wait().await;
            debug!("Extracting {}", url);

            match self.extractor.extract(&url).await {
                Extraction::Failed { message, .. } => {
                    warn!("Skipping {}: {}", url, message);
                }
                Extraction::Extracted(page) if page.body.is_empty() => {
                    debug!("Skipping {}: empty body", url);
                }
                Extraction::Extracted(page) | Extraction::Inaccessible(page) => {
                    results.push(page);
                }
            }
        }

        info!("Kept {} pages", results.len());
        Ok(results)
    }

    /// Search and extract; a provider failure is logged and yields no pages.
    pub async fn search_papers(&self, query: &str, config: &SearchConfig) -> Vec<PageResult> {
        match self.try_search_papers(query, config).await {
            Ok(results) => results,
            Err(e) => {
                error!("Search error: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::DEFAULT_MAX_BODY_CHARS;
    use crate::mock::{MockDocuments, MockSearch, NoSummary};
    use crate::models::CONTENT_NOT_ACCESSIBLE;
    use std::time::{Duration, Instant};

    fn orchestrator(search: Arc<MockSearch>, documents: MockDocuments) -> AcademicSearch {
        let extractor = PageExtractor::new(
            Arc::new(documents),
            Arc::new(NoSummary),
            DEFAULT_MAX_BODY_CHARS,
        );
        AcademicSearch::new(search, extractor, RequestGate::disabled())
    }

    fn config(max_results: usize, domains: &[&str]) -> SearchConfig {
        SearchConfig::new(max_results, domains.iter().copied()).unwrap()
    }

    #[test]
    fn test_academic_query() {
        let domains = vec!["arxiv.org".to_string(), "ieee.org".to_string()];
        assert_eq!(
            academic_query("transformer attention", &domains),
            "transformer attention (research OR paper OR study OR journal) (site:arxiv.org OR site:ieee.org)"
        );
    }

    #[tokio::test]
    async fn test_empty_domains_use_defaults() {
        let search = Arc::new(MockSearch::with_urls(vec![]));
        let orchestrator = orchestrator(search.clone(), MockDocuments::new());

        let results = orchestrator
            .search_papers("graph networks", &config(5, &[]))
            .await;

        assert!(results.is_empty());
        assert_eq!(
            search.queries(),
            vec![(
                "graph networks (research OR paper OR study OR journal) \
                 (site:arxiv.org OR site:scholar.google.com)"
                    .to_string(),
                5
            )]
        );
    }

    #[tokio::test]
    async fn test_failed_extractions_are_filtered() {
        let search = Arc::new(MockSearch::with_urls(vec![
            "https://arxiv.org/abs/1",
            "https://arxiv.org/abs/2",
            "https://arxiv.org/abs/3.pdf",
        ]));
        let documents = MockDocuments::new()
            .with_page("https://arxiv.org/abs/1", Some("Paper one"), "Body one.")
            .with_error("https://arxiv.org/abs/2", "connection reset")
            .with_page("https://arxiv.org/abs/3.pdf", None, "");

        let results = orchestrator(search, documents)
            .search_papers("q", &config(10, &["arxiv.org"]))
            .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Paper one");
        assert_eq!(results[1].body, CONTENT_NOT_ACCESSIBLE);
        assert!(results.iter().all(|p| !p.is_extraction_error()));
    }

    #[tokio::test]
    async fn test_title_without_body_is_dropped() {
        let search = Arc::new(MockSearch::with_urls(vec!["https://a.org/1", "https://a.org/2"]));
        let documents = MockDocuments::new()
            .with_page("https://a.org/1", Some("Only a title"), "")
            .with_page("https://a.org/2", Some("Full"), "Text here.");

        let results = orchestrator(search, documents)
            .search_papers("q", &config(5, &["a.org"]))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].link, "https://a.org/2");
    }

    #[tokio::test]
    async fn test_never_returns_more_than_max_results() {
        let urls: Vec<String> = (0..10).map(|i| format!("https://a.org/{}", i)).collect();
        let mut documents = MockDocuments::new();
        for url in &urls {
            documents = documents.with_page(url, Some("T"), "Body.");
        }
        let search = Arc::new(MockSearch::with_urls(urls.iter().map(String::as_str).collect()));

        let results = orchestrator(search, documents)
            .search_papers("q", &config(3, &["a.org"]))
            .await;

        assert_eq!(results.len(), 3);
        let links: Vec<_> = results.iter().map(|p| p.link.as_str()).collect();
        assert_eq!(links, vec!["https://a.org/0", "https://a.org/1", "https://a.org/2"]);
    }

    #[tokio::test]
    async fn test_every_request_waits_on_the_gate() {
        let search = Arc::new(MockSearch::with_urls(vec![
            "https://a.org/1",
            "https://a.org/2",
            "https://a.org/3",
        ]));
        let documents = MockDocuments::new()
            .with_page("https://a.org/1", Some("One"), "Body one.")
            .with_error("https://a.org/2", "connection reset")
            .with_page("https://a.org/3", Some("Three"), "Body three.");
        let extractor = PageExtractor::new(
            Arc::new(documents),
            Arc::new(NoSummary),
            DEFAULT_MAX_BODY_CHARS,
        );
        let interval = Duration::from_millis(50);
        let orchestrator =
            AcademicSearch::new(search, extractor, RequestGate::fixed_interval(interval));

        let start = Instant::now();
        let results = orchestrator
            .search_papers("q", &config(5, &["a.org"]))
            .await;

        assert_eq!(results.len(), 2);
        // One permit for the search call and one per URL, failed ones included;
        // the first permit is immediate.
        assert!(start.elapsed() >= interval * 3 - Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let search = Arc::new(MockSearch::failing("rate limited"));
        let orchestrator = orchestrator(search, MockDocuments::new());

        let err = orchestrator
            .try_search_papers("q", &config(5, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Network(_)));

        assert!(orchestrator.search_papers("q", &config(5, &[])).await.is_empty());
    }
}
