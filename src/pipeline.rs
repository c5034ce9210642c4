//! Batch pipeline: search, extract, then analyze each page in order.
//!
//! Progress is reported as [`PipelineEvent`]s on an unbounded channel so
//! any front-end can render it. Analysis is strictly sequential: paper
//! `i + 1` is not sent to the model before paper `i` has an answer.

use crate::llm::PaperAnalyzer;
use crate::models::{AnalyzedPaper, SearchConfig};
use crate::search::AcademicSearch;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The search has started.
    Searching { query: String },
    /// The search call itself failed; the run ends without results.
    SearchFailed(String),
    /// Search and extraction finished with this many usable pages.
    PagesFound(usize),
    /// Paper `index` of `total` (1-based) is being analyzed.
    Analyzing {
        index: usize,
        total: usize,
        title: String,
    },
    /// All papers have been analyzed.
    Finished { analyzed: usize },
}

impl PipelineEvent {
    /// Fraction of the analysis stage reached by this event, if it is a tick.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            PipelineEvent::Analyzing { index, total, .. } if *total > 0 => {
                Some(*index as f64 / *total as f64)
            }
            _ => None,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing usable was found, or the search failed.
    NoResults,
    /// Every usable page, analyzed, in search order.
    Completed(Vec<AnalyzedPaper>),
}

/// Search orchestrator plus analyzer.
pub struct Pipeline {
    search: AcademicSearch,
    analyzer: PaperAnalyzer,
}

impl Pipeline {
    pub fn new(search: AcademicSearch, analyzer: PaperAnalyzer) -> Self {
        Self { search, analyzer }
    }

    pub fn analyzer(&self) -> &PaperAnalyzer {
        &self.analyzer
    }

    /// Run one literature review.
    pub async fn run(
        &self,
        query: &str,
        config: &SearchConfig,
        events: &UnboundedSender<PipelineEvent>,
    ) -> RunOutcome {
        emit(
            events,
            PipelineEvent::Searching {
                query: query.to_string(),
            },
        );

        let pages = match self.search.try_search_papers(query, config).await {
            Ok(pages) => pages,
            Err(e) => {
                error!("Search error: {}", e);
                emit(events, PipelineEvent::SearchFailed(e.to_string()));
                return RunOutcome::NoResults;
            }
        };

        emit(events, PipelineEvent::PagesFound(pages.len()));
        if pages.is_empty() {
            info!("No papers found for '{}'", query);
            return RunOutcome::NoResults;
        }

        let total = pages.len();
        let mut papers = Vec::with_capacity(total);
        for (i, page) in pages.into_iter().enumerate() {
            emit(
                events,
                PipelineEvent::Analyzing {
                    index: i + 1,
                    total,
                    title: page.title.clone(),
                },
            );
            info!("Analyzing paper {} of {}", i + 1, total);

            let analysis = self.analyzer.analyze(&page).await;
            papers.push(AnalyzedPaper::new(page, analysis));
        }

        emit(
            events,
            PipelineEvent::Finished {
                analyzed: papers.len(),
            },
        );
        RunOutcome::Completed(papers)
    }
}

/// Send an event; a front-end that stopped listening is not an error.
fn emit(events: &UnboundedSender<PipelineEvent>, event: PipelineEvent) {
    let _ = events.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{PageExtractor, DEFAULT_MAX_BODY_CHARS};
    use crate::mock::{MockDocuments, MockModel, MockSearch, NoSummary};
    use crate::models::Analysis;
    use crate::search::RequestGate;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn pipeline(search: MockSearch, documents: MockDocuments, model: Arc<MockModel>) -> Pipeline {
        let extractor = PageExtractor::new(
            Arc::new(documents),
            Arc::new(NoSummary),
            DEFAULT_MAX_BODY_CHARS,
        );
        Pipeline::new(
            AcademicSearch::new(Arc::new(search), extractor, RequestGate::disabled()),
            PaperAnalyzer::new(model),
        )
    }

    fn drain(mut rx: mpsc::UnboundedReceiver<PipelineEvent>) -> Vec<PipelineEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn config() -> SearchConfig {
        SearchConfig::new(5, ["arxiv.org"]).unwrap()
    }

    #[tokio::test]
    async fn test_one_failed_extraction_yields_one_paper() {
        let search = MockSearch::with_urls(vec!["https://arxiv.org/abs/1", "https://arxiv.org/abs/2"]);
        let documents = MockDocuments::new()
            .with_page("https://arxiv.org/abs/1", Some("Attention"), "Self-attention text.")
            .with_error("https://arxiv.org/abs/2", "network unreachable");
        let model = Arc::new(MockModel::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let outcome = pipeline(search, documents, model.clone())
            .run("transformer attention", &config(), &tx)
            .await;

        let papers = match outcome {
            RunOutcome::Completed(papers) => papers,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].link, "https://arxiv.org/abs/1");
        assert_eq!(papers[0].analysis, Analysis::Completed("Analysis of Attention".into()));
        assert_eq!(model.prompts().len(), 1);

        assert_eq!(
            drain(rx),
            vec![
                PipelineEvent::Searching {
                    query: "transformer attention".to_string()
                },
                PipelineEvent::PagesFound(1),
                PipelineEvent::Analyzing {
                    index: 1,
                    total: 1,
                    title: "Attention".to_string()
                },
                PipelineEvent::Finished { analyzed: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_output_preserves_search_order() {
        let urls: Vec<String> = (1..=4).map(|i| format!("https://arxiv.org/abs/{}", i)).collect();
        let mut documents = MockDocuments::new();
        for (i, url) in urls.iter().enumerate() {
            documents = documents.with_page(url, Some(&format!("Paper {}", i + 1)), "Body.");
        }
        let search = MockSearch::with_urls(urls.iter().map(String::as_str).collect());
        let model = Arc::new(MockModel::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let outcome = pipeline(search, documents, model.clone()).run("q", &config(), &tx).await;

        let RunOutcome::Completed(papers) = outcome else {
            panic!("expected papers");
        };
        let links: Vec<_> = papers.iter().map(|p| p.link.clone()).collect();
        assert_eq!(links, urls);
        assert_eq!(model.max_in_flight(), 1);

        let fractions: Vec<f64> = drain(rx).iter().filter_map(PipelineEvent::fraction).collect();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0]);
    }

    #[tokio::test]
    async fn test_search_failure_skips_analysis() {
        let model = Arc::new(MockModel::new());
        let (tx, rx) = mpsc::unbounded_channel();

        let outcome = pipeline(MockSearch::failing("HTTP 429"), MockDocuments::new(), model.clone())
            .run("q", &config(), &tx)
            .await;

        assert_eq!(outcome, RunOutcome::NoResults);
        assert!(model.prompts().is_empty());
        assert!(drain(rx)
            .iter()
            .any(|e| matches!(e, PipelineEvent::SearchFailed(msg) if msg.contains("HTTP 429"))));
    }

    #[tokio::test]
    async fn test_no_pages_is_no_results() {
        let model = Arc::new(MockModel::new());
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = pipeline(MockSearch::with_urls(vec![]), MockDocuments::new(), model.clone())
            .run("q", &config(), &tx)
            .await;

        assert_eq!(outcome, RunOutcome::NoResults);
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_model_failures_do_not_stop_the_batch() {
        let search = MockSearch::with_urls(vec!["https://a.org/1", "https://a.org/2", "https://a.org/3"]);
        let documents = MockDocuments::new()
            .with_page("https://a.org/1", Some("One"), "Body one.")
            .with_page("https://a.org/2", Some("Two"), "Body two.")
            .with_page("https://a.org/3", Some("Three"), "Body three.");
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = pipeline(search, documents, Arc::new(MockModel::failing("timeout")))
            .run("q", &config(), &tx)
            .await;

        let RunOutcome::Completed(papers) = outcome else {
            panic!("expected papers");
        };
        assert_eq!(papers.len(), 3);
        for paper in &papers {
            assert_eq!(paper.analysis.to_string(), "Analysis error: Failed to send request: timeout");
        }
    }

    #[tokio::test]
    async fn test_closed_event_channel_is_ignored() {
        let search = MockSearch::with_urls(vec!["https://a.org/1"]);
        let documents = MockDocuments::new().with_page("https://a.org/1", Some("One"), "Body.");
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let outcome = pipeline(search, documents, Arc::new(MockModel::new()))
            .run("q", &config(), &tx)
            .await;
        assert!(matches!(outcome, RunOutcome::Completed(ref papers) if papers.len() == 1));
    }
}
