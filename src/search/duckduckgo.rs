//! DuckDuckGo HTML search provider.
//!
//! Scrapes the JavaScript-free results page, which honours `site:`
//! operators and needs no API key.

use super::{SearchError, SearchProvider};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use scraper::{Html, Selector};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Endpoint of the HTML-only results page.
pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Result pages fetched at most per search.
const MAX_PAGES: usize = 4;

/// Searches through DuckDuckGo's HTML frontend.
#[derive(Debug, Clone)]
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
    page_delay: Duration,
}

impl DuckDuckGoSearch {
    pub fn new(user_agent: &str, timeout_seconds: u64, page_delay: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: DUCKDUCKGO_HTML_URL.to_string(),
            page_delay,
        })
    }

    /// Point the provider at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch_results_page(&self, query: &str, offset: usize) -> Result<String, SearchError> {
        let offset_str = offset.to_string();
        let next_str = (offset + 1).to_string();
        let mut form = vec![("q", query)];
        if offset > 0 {
            form.push(("s", offset_str.as_str()));
            form.push(("dc", next_str.as_str()));
        }

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .header(ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        collect_links(
            |offset| self.fetch_results_page(query, offset),
            limit,
            self.page_delay,
        )
        .await
    }
}

/// Walk result pages until `limit` unique links are found, a page adds
/// nothing new, or `MAX_PAGES` is reached.
///
/// Only a failure on the first page is an error; a later failure keeps the
/// links gathered so far.
async fn collect_links<F, Fut>(
    mut fetch_page: F,
    limit: usize,
    page_delay: Duration,
) -> Result<Vec<String>, SearchError>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<String, SearchError>>,
{
    let mut urls: Vec<String> = Vec::new();
    let mut offset = 0;

    for page in 0..MAX_PAGES {
        if page > 0 {
            tokio::time::sleep(page_delay).await;
        }

        let html = match fetch_page(offset).await {
            Ok(html) => html,
            Err(e) if page > 0 => {
                warn!(
                    "Results page {} failed, keeping {} URLs: {}",
                    page + 1,
                    urls.len(),
                    e
                );
                break;
            }
            Err(e) => return Err(e),
        };
        let links = parse_result_links(&html);
        debug!("Results page {} returned {} links", page + 1, links.len());

        let before = urls.len();
        for link in &links {
            if !urls.contains(link) {
                urls.push(link.clone());
            }
            if urls.len() >= limit {
                return Ok(urls);
            }
        }

        if urls.len() == before {
            break;
        }
        offset += links.len();
    }

    Ok(urls)
}

/// Pull organic result URLs out of a results page, in page order.
pub fn parse_result_links(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(link_sel) = Selector::parse("div.result:not(.result--ad) a.result__a") else {
        return Vec::new();
    };

    doc.select(&link_sel)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(decode_result_href)
        .collect()
}

/// Resolve a result href, unwrapping DuckDuckGo's `/l/?uddg=` redirects.
///
/// Returns `None` for anything that is not an external http(s) URL.
fn decode_result_href(href: &str) -> Option<String> {
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let parsed = base.join(href).ok()?;

    let target = if is_duckduckgo_host(&parsed) {
        let uddg = parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())?;
        Url::parse(&uddg).ok()?
    } else {
        parsed
    };

    if !matches!(target.scheme(), "http" | "https") || is_duckduckgo_host(&target) {
        return None;
    }
    Some(target.to_string())
}

fn is_duckduckgo_host(url: &Url) -> bool {
    url.host_str()
        .map(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
        .unwrap_or(false)
}
