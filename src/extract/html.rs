//! HTTP document source backed by reqwest and scraper.

use super::{DocumentSource, ExtractionError, ParsedDocument};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use tracing::debug;

/// Browser-like user agent; many publisher sites reject unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Bodies larger than this are cut before parsing.
const MAX_DOWNLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Content regions shorter than this fall through to the next selector.
const MIN_REGION_CHARS: usize = 100;

const SKIP_TAGS: &[&str] = &[
    "script", "style", "nav", "header", "footer", "noscript", "svg", "aside", "form", "iframe",
    "button",
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "td", "th", "article",
    "section", "main", "blockquote", "pre", "figcaption", "dt", "dd",
];

/// Fetches pages over HTTP and parses HTML into title and text.
#[derive(Debug, Clone)]
pub struct HttpDocumentSource {
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl HttpDocumentSource {
    pub fn new(user_agent: &str, timeout_seconds: u64) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_seconds))
            .connect_timeout(Duration::from_secs(timeout_seconds.min(10)))
            .build()?;

        Ok(Self {
            client,
            timeout_seconds,
        })
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> Result<ParsedDocument, ExtractionError> {
        debug!("Fetching {}", url);

        let mut response = self
            .client
            .get(url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    ExtractionError::Connect(e.to_string())
                } else {
                    ExtractionError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        // PDFs are fetched successfully but carry no text we can read.
        if content_type.contains("application/pdf") {
            debug!("{} is a PDF, skipping body", url);
            return Ok(ParsedDocument::default());
        }

        let is_html = content_type.is_empty()
            || content_type.contains("text/html")
            || content_type.contains("application/xhtml");
        let is_plain = content_type.contains("text/plain");
        if !is_html && !is_plain {
            return Err(ExtractionError::UnsupportedContentType(content_type));
        }

        let mut bytes = Vec::new();
        loop {
            let chunk = response.chunk().await.map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Timeout(self.timeout_seconds)
                } else {
                    ExtractionError::Body(e.to_string())
                }
            })?;
            let Some(chunk) = chunk else { break };
            if push_capped(&mut bytes, &chunk, MAX_DOWNLOAD_BYTES) {
                debug!("{} exceeds {} bytes, body cut", url, MAX_DOWNLOAD_BYTES);
                break;
            }
        }
        let body = decode_capped(bytes);

        if is_html {
            Ok(parse_html(&body))
        } else {
            Ok(ParsedDocument {
                title: None,
                text: body,
            })
        }
    }
}

/// Append `chunk` without letting `buf` grow past `max_bytes`.
///
/// Returns true once the cap is reached.
fn push_capped(buf: &mut Vec<u8>, chunk: &[u8], max_bytes: usize) -> bool {
    let room = max_bytes.saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    buf.len() >= max_bytes
}

/// Decode a possibly cut body, dropping a code point split by the cut.
fn decode_capped(mut bytes: Vec<u8>) -> String {
    let split_at = match std::str::from_utf8(&bytes) {
        Err(e) if e.error_len().is_none() => Some(e.valid_up_to()),
        _ => None,
    };
    if let Some(len) = split_at {
        bytes.truncate(len);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse an HTML document into its title and readable text.
pub fn parse_html(html: &str) -> ParsedDocument {
    let doc = Html::parse_document(html);
    ParsedDocument {
        title: extract_title(&doc),
        text: extract_text(&doc),
    }
}

fn extract_title(doc: &Html) -> Option<String> {
    let meta_titles = [
        "meta[name=\"citation_title\"]",
        "meta[property=\"og:title\"]",
        "meta[name=\"twitter:title\"]",
    ];
    for css in meta_titles {
        let found = select_first(doc, css)
            .and_then(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(title) = found {
            return Some(title.to_string());
        }
    }

    for css in ["title", "h1"] {
        if let Some(el) = select_first(doc, css) {
            let title = el.text().collect::<String>();
            let title = title.trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }
    }

    None
}

fn extract_text(doc: &Html) -> String {
    // Focused content regions first.
    for css in ["article", "main", "[role=\"main\"]"] {
        if let Some(el) = select_first(doc, css) {
            let text = element_text(&el);
            if text.chars().count() >= MIN_REGION_CHARS {
                return text;
            }
        }
    }

    if let Some(body) = select_first(doc, "body") {
        return element_text(&body);
    }

    doc.root_element().text().collect::<Vec<_>>().join(" ")
}

fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector).next()
}

fn element_text(el: &ElementRef<'_>) -> String {
    let mut buf = String::new();
    collect_text(el, &mut buf);
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(node: &ElementRef<'_>, buf: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                if BLOCK_TAGS.contains(&tag) {
                    buf.push(' ');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, buf);
                }
            }
            _ => {}
        }
    }
}
