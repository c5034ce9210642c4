//! Markdown and JSON report generation.
//!
//! Both renderings are pure functions of the papers, the query and the
//! timestamp, so the same inputs always give byte-identical output.

use crate::models::{Analysis, AnalyzedPaper};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

/// Generate the markdown literature review.
pub fn generate_markdown_report(
    papers: &[AnalyzedPaper],
    query: &str,
    generated_at: NaiveDateTime,
) -> String {
    let mut output = generate_header(query, generated_at);

    for (idx, paper) in papers.iter().enumerate() {
        output.push_str(&generate_paper_section(idx + 1, paper));
    }

    output
}

fn generate_header(query: &str, generated_at: NaiveDateTime) -> String {
    let mut header = String::new();

    header.push_str("# Literature Review Results\n");
    header.push_str(&format!("## Search Query: {}\n", query));
    header.push_str(&format!(
        "*Generated on: {}*\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    header
}

fn generate_paper_section(number: usize, paper: &AnalyzedPaper) -> String {
    let mut section = String::new();

    section.push_str(&format!("\n## {}. {}\n\n", number, paper.title));
    section.push_str(&format!("**Link:** {}\n\n", paper.link));
    section.push_str(&format!("**Description:**\n{}\n\n", paper.body));
    section.push_str(&format!("**AI Analysis:**\n{}\n\n", paper.analysis));
    section.push_str("---\n");

    section
}

/// JSON form of a report.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportDocument {
    pub query: String,
    pub generated_at: String,
    pub papers: Vec<ReportEntry>,
}

/// One paper in the JSON report.
///
/// `analysis_text` is the same text the markdown report shows, including the
/// `Analysis error: ` prefix for failed calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportEntry {
    pub title: String,
    pub link: String,
    pub body: String,
    pub analysis: Analysis,
    pub analysis_text: String,
}

impl From<&AnalyzedPaper> for ReportEntry {
    fn from(paper: &AnalyzedPaper) -> Self {
        Self {
            title: paper.title.clone(),
            link: paper.link.clone(),
            body: paper.body.clone(),
            analysis: paper.analysis.clone(),
            analysis_text: paper.analysis.to_string(),
        }
    }
}

/// Generate a JSON report.
pub fn generate_json_report(
    papers: &[AnalyzedPaper],
    query: &str,
    generated_at: NaiveDateTime,
) -> Result<String> {
    let document = ReportDocument {
        query: query.to_string(),
        generated_at: generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        papers: papers.iter().map(ReportEntry::from).collect(),
    };
    serde_json::to_string_pretty(&document).map_err(Into::into)
}

/// Render the report in the requested format.
pub fn render_report(
    format: OutputFormat,
    papers: &[AnalyzedPaper],
    query: &str,
    generated_at: NaiveDateTime,
) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(generate_markdown_report(papers, query, generated_at)),
        OutputFormat::Json => generate_json_report(papers, query, generated_at),
    }
}

/// Default download name, e.g. `literature_review_20240131_094500.md`.
pub fn report_filename(generated_at: NaiveDateTime, format: OutputFormat) -> String {
    format!(
        "literature_review_{}.{}",
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Write a rendered report to disk.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
