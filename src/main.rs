//! LitReview - AI-assisted literature review
//!
//! A CLI tool that searches academic sites for a topic, extracts each
//! result page, asks an Ollama model to analyze it and writes a
//! markdown review.
//!
//! Exit codes:
//!   0 - Success (report written, or no papers found)
//!   1 - Runtime or validation error

mod cli;
mod config;
mod extract;
mod llm;
#[cfg(test)]
mod mock;
mod models;
mod pipeline;
mod report;
mod search;
mod text;

use anyhow::{Context, Result};
use chrono::Local;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use extract::{FrequencySummarizer, HttpDocumentSource, PageExtractor};
use indicatif::{ProgressBar, ProgressStyle};
use llm::{OllamaClient, OllamaConfig, PaperAnalyzer};
use models::{RunSummary, SearchConfig, SUGGESTED_DOMAINS};
use pipeline::{Pipeline, PipelineEvent, RunOutcome};
use search::{AcademicSearch, DuckDuckGoSearch, RequestGate};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("⚠️  {}", e);
        std::process::exit(1);
    }

    // Handle --init-config and --list-domains early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }
    if args.list_domains {
        println!("Suggested search domains:");
        for domain in SUGGESTED_DOMAINS {
            println!("  {}", domain);
        }
        return Ok(());
    }

    init_logging(&args)?;

    info!("LitReview v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_review(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Review failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .litreview.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize domains, delays, model, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` overrides the level derived from --verbose/--quiet.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("litreview={}", args.log_level())));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the complete review workflow. Returns the exit code.
async fn run_review(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    if !args.dry_run {
        config.validate().map_err(anyhow::Error::msg)?;
    }

    let query = args.query_text().to_string();
    let search_config = SearchConfig::new(config.search.max_results, &config.search.domains)
        .context("Invalid search settings")?;

    let search = build_search(&config)?;

    if args.dry_run {
        return handle_dry_run(&search, &query, &search_config).await;
    }

    println!("🤖 Model: {} ({})", config.model.name, config.model.ollama_url);
    let model = OllamaClient::new(OllamaConfig {
        ollama_url: config.model.ollama_url.clone(),
        model_name: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    })
    .context("Failed to create Ollama client")?;

    let pipeline = Pipeline::new(search, PaperAnalyzer::new(Arc::new(model)));
    debug!("Analyzing with model {}", pipeline.analyzer().model_name());

    // Run the pipeline while a separate task renders its progress
    let (tx, rx) = mpsc::unbounded_channel();
    let progress = tokio::spawn(render_progress(rx, args.quiet));
    let outcome = pipeline.run(&query, &search_config, &tx).await;
    drop(tx);
    if let Err(e) = progress.await {
        warn!("Progress display stopped: {}", e);
    }

    let papers = match outcome {
        RunOutcome::NoResults => {
            println!("\n📭 No papers found. Try modifying your search query.");
            return Ok(0);
        }
        RunOutcome::Completed(papers) => papers,
    };

    // Generate and save the report
    let generated_at = Local::now().naive_local();
    let format = config.report.format;
    let output = report::render_report(format, &papers, &query, generated_at)?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(report::report_filename(generated_at, format)));
    report::write_report(&output, &output_path)?;

    let summary = RunSummary::from_papers(&papers);
    println!("\n📊 Review Summary:");
    println!("   Papers analyzed: {}", summary.total);
    if summary.inaccessible > 0 {
        println!("   Inaccessible pages: {}", summary.inaccessible);
    }
    if summary.analysis_failures > 0 {
        println!("   Analysis failures: {}", summary.analysis_failures);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Literature review saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Wire the search provider, page extractor and request gate together.
fn build_search(config: &Config) -> Result<AcademicSearch> {
    let documents = HttpDocumentSource::new(&config.extract.user_agent, config.extract.timeout_seconds)
        .context("Failed to create HTTP client")?;
    let extractor = PageExtractor::new(
        Arc::new(documents),
        Arc::new(FrequencySummarizer::new(config.extract.summary_sentences)),
        config.extract.max_body_chars,
    );

    let provider = DuckDuckGoSearch::new(
        &config.extract.user_agent,
        config.extract.timeout_seconds,
        config.search.page_delay(),
    )
    .context("Failed to create search client")?;

    Ok(AcademicSearch::new(
        Arc::new(provider),
        extractor,
        RequestGate::fixed_interval(config.search.delay()),
    ))
}

/// Drain pipeline events into a progress bar.
async fn render_progress(mut events: mpsc::UnboundedReceiver<PipelineEvent>, quiet: bool) {
    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = events.recv().await {
        match event {
            PipelineEvent::Searching { query } => {
                if !quiet {
                    println!("🔍 Searching for papers on: {}", query);
                }
            }
            PipelineEvent::SearchFailed(message) => {
                eprintln!("❌ Search error: {}", message);
            }
            PipelineEvent::PagesFound(count) => {
                if !quiet && count > 0 {
                    println!("📚 Found {} readable pages\n", count);
                    let pb = ProgressBar::new(count as u64);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("#>-"),
                    );
                    bar = Some(pb);
                }
            }
            PipelineEvent::Analyzing { index, total, .. } => {
                if let Some(ref pb) = bar {
                    pb.set_position(index as u64);
                    pb.set_message(format!("📑 Analyzing paper {} of {}", index, total));
                }
            }
            PipelineEvent::Finished { .. } => {
                if let Some(pb) = bar.take() {
                    pb.finish_and_clear();
                }
            }
        }
    }
}

/// Handle --dry-run: search and extract, print the pages, no model calls.
async fn handle_dry_run(search: &AcademicSearch, query: &str, config: &SearchConfig) -> Result<i32> {
    println!("\n🔍 Dry run: searching and extracting (no LLM calls)...\n");

    let pages = search.search_papers(query, config).await;

    if pages.is_empty() {
        println!("   📭 No papers found. Try modifying your search query.");
    } else {
        println!("   Found {} pages that would be analyzed:\n", pages.len());
        for page in &pages {
            println!("     📄 {}", page.title);
            println!("        {}", page.link);
        }
    }

    println!("\n✅ Dry run complete. No LLM calls were made.");
    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
