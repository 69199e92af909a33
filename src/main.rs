//! # Awful Front Pages
//!
//! Caches the rendered text of a list of European news homepages and asks
//! Gemini to summarize and compare what they lead with.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... awful_front_pages -o ./data/front_pages -r ./reports
//! ```
//!
//! ## Architecture
//!
//! The application runs two stages, strictly one request at a time:
//! 1. **Collecting**: fetch each homepage through the extraction service and
//!    write one `.md` cache file per source (errors are cached as text)
//! 2. **Analyzing**: reload the whole cache directory, build the prompts for
//!    each query in the plan, and print Gemini's answers section by section

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod analyzer;
mod api;
mod cache;
mod cli;
mod collector;
mod config;
mod models;
mod outputs;
mod utils;

use api::GeminiClient;
use cli::Cli;
use config::{GeminiConfig, RunPlan};
use models::AnalysisReport;
use outputs::markdown;
use utils::{edition_for, ensure_writable_dir};

/// Counts from one pipeline run, logged once at exit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RunSummary {
    fetched: usize,
    failed: usize,
    sections: usize,
}

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("front_pages starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, ?args.plan, ?args.report_dir, "Parsed CLI arguments");

    let mut stdout = std::io::stdout().lock();
    let summary = run(&args, &mut stdout).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        fetched = summary.fetched,
        failed = summary.failed,
        sections = summary.sections,
        "Execution complete"
    );

    Ok(())
}

/// Run the collect and analyze stages for `args`, writing answers to `out`.
///
/// Configuration is resolved before any request is sent, so a missing API
/// key fails without touching the extraction service.
async fn run<W: Write>(args: &Cli, out: &mut W) -> Result<RunSummary, Box<dyn Error>> {
    let mut summary = RunSummary::default();

    // ---- Configuration ----
    let plan = match &args.plan {
        Some(path) => RunPlan::load(path)?,
        None => RunPlan::default(),
    };
    let gemini_config = if args.collect_only {
        None
    } else {
        Some(GeminiConfig::new(
            args.api_key.clone(),
            args.model.clone(),
            args.gemini_base_url.clone(),
        )?)
    };

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Cache directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Collect ----
    if args.skip_fetch {
        info!("Skipping fetch; analyzing existing cache");
    } else {
        let client = collector::build_client(Duration::from_secs(args.fetch_timeout_secs))?;
        let collected = collector::collect_sources(
            &client,
            &args.extractor_url,
            &plan.sources,
            &args.output_dir,
        )
        .await?;
        summary.fetched = collected.written;
        summary.failed = collected.failed;
    }

    let Some(gemini_config) = gemini_config else {
        info!(fetched = summary.fetched, failed = summary.failed, "Collection complete");
        return Ok(summary);
    };

    // ---- Analyze ----
    let articles = cache::load_articles(&args.output_dir).await?;
    let sections = analyzer::prepare_sections(&plan.queries, &articles);
    info!(
        sources = articles.len(),
        sections = sections.len(),
        "Prepared analysis sections"
    );

    let model = GeminiClient::new(gemini_config)?;
    let answered = analyzer::answer_sections(&model, &sections, out).await?;
    summary.sections = answered.len();

    if let Some(report_dir) = &args.report_dir {
        let now = Local::now();
        let report = AnalysisReport {
            local_date: now.date_naive().to_string(),
            time_of_day: edition_for(now.time()).to_string(),
            local_time: now.time().format("%H:%M:%S").to_string(),
            model: model.model().to_string(),
            source_count: articles.len(),
            sections: answered,
        };
        if let Err(e) = markdown::write_report(report_dir, &report).await {
            error!(error = %e, "Failed to write Markdown report");
        }
    }

    Ok(summary)
}
