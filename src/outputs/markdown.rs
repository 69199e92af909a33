//! Markdown copy of the analysis report.
//!
//! One file per edition: `{report_dir}/{date}_{time_of_day}.md`. A second
//! run in the same edition replaces the file.

use crate::models::AnalysisReport;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Render the report as Markdown.
///
/// Per-source answers become `###` subsections named after the source.
pub fn report_to_markdown(report: &AnalysisReport) -> String {
    let mut md = format!(
        "# European front pages, {} {}\n\n_{} sources analyzed with `{}` at {}_\n",
        report.local_date, report.time_of_day, report.source_count, report.model, report.local_time
    );

    for section in &report.sections {
        md.push_str(&format!("\n## Query {}: {}\n", section.number, section.title));
        if section.answers.is_empty() {
            md.push_str("\n_No cached sources._\n");
        }
        for answer in &section.answers {
            if let Some(label) = &answer.label {
                md.push_str(&format!("\n### {label}\n"));
            }
            md.push('\n');
            md.push_str(answer.text.trim_end());
            md.push('\n');
        }
    }
    md
}

/// Path of the report file for this edition.
pub fn report_path(report_dir: &Path, report: &AnalysisReport) -> PathBuf {
    report_dir.join(format!("{}_{}.md", report.local_date, report.time_of_day))
}

/// Write the report under `report_dir`, creating the directory if needed.
#[instrument(level = "info", skip_all, fields(report_dir = %report_dir.display()))]
pub async fn write_report(
    report_dir: &Path,
    report: &AnalysisReport,
) -> Result<PathBuf, Box<dyn Error>> {
    ensure_writable_dir(report_dir).await?;
    let path = report_path(report_dir, report);
    fs::write(&path, report_to_markdown(report)).await?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
