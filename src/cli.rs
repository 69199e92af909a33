//! Command-line interface definitions for Awful Front Pages.
//!
//! All arguments can be provided via command-line flags; the Gemini and
//! extractor settings also fall back to environment variables.

use crate::config::{DEFAULT_EXTRACTOR_URL, DEFAULT_GEMINI_BASE_URL, DEFAULT_MODEL};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the Awful Front Pages application.
///
/// # Examples
///
/// ```sh
/// # Fetch the default homepages and analyze them
/// GEMINI_API_KEY=... awful_front_pages
///
/// # Re-run the analysis on yesterday's cache and keep a Markdown copy
/// awful_front_pages --skip-fetch -r ./reports
///
/// # Only refresh the cache
/// awful_front_pages --collect-only -o ./cache
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding one cached `.md` file per source
    #[arg(short, long, default_value = "data/front_pages")]
    pub output_dir: PathBuf,

    /// YAML run plan overriding the source list and/or the queries
    #[arg(short, long)]
    pub plan: Option<PathBuf>,

    /// Also write the answers as Markdown into this directory
    #[arg(short, long)]
    pub report_dir: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Gemini REST base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// Content-extraction prefix; each source URL is appended to it
    #[arg(long, env = "EXTRACTOR_URL", default_value = DEFAULT_EXTRACTOR_URL)]
    pub extractor_url: String,

    /// Per-request timeout for the extraction service, in seconds
    #[arg(long, default_value_t = 15)]
    pub fetch_timeout_secs: u64,

    /// Analyze whatever is already cached without fetching
    #[arg(long)]
    pub skip_fetch: bool,

    /// Refresh the cache and stop; no API key required
    #[arg(long, conflicts_with_all = ["skip_fetch", "report_dir"])]
    pub collect_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["awful_front_pages"]).unwrap();

        assert_eq!(cli.output_dir, PathBuf::from("data/front_pages"));
        assert_eq!(cli.extractor_url, "https://r.jina.ai/");
        assert_eq!(cli.fetch_timeout_secs, 15);
        assert!(cli.plan.is_none());
        assert!(cli.report_dir.is_none());
        assert!(!cli.skip_fetch);
        assert!(!cli.collect_only);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::try_parse_from([
            "awful_front_pages",
            "-o",
            "/tmp/cache",
            "-p",
            "plan.yaml",
            "-r",
            "/tmp/reports",
        ])
        .unwrap();

        assert_eq!(cli.output_dir, PathBuf::from("/tmp/cache"));
        assert_eq!(cli.plan, Some(PathBuf::from("plan.yaml")));
        assert_eq!(cli.report_dir, Some(PathBuf::from("/tmp/reports")));
    }

    #[test]
    fn test_cli_explicit_gemini_settings() {
        let cli = Cli::try_parse_from([
            "awful_front_pages",
            "--api-key",
            "abc",
            "--model",
            "gemini-1.5-pro",
            "--skip-fetch",
        ])
        .unwrap();

        assert_eq!(cli.api_key.as_deref(), Some("abc"));
        assert_eq!(cli.model, "gemini-1.5-pro");
        assert!(cli.skip_fetch);
    }

    #[test]
    fn test_collect_only_conflicts_with_skip_fetch() {
        let result = Cli::try_parse_from(["awful_front_pages", "--collect-only", "--skip-fetch"]);
        assert!(result.is_err());
    }
}
