//! Homepage collector.
//!
//! Asks the content-extraction service for the rendered text of each source
//! and writes it to the cache. A source that cannot be fetched still gets a
//! cache file; its content is the `Error: ...` placeholder.
//!
//! # Request shape
//!
//! ```text
//! GET {extractor_prefix}{source_url}
//! -> { "content": "..." }
//! ```
//!
//! Sources are fetched one after another, one attempt each.

use crate::cache::{document_key, write_document};
use futures::stream::{self, StreamExt, TryStreamExt};
use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Body returned by the extraction service. Only `content` is read.
#[derive(Debug, Deserialize)]
struct ExtractionResponse {
    content: Option<String>,
}

/// The text obtained for one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub url: String,
    pub content: String,
    /// True when `content` is an error placeholder.
    pub failed: bool,
}

/// Counts for one collector pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSummary {
    pub written: usize,
    pub failed: usize,
}

/// HTTP client for the extraction service; `timeout` bounds each request.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

async fn extract(client: &Client, prefix: &str, url: &str) -> Result<String, reqwest::Error> {
    let response = client
        .get(format!("{prefix}{url}"))
        .send()
        .await?
        .error_for_status()?;
    let body: ExtractionResponse = response.json().await?;
    Ok(body.content.unwrap_or_default())
}

/// Fetch the extracted text of one source.
///
/// Never fails: network errors, timeouts, non-success statuses and
/// malformed bodies all come back as a document whose content starts with
/// `Error:`. A body without `content` yields empty text.
#[instrument(level = "info", skip(client, prefix))]
pub async fn fetch_document(client: &Client, prefix: &str, url: &str) -> FetchedDocument {
    match extract(client, prefix, url).await {
        Ok(content) => {
            info!(bytes = content.len(), "Fetched extracted text");
            FetchedDocument {
                url: url.to_string(),
                content,
                failed: false,
            }
        }
        Err(e) => {
            warn!(error = %e, "Extraction failed; caching error placeholder");
            FetchedDocument {
                url: url.to_string(),
                content: format!("Error: {e}"),
                failed: true,
            }
        }
    }
}

/// Fetch every source in order and write one cache file per source.
///
/// # Errors
///
/// Only cache writes can fail this function; fetch failures are cached
/// as placeholders.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), sources = sources.len()))]
pub async fn collect_sources(
    client: &Client,
    prefix: &str,
    sources: &[String],
    dir: &Path,
) -> Result<CollectionSummary, Box<dyn Error>> {
    for key in sources.iter().map(|url| document_key(url)).duplicates() {
        warn!(%key, "Several sources share this cache file; the last one fetched wins");
    }

    let summary = stream::iter(sources)
        .then(|url| async move {
            let document = fetch_document(client, prefix, url).await;
            write_document(dir, &document.url, &document.content).await?;
            Ok::<_, Box<dyn Error>>(document.failed)
        })
        .try_fold(CollectionSummary::default(), |mut summary, failed| async move {
            summary.written += 1;
            if failed {
                summary.failed += 1;
            }
            Ok(summary)
        })
        .await?;

    info!(
        written = summary.written,
        failed = summary.failed,
        "Collected homepage text"
    );
    Ok(summary)
}
