//! Utility functions for edition naming, string truncation, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Edition classification for report naming
//! - Character-bounded truncation for prompts and log previews
//! - File system validation for the cache and report directories

use chrono::{NaiveTime, Timelike};
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Classify a local time into morning, afternoon, or evening.
///
/// The boundaries are:
/// - **Morning**: 00:00 - 08:00
/// - **Afternoon**: 08:00 - 16:00
/// - **Evening**: 16:00 - 24:00
pub fn edition_for(time: NaiveTime) -> &'static str {
    match time.hour() {
        0..=7 => "morning",
        8..=15 => "afternoon",
        _ => "evening",
    }
}

/// Cut `s` down to at most `max` characters.
///
/// This is a plain prefix cut on `char` boundaries; it never splits a
/// multi-byte character and never allocates.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("Grüße", 3), "Grü");
/// assert_eq!(truncate_chars("abc", 10), "abc");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the
/// number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let head = truncate_chars(s, max);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", head, s.len() - head.len())
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory (and its parents) if missing, then writes and
/// removes a scratch file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(path).await?;
    // Try a small sync write using std fs (simpler error surface)
    let scratch_path = path.join("..__write_check__");
    match stdfs::File::create(&scratch_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&scratch_path);
            info!("Directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
