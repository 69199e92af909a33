//! Output generation for the analysis results.
//!
//! # Submodules
//!
//! - [`stdout`]: the plain-text report streamed to standard output
//! - [`markdown`]: the optional Markdown copy of the same report
//!
//! # Output Structure
//!
//! ```text
//! stdout:
//! === Query 1: Summaries for individual pages ===
//!
//! [dw.com]
//! ...
//!
//! report_dir/
//! ├── 2025-05-06_morning.md
//! └── 2025-05-06_evening.md
//! ```

pub mod markdown;
pub mod stdout;
