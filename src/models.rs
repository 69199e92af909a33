//! Data models shared by the collector and the analyzer.
//!
//! - [`ArticleMap`]: cached page text keyed by document key
//! - [`QuerySpec`]: one declarative analysis query
//! - [`PreparedSection`] / [`AnsweredSection`]: a query turned into prompts,
//!   and the same prompts paired with the model's answers
//! - [`AnalysisReport`]: everything answered during one run

use serde::Deserialize;
use std::collections::BTreeMap;

/// Cached page text keyed by document key (the cache filename stem).
///
/// A `BTreeMap` keeps the per-source section in a stable, sorted order.
pub type ArticleMap = BTreeMap<String, String>;

/// Default truncation bound for the per-source headline query.
pub const HEADLINES_LIMIT: usize = 1000;
/// Default truncation bound for queries on a single named source.
pub const NAMED_SOURCE_LIMIT: usize = 1500;
/// Default truncation bound for queries over the combined text of all sources.
pub const AGGREGATE_LIMIT: usize = 5000;

/// One analysis query.
///
/// The `kind` tag selects the prompt template; `name` picks the source for
/// the single-source kinds; `limit` is the character budget of source text
/// placed in the prompt.
///
/// ```yaml
/// - kind: trends
///   name: spiegel.de
///   limit: 1500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum QuerySpec {
    /// Summarize the headlines of every cached source, one prompt each.
    Headlines {
        #[serde(default = "default_headlines_limit")]
        limit: usize,
    },
    /// List emerging trends on one named source.
    Trends {
        name: String,
        #[serde(default = "default_named_limit")]
        limit: usize,
    },
    /// Creative summary of one named source.
    CreativeSummary {
        name: String,
        #[serde(default = "default_named_limit")]
        limit: usize,
    },
    /// Major trends across the combined text of all sources.
    LandscapeTrends {
        #[serde(default = "default_aggregate_limit")]
        limit: usize,
    },
    /// Technology and AI coverage across the combined text of all sources.
    TechnologyCoverage {
        #[serde(default = "default_aggregate_limit")]
        limit: usize,
    },
}

fn default_headlines_limit() -> usize {
    HEADLINES_LIMIT
}

fn default_named_limit() -> usize {
    NAMED_SOURCE_LIMIT
}

fn default_aggregate_limit() -> usize {
    AGGREGATE_LIMIT
}

impl QuerySpec {
    /// The five queries run when no plan file overrides them.
    pub fn defaults() -> Vec<QuerySpec> {
        vec![
            QuerySpec::Headlines {
                limit: HEADLINES_LIMIT,
            },
            QuerySpec::Trends {
                name: "spiegel.de".to_string(),
                limit: NAMED_SOURCE_LIMIT,
            },
            QuerySpec::CreativeSummary {
                name: "dw.com".to_string(),
                limit: NAMED_SOURCE_LIMIT,
            },
            QuerySpec::LandscapeTrends {
                limit: AGGREGATE_LIMIT,
            },
            QuerySpec::TechnologyCoverage {
                limit: AGGREGATE_LIMIT,
            },
        ]
    }

    /// Section heading printed above this query's answers.
    pub fn title(&self) -> String {
        match self {
            QuerySpec::Headlines { .. } => "Summaries for individual pages".to_string(),
            QuerySpec::Trends { name, .. } => format!("Emerging trends on {name}"),
            QuerySpec::CreativeSummary { name, .. } => format!("Creative summary for {name}"),
            QuerySpec::LandscapeTrends { .. } => "Overall European news trends".to_string(),
            QuerySpec::TechnologyCoverage { .. } => {
                "Technology and AI coverage analysis".to_string()
            }
        }
    }
}

/// A single prompt ready to send, with an optional label naming its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPrompt {
    pub label: Option<String>,
    pub prompt: String,
}

/// A query resolved against the loaded articles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSection {
    /// 1-based position of the query in the plan.
    pub number: usize,
    pub title: String,
    pub prompts: Vec<PreparedPrompt>,
}

/// One model answer, labelled like the prompt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub label: Option<String>,
    pub text: String,
}

/// A section after every prompt in it has been answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredSection {
    pub number: usize,
    pub title: String,
    pub answers: Vec<Answer>,
}

/// All answers produced by one run, with the metadata needed to file it.
#[derive(Debug)]
pub struct AnalysisReport {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// "morning", "afternoon", or "evening".
    pub time_of_day: String,
    /// The exact local time of the run.
    pub local_time: String,
    /// The model that answered the prompts.
    pub model: String,
    /// Number of cached sources the analysis read.
    pub source_count: usize,
    pub sections: Vec<AnsweredSection>,
}
