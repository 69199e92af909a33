//! Turns the cached articles into prompts and collects the model's answers.
//!
//! Preparation is pure: [`prepare_sections`] resolves each [`QuerySpec`]
//! against the [`ArticleMap`], truncating source text to the query's limit
//! and dropping named-source queries whose source is not cached. Dispatch
//! then sends the prompts one at a time through a [`Generate`]
//! implementation and streams each answer to the report writer.

use crate::api::Generate;
use crate::models::{
    Answer, AnsweredSection, ArticleMap, PreparedPrompt, PreparedSection, QuerySpec,
};
use crate::outputs::stdout;
use crate::utils::truncate_chars;
use itertools::Itertools;
use std::error::Error;
use std::io::Write;
use tracing::{debug, info, instrument};

/// Separator placed between sources in the combined text.
const AGGREGATE_SEPARATOR: &str = "\n\n";

fn headlines_prompt(name: &str, text: &str) -> String {
    format!("Summarize the main headlines and key news on the following page from {name}:\n\n{text}")
}

fn trends_prompt(name: &str, text: &str) -> String {
    format!("From the following content from {name}, list 3 emerging news trends:\n\n{text}")
}

fn creative_summary_prompt(name: &str, text: &str) -> String {
    format!("Provide a creative summary of today's news as presented on {name}:\n\n{text}")
}

fn landscape_trends_prompt(source_count: usize, text: &str) -> String {
    format!(
        "Based on the following combined news articles from {source_count} major European news sources, \
         list 5 major news trends and summarize the overall current news landscape:\n\n{text}"
    )
}

fn technology_coverage_prompt(text: &str) -> String {
    format!(
        "Using the following combined text from various European news sources, \
         analyze and summarize how technology and AI are being covered in today's news. \
         Highlight any emerging themes or concerns:\n\n{text}"
    )
}

/// All cached texts joined with a blank line, in key order.
pub fn combined_text(articles: &ArticleMap) -> String {
    articles.values().join(AGGREGATE_SEPARATOR)
}

/// Resolve one query against the articles.
///
/// Returns `None` when the query names a source that is not cached.
pub fn prepare_section(
    number: usize,
    query: &QuerySpec,
    articles: &ArticleMap,
) -> Option<PreparedSection> {
    let prompts = match query {
        QuerySpec::Headlines { limit } => articles
            .iter()
            .map(|(name, content)| PreparedPrompt {
                label: Some(name.clone()),
                prompt: headlines_prompt(name, truncate_chars(content, *limit)),
            })
            .collect(),
        QuerySpec::Trends { name, limit } => {
            let content = articles.get(name)?;
            vec![PreparedPrompt {
                label: None,
                prompt: trends_prompt(name, truncate_chars(content, *limit)),
            }]
        }
        QuerySpec::CreativeSummary { name, limit } => {
            let content = articles.get(name)?;
            vec![PreparedPrompt {
                label: None,
                prompt: creative_summary_prompt(name, truncate_chars(content, *limit)),
            }]
        }
        QuerySpec::LandscapeTrends { limit } => {
            let combined = combined_text(articles);
            vec![PreparedPrompt {
                label: None,
                prompt: landscape_trends_prompt(articles.len(), truncate_chars(&combined, *limit)),
            }]
        }
        QuerySpec::TechnologyCoverage { limit } => {
            let combined = combined_text(articles);
            vec![PreparedPrompt {
                label: None,
                prompt: technology_coverage_prompt(truncate_chars(&combined, *limit)),
            }]
        }
    };

    Some(PreparedSection {
        number,
        title: query.title(),
        prompts,
    })
}

/// Resolve every query in plan order.
///
/// Section numbers follow the plan position, so a skipped query leaves a
/// gap in the numbering rather than renumbering the rest.
pub fn prepare_sections(queries: &[QuerySpec], articles: &ArticleMap) -> Vec<PreparedSection> {
    queries
        .iter()
        .enumerate()
        .filter_map(|(i, query)| {
            let section = prepare_section(i + 1, query, articles);
            if section.is_none() {
                debug!(
                    number = i + 1,
                    title = %query.title(),
                    "Named source not cached; skipping query"
                );
            }
            section
        })
        .collect()
}

/// Send every prompt in `section` and write the answers to `out` as they arrive.
///
/// # Errors
///
/// The first generation or write failure aborts the section.
#[instrument(level = "info", skip_all, fields(number = section.number, title = %section.title))]
pub async fn answer_section<G, W>(
    model: &G,
    section: &PreparedSection,
    out: &mut W,
) -> Result<AnsweredSection, Box<dyn Error>>
where
    G: Generate,
    W: Write,
{
    stdout::write_section_header(out, section.number, &section.title)?;

    let mut answers = Vec::with_capacity(section.prompts.len());
    for prepared in &section.prompts {
        let text = model.generate(&prepared.prompt).await?;
        stdout::write_answer(out, prepared.label.as_deref(), &text)?;
        answers.push(Answer {
            label: prepared.label.clone(),
            text,
        });
    }

    info!(answers = answers.len(), "Answered section");
    Ok(AnsweredSection {
        number: section.number,
        title: section.title.clone(),
        answers,
    })
}

/// Answer every section in order.
pub async fn answer_sections<G, W>(
    model: &G,
    sections: &[PreparedSection],
    out: &mut W,
) -> Result<Vec<AnsweredSection>, Box<dyn Error>>
where
    G: Generate,
    W: Write,
{
    let mut answered = Vec::with_capacity(sections.len());
    for section in sections {
        answered.push(answer_section(model, section, out).await?);
    }
    Ok(answered)
}
