//! Run configuration: the source list, the query plan, and the Gemini settings.
//!
//! Everything here is resolved once at startup and handed to the stages as
//! plain values. Problems surface as [`ConfigError`] before any network call.

use crate::models::QuerySpec;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

/// Default Gemini model when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default content-extraction prefix; the target URL is appended verbatim.
pub const DEFAULT_EXTRACTOR_URL: &str = "https://r.jina.ai/";

/// European news homepages fetched when no plan file overrides them.
pub const DEFAULT_SOURCES: &[&str] = &[
    "https://www.spiegel.de",
    "https://www.sueddeutsche.de",
    "https://www.faz.net",
    "https://www.welt.de",
    "https://www.tagesschau.de",
    "https://www.n-tv.de",
    "https://www.handelsblatt.com",
    "https://www.dw.com",
    "https://www.bild.de",
    "https://www.heise.de",
    "https://www.lemonde.fr",
    "https://www.lefigaro.fr",
    "https://www.corriere.it",
    "https://www.repubblica.it",
    "https://www.theguardian.com",
    "https://www.elpais.com",
    "https://www.lavanguardia.com",
    "https://www.euronews.com",
    "https://www.ft.com",
    "https://www.diepresse.com",
];

/// Configuration problems detected at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No Gemini API key was provided.
    #[error("GEMINI_API_KEY not set (pass --api-key or export GEMINI_API_KEY)")]
    MissingApiKey,

    /// The model name is empty.
    #[error("Gemini model name must not be empty")]
    EmptyModel,

    /// The plan lists no sources.
    #[error("Run plan at {} lists no sources", .0.display())]
    NoSources(PathBuf),

    /// A source entry is not an absolute URL.
    #[error("Invalid source URL `{url}`: {reason}")]
    InvalidSource { url: String, reason: String },

    /// The plan file could not be read.
    #[error("Failed to read run plan {}: {}", .path.display(), .source)]
    PlanRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The plan file is not valid YAML for a [`RunPlan`].
    #[error("Failed to parse run plan {}: {}", .path.display(), .source)]
    PlanParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Sampling settings sent with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: 500,
            temperature: 0.3,
        }
    }
}

/// Everything needed to talk to Gemini.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("generation", &self.generation)
            .finish()
    }
}

impl GeminiConfig {
    /// Build a config from an optional key, rejecting a missing or blank key.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        let model = model.into().trim().to_string();
        if model.is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        Ok(Self {
            api_key,
            model,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            generation: GenerationConfig::default(),
        })
    }
}

/// Which sources to fetch and which queries to ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub sources: Vec<String>,
    pub queries: Vec<QuerySpec>,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            queries: QuerySpec::defaults(),
        }
    }
}

/// On-disk shape of a plan file; both lists are optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlanFile {
    sources: Option<Vec<String>>,
    queries: Option<Vec<QuerySpec>>,
}

impl RunPlan {
    /// Load a plan from YAML, falling back to the defaults for omitted lists.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PlanRead {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = Self::from_yaml(&raw, path)?;
        info!(
            sources = plan.sources.len(),
            queries = plan.queries.len(),
            "Loaded run plan"
        );
        Ok(plan)
    }

    fn from_yaml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: PlanFile =
            serde_yaml::from_str(raw).map_err(|source| ConfigError::PlanParse {
                path: path.to_path_buf(),
                source,
            })?;
        let defaults = RunPlan::default();
        let plan = RunPlan {
            sources: file.sources.unwrap_or(defaults.sources),
            queries: file.queries.unwrap_or(defaults.queries),
        };
        if plan.sources.is_empty() {
            return Err(ConfigError::NoSources(path.to_path_buf()));
        }
        plan.validate_sources()?;
        Ok(plan)
    }

    fn validate_sources(&self) -> Result<(), ConfigError> {
        for source in &self.sources {
            let parsed = Url::parse(source).map_err(|e| ConfigError::InvalidSource {
                url: source.clone(),
                reason: e.to_string(),
            })?;
            if parsed.host_str().is_none() {
                return Err(ConfigError::InvalidSource {
                    url: source.clone(),
                    reason: "missing host".to_string(),
                });
            }
        }
        Ok(())
    }
}
