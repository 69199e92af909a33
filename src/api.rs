//! Gemini `generateContent` client.
//!
//! # Architecture
//!
//! - [`Generate`]: trait the analyzer talks to, so tests can stand in for the
//!   model
//! - [`GeminiClient`]: REST implementation against
//!   `POST {base_url}/models/{model}:generateContent`
//!
//! Every request carries the configured `maxOutputTokens` and `temperature`.
//! Calls are made once; any failure is returned to the caller.

use crate::config::{GeminiConfig, GenerationConfig};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Trait for async text generation.
///
/// Implementors take a prompt and return the model's text.
pub trait Generate {
    /// Send `prompt` to the model and return its reply.
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: RequestGenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGenerationConfig {
    max_output_tokens: u32,
    temperature: f64,
}

impl From<GenerationConfig> for RequestGenerationConfig {
    fn from(config: GenerationConfig) -> Self {
        Self {
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts joined in order.
    fn into_text(self) -> Result<String, GeminiError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let feedback = self
                .prompt_feedback
                .map(|f| format!("(prompt feedback: {f})"))
                .unwrap_or_default();
            return Err(GeminiError::NoCandidates(feedback));
        };
        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default())
    }
}

/// Failures reported by the Gemini API itself.
#[derive(thiserror::Error, Debug)]
pub enum GeminiError {
    /// Non-success HTTP status with the response body.
    #[error("Gemini API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response carried no candidates (usually a blocked prompt).
    #[error("Gemini API returned no candidates {0}")]
    NoCandidates(String),
}

/// Gemini REST client.
///
/// Holds its own HTTP client without an overall request timeout; generation
/// can take as long as the service needs.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

impl Generate for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.config.model, prompt_chars = prompt.chars().count()))]
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: self.config.generation.into(),
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Gemini call failed"
            );
            return Err(Box::new(GeminiError::Status {
                status: status.as_u16(),
                body,
            }));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.into_text()?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            reply_chars = text.chars().count(),
            "Gemini call succeeded"
        );
        debug!(reply = %crate::utils::truncate_for_log(&text, 200), "Gemini reply");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        let config =
            GeminiConfig::new(Some("test-key".to_string()), DEFAULT_MODEL, server.uri()).unwrap();
        GeminiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_sampling_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "Summarize this" }] }],
                "generationConfig": { "maxOutputTokens": 500, "temperature": 0.3 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] },
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).generate("Summarize this").await.unwrap();

        assert_eq!(reply, "Hello world");
    }

    #[tokio::test]
    async fn test_generate_propagates_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("prompt").await.unwrap_err();

        let gemini = err.downcast_ref::<GeminiError>().expect("GeminiError");
        match gemini {
            GeminiError::Status { status, body } => {
                assert_eq!(*status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_generate_without_candidates_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("prompt").await.unwrap_err();

        assert!(err.to_string().contains("no candidates"));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_generate_candidate_without_text_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "finishReason": "MAX_TOKENS" }]
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server).generate("prompt").await.unwrap();

        assert_eq!(reply, "");
    }

    #[test]
    fn test_endpoint_uses_model_override() {
        let config = GeminiConfig::new(
            Some("k".to_string()),
            "gemini-1.5-pro",
            "https://generativelanguage.googleapis.com/v1beta/",
        )
        .unwrap();
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(client.model(), "gemini-1.5-pro");
    }
}
