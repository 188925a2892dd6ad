/// LLM Client: the single point of entry for generative-model calls in Go Career.
///
/// Every AI path goes through the [`TextModel`] trait so the advisor and the
/// roadmap planner never talk HTTP themselves. `GeminiClient` is the production
/// implementation; tests substitute a scripted model.
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod retry;
#[cfg(test)]
pub mod testing;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Failure of one AI attempt, after the raw text came back (or didn't).
#[derive(Debug, Error)]
pub enum AiError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("failed to parse AI response as JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid AI response format: {0}")]
    InvalidFormat(String),

    #[error("no valid items left after validation")]
    NoUsableItems,

    #[error("model returned an empty result set")]
    EmptyResult,
}

impl AiError {
    /// A literal empty result is a terminal answer; everything else is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::EmptyResult)
    }
}

/// An opaque, possibly slow, possibly unreliable text generator.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GenerateResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Gemini `generateContent` client. One HTTP call per `generate`; retries
/// belong to the callers' [`retry::RetryPolicy`].
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, LlmError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);
        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        parsed.text().ok_or(LlmError::EmptyContent)
    }
}

static JSON_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\[.*\]").expect("static regex"));
static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("static regex"));

/// Pulls the outermost `[ ... ]` block out of free text; falls back to
/// stripping code fences when there is none.
pub fn extract_json_array(text: &str) -> &str {
    JSON_ARRAY
        .find(text)
        .map(|m| m.as_str())
        .unwrap_or_else(|| strip_json_fences(text))
}

/// Pulls the outermost `{ ... }` block out of free text; falls back to
/// stripping code fences when there is none.
pub fn extract_json_object(text: &str) -> &str {
    JSON_OBJECT
        .find(text)
        .map(|m| m.as_str())
        .unwrap_or_else(|| strip_json_fences(text))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// First `limit` characters of a model reply, for log lines.
pub fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n[{\"key\": \"value\"}]\n```";
        assert_eq!(strip_json_fences(input), "[{\"key\": \"value\"}]");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_array_ignores_surrounding_prose() {
        let input = "Here are your careers:\n[{\"title\": \"Nurse\"}]\nGood luck!";
        assert_eq!(extract_json_array(input), "[{\"title\": \"Nurse\"}]");
    }

    #[test]
    fn test_fenced_and_unfenced_arrays_parse_identically() {
        let unfenced = r#"[{"title": "Electrician", "salary_max": 30000}]"#;
        let fenced = format!("```json\n{unfenced}\n```");

        let a: serde_json::Value = serde_json::from_str(extract_json_array(unfenced)).unwrap();
        let b: serde_json::Value = serde_json::from_str(extract_json_array(&fenced)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extract_json_array_falls_back_to_fence_stripping() {
        assert_eq!(extract_json_array("```json\nnull\n```"), "null");
    }

    #[test]
    fn test_extract_json_object_from_fenced_reply() {
        let input = "```json\n{\"summary\": \"s\"}\n```";
        assert_eq!(extract_json_object(input), "{\"summary\": \"s\"}");
    }

    #[test]
    fn test_empty_result_is_not_retryable() {
        assert!(!AiError::EmptyResult.is_retryable());
        assert!(AiError::NoUsableItems.is_retryable());
        assert!(AiError::InvalidFormat("x".to_string()).is_retryable());
    }

    #[test]
    fn test_generate_response_concatenates_text_parts() {
        let body = r#"{
            "candidates": [{"content": {"parts": [{"text": "[1,"}, {"text": "2]"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 3}
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text().as_deref(), Some("[1,2]"));
    }

    #[test]
    fn test_generate_response_without_candidates_has_no_text() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(parsed.text().is_none());
    }
}
