//! Gemini `generateContent` client with JSON output mode.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::{status_text, JudgeError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const JSON_MIME_TYPE: &str = "application/json";

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
    pub max_error_body_bytes: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
            max_error_body_bytes: 8 * 1024,
        }
    }
}

impl GeminiConfig {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = std::env::var("GEMINI_MODEL")
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        let max_error_body_bytes = std::env::var("GEMINI_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
            max_error_body_bytes,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, JudgeError> {
        let http = reqwest::Client::builder()
            .user_agent("hackathon-judge/gemini")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Send `prompt` as a single user turn with JSON output mode enabled and
    /// return the generated text as-is.
    pub async fn generate_json(&self, prompt: &str, api_key: &str) -> Result<String, JudgeError> {
        let result = self.generate(prompt, api_key).await;
        if let Err(e) = &result {
            error!(model = %self.config.model, error = %e, "gemini generation failed");
        }
        result
    }

    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, JudgeError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
            },
        };

        let mut req = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body);
        if let Some(timeout) = self.config.timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(Self::to_upstream_error(resp, self.config.max_error_body_bytes).await);
        }

        let parsed = resp.json::<GenerateContentResponse>().await?;
        parsed.into_text()
    }

    async fn to_upstream_error(resp: reqwest::Response, max_error_body_bytes: usize) -> JudgeError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        let detail = serde_json::from_str::<GoogleErrorEnvelope>(&body)
            .ok()
            .and_then(|env| env.error.message);
        JudgeError::status(status, upstream_message(status, detail.as_deref()))
    }
}

fn upstream_message(status: StatusCode, detail: Option<&str>) -> String {
    match detail {
        Some(detail) => format!("Gemini failed: {}: {detail}", status_text(status)),
        None => format!("Gemini failed: {}", status_text(status)),
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read gemini error body");
            String::new()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String, JudgeError> {
        let blocked = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(JudgeError::Service(match blocked {
                Some(reason) => format!("Gemini blocked the prompt: {reason}"),
                None => "Gemini returned no candidates".to_string(),
            }));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string());
            return Err(JudgeError::Service(format!(
                "Gemini returned no text (finish reason: {reason})"
            )));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
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
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorObject,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorObject {
    message: Option<String>,
}
