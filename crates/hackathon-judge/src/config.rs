use judge_common::{FirecrawlConfig, GeminiConfig};

use crate::error::AppError;

/// Server configuration loaded from environment variables.
///
/// API keys are optional here. Tool calls may pass their own key, and the
/// environment value is only a fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub firecrawl: FirecrawlConfig,
    pub gemini: GeminiConfig,
    /// `FIRECRAWL_API_KEY`, used when a tool call does not supply one.
    pub firecrawl_api_key: Option<String>,
    /// `GEMINI_API_KEY`, used when a tool call does not supply one.
    pub gemini_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `FIRECRAWL_BASE_URL`, `FIRECRAWL_TIMEOUT_SECS`
    /// - `GEMINI_BASE_URL`, `GEMINI_MODEL`, `GEMINI_TIMEOUT_SECS`, `GEMINI_MAX_ERROR_BODY_BYTES`
    /// - `FIRECRAWL_API_KEY`, `GEMINI_API_KEY`
    pub fn from_env() -> Result<Self, AppError> {
        let firecrawl = FirecrawlConfig::from_env();
        let gemini = GeminiConfig::from_env();

        check_base_url("FIRECRAWL_BASE_URL", &firecrawl.base_url)?;
        check_base_url("GEMINI_BASE_URL", &gemini.base_url)?;

        Ok(Self {
            firecrawl,
            gemini,
            firecrawl_api_key: non_empty_env("FIRECRAWL_API_KEY"),
            gemini_api_key: non_empty_env("GEMINI_API_KEY"),
        })
    }
}

fn check_base_url(var: &str, value: &str) -> Result<(), AppError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(());
    }
    Err(AppError::Config(format!(
        "{var} must be an http(s) URL, got {value:?}"
    )))
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
