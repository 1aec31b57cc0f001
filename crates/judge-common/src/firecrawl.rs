//! Firecrawl scrape client: turns a URL into markdown text.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{status_text, JudgeError};

const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev/v1";

#[derive(Clone, Debug)]
pub struct FirecrawlConfig {
    pub base_url: String,
    /// Per-request timeout. `None` leaves timing entirely to the caller.
    pub timeout: Option<Duration>,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl FirecrawlConfig {
    pub fn from_env() -> Self {
        let base_url = std::env::var("FIRECRAWL_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout = std::env::var("FIRECRAWL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}

#[derive(Clone)]
pub struct FirecrawlClient {
    config: FirecrawlConfig,
    http: reqwest::Client,
}

impl FirecrawlClient {
    pub fn new(config: FirecrawlConfig) -> Result<Self, JudgeError> {
        let http = reqwest::Client::builder()
            .user_agent("hackathon-judge/firecrawl")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &FirecrawlConfig {
        &self.config
    }

    /// Scrape `url` and return the page rendered as markdown, unmodified.
    ///
    /// One attempt only. Failures are logged here and then returned.
    pub async fn scrape_markdown(&self, url: &str, api_key: &str) -> Result<String, JudgeError> {
        let result = self.scrape(url, api_key).await;
        match &result {
            Ok(markdown) => debug!(url, bytes = markdown.len(), "scrape succeeded"),
            Err(e) => error!(url, error = %e, "scraping failed"),
        }
        result
    }

    async fn scrape(&self, url: &str, api_key: &str) -> Result<String, JudgeError> {
        let endpoint = format!("{}/scrape", self.config.base_url);
        let mut req = self
            .http
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&ScrapeRequest {
                url,
                formats: ["markdown"],
            });
        if let Some(timeout) = self.config.timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(JudgeError::status(
                status,
                format!("Firecrawl failed: {}", status_text(status)),
            ));
        }

        let body = resp.json::<ScrapeResponse>().await?;
        if !body.success {
            let message = body
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(JudgeError::Service(format!("Firecrawl error: {message}")));
        }

        body.data.and_then(|d| d.markdown).ok_or_else(|| {
            JudgeError::Service("Firecrawl error: response contained no markdown".to_string())
        })
    }
}

/// Scrape `url` with a client configured from the environment.
pub async fn fetch_content(url: &str, api_key: &str) -> Result<String, JudgeError> {
    let client = FirecrawlClient::new(FirecrawlConfig::from_env()).inspect_err(|e| {
        error!(error = %e, "failed to build firecrawl client");
    })?;
    client.scrape_markdown(url, api_key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_request_asks_for_markdown_only() {
        let body = serde_json::to_value(ScrapeRequest {
            url: "https://example.com/hack",
            formats: ["markdown"],
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"url": "https://example.com/hack", "formats": ["markdown"]})
        );
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = FirecrawlConfig::default().with_base_url("http://127.0.0.1:9000/v1/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000/v1");
        assert!(config.timeout.is_none());
    }
}
