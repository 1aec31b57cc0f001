/// MCP server exposing the hackathon judging pipeline.
///
/// Exposes three tools:
/// - `scrape_guidelines`: Fetch a hackathon page as markdown via Firecrawl
/// - `evaluate_submission`: Run the four-judge panel over guidelines + solution
/// - `judge_hackathon`: Scrape, then evaluate, in one call
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use judge_common::{EvaluationResult, Evaluator, FirecrawlClient};

use crate::error::AppError;

#[derive(Clone)]
pub struct HackathonJudgeServer {
    fetcher: FirecrawlClient,
    evaluator: Evaluator,
    firecrawl_api_key: Option<String>,
    gemini_api_key: Option<String>,
    tool_router: ToolRouter<HackathonJudgeServer>,
}

impl HackathonJudgeServer {
    pub fn new(
        fetcher: FirecrawlClient,
        evaluator: Evaluator,
        firecrawl_api_key: Option<String>,
        gemini_api_key: Option<String>,
    ) -> Self {
        Self {
            fetcher,
            evaluator,
            firecrawl_api_key,
            gemini_api_key,
            tool_router: Self::tool_router(),
        }
    }

    fn firecrawl_key(&self, supplied: Option<String>) -> Result<String, AppError> {
        pick_key(
            supplied,
            self.firecrawl_api_key.as_deref(),
            "firecrawl api_key",
            "FIRECRAWL_API_KEY",
        )
    }

    fn gemini_key(&self, supplied: Option<String>) -> Result<String, AppError> {
        pick_key(
            supplied,
            self.gemini_api_key.as_deref(),
            "gemini api_key",
            "GEMINI_API_KEY",
        )
    }

    async fn scrape(&self, url: &str, api_key: Option<String>) -> Result<String, AppError> {
        let url = non_blank("url", url)?.trim();
        let key = self.firecrawl_key(api_key)?;
        Ok(self.fetcher.scrape_markdown(url, &key).await?)
    }

    async fn evaluate(
        &self,
        guidelines: &str,
        solution: &str,
        api_key: Option<String>,
    ) -> Result<EvaluationResult, AppError> {
        non_blank("guidelines", guidelines)?;
        non_blank("solution", solution)?;
        let key = self.gemini_key(api_key)?;
        Ok(self.evaluator.evaluate(guidelines, solution, &key).await?)
    }

    /// Scrape then evaluate. Arguments and both keys are checked before the
    /// first request goes out.
    async fn judge(&self, params: JudgeHackathonParams) -> Result<EvaluationResult, AppError> {
        non_blank("url", &params.url)?;
        non_blank("solution", &params.solution)?;
        let firecrawl_key = self.firecrawl_key(params.firecrawl_api_key)?;
        let gemini_key = self.gemini_key(params.gemini_api_key)?;

        let guidelines = self.scrape(&params.url, Some(firecrawl_key)).await?;
        info!(url = %params.url.trim(), bytes = guidelines.len(), "guidelines scraped");

        self.evaluate(&guidelines, &params.solution, Some(gemini_key))
            .await
    }
}

/// Per-call key wins over the server's environment fallback.
fn pick_key(
    supplied: Option<String>,
    fallback: Option<&str>,
    param: &'static str,
    env_var: &'static str,
) -> Result<String, AppError> {
    supplied
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .or_else(|| fallback.map(str::to_string))
        .ok_or(AppError::MissingApiKey { param, env_var })
}

fn non_blank<'a>(name: &'static str, value: &'a str) -> Result<&'a str, AppError> {
    if value.trim().is_empty() {
        return Err(AppError::EmptyArgument(name));
    }
    Ok(value)
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ScrapeGuidelinesParams {
    /// Page with the hackathon rules and judging criteria.
    url: String,
    /// Firecrawl API key. Falls back to FIRECRAWL_API_KEY.
    api_key: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct EvaluateSubmissionParams {
    /// Hackathon guideline text, e.g. the output of scrape_guidelines.
    guidelines: String,
    /// Description of the participant's solution.
    solution: String,
    /// Gemini API key. Falls back to GEMINI_API_KEY.
    api_key: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct JudgeHackathonParams {
    url: String,
    solution: String,
    firecrawl_api_key: Option<String>,
    gemini_api_key: Option<String>,
}

#[derive(Debug, serde::Serialize, JsonSchema)]
struct ScrapeGuidelinesResponse {
    markdown: String,
}

#[tool_router]
impl HackathonJudgeServer {
    #[tool(description = "Fetch a hackathon web page through Firecrawl and return its content as markdown.")]
    async fn scrape_guidelines(
        &self,
        Parameters(params): Parameters<ScrapeGuidelinesParams>,
    ) -> Result<Json<ScrapeGuidelinesResponse>, String> {
        let markdown = self
            .scrape(&params.url, params.api_key)
            .await
            .map_err(|e| format!("scrape_guidelines failed: {e}"))?;
        Ok(Json(ScrapeGuidelinesResponse { markdown }))
    }

    #[tool(description = "Evaluate a solution against hackathon guidelines with four simulated judges (corporate, research, vc, community). Returns scores, feedback, and overall strengths/weaknesses.")]
    async fn evaluate_submission(
        &self,
        Parameters(params): Parameters<EvaluateSubmissionParams>,
    ) -> Result<Json<EvaluationResult>, String> {
        let result = self
            .evaluate(&params.guidelines, &params.solution, params.api_key)
            .await
            .map_err(|e| format!("evaluate_submission failed: {e}"))?;
        Ok(Json(result))
    }

    #[tool(description = "Scrape the hackathon page at url, then evaluate the solution against it with the four-judge panel.")]
    async fn judge_hackathon(
        &self,
        Parameters(params): Parameters<JudgeHackathonParams>,
    ) -> Result<Json<EvaluationResult>, String> {
        let result = self
            .judge(params)
            .await
            .map_err(|e| format!("judge_hackathon failed: {e}"))?;
        Ok(Json(result))
    }
}

#[tool_handler]
impl ServerHandler for HackathonJudgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "hackathon-judge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Hackathon judging MCP server. Use scrape_guidelines to fetch an event's rules \
as markdown, then evaluate_submission to score a solution with the corporate, research, vc \
and community judges. judge_hackathon does both in one call. API keys may be passed per call \
or configured via FIRECRAWL_API_KEY / GEMINI_API_KEY."
                    .to_string(),
            ),
        }
    }
}
