mod config;
mod error;
mod server;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use judge_common::{Evaluator, FirecrawlClient};
use server::HackathonJudgeServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries MCP JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting hackathon-judge MCP server");

    let config = Config::from_env()?;
    info!(
        firecrawl_base_url = %config.firecrawl.base_url,
        gemini_base_url = %config.gemini.base_url,
        model = %config.gemini.model,
        firecrawl_key = config.firecrawl_api_key.is_some(),
        gemini_key = config.gemini_api_key.is_some(),
        "configuration loaded"
    );

    let fetcher = FirecrawlClient::new(config.firecrawl.clone())?;
    let evaluator = Evaluator::new(config.gemini.clone())?;

    let server = HackathonJudgeServer::new(
        fetcher,
        evaluator,
        config.firecrawl_api_key,
        config.gemini_api_key,
    );

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
