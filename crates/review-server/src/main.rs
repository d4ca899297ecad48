mod config;
mod error;
mod server;
mod session;
mod throttle;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use server::ReviewServer;

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

    info!("starting review MCP server");

    let config = Config::from_env()?;
    info!(
        min_clause_chars = config.render.min_clause_chars,
        title_max_chars = config.render.title_max_chars,
        heading_max_chars = config.render.heading_max_chars,
        search_rate_limit_rps = ?config.search_rate_limit_rps,
        "configuration loaded"
    );

    let server = ReviewServer::new(config);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
