//! subdex server entry point.
//!
//! Boots the MCP server on stdio transport and, when configured, the periodic
//! page regeneration task. Logging goes to stderr to avoid interfering with
//! the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use subdex_client::Pipeline;
use subdex_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod handler;
mod scheduler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let pipeline = Arc::new(Pipeline::new(config.pipeline()?)?);

    tracing::info!(
        domain = %pipeline.config().domain,
        serving_host = %pipeline.config().serving_host,
        "Starting subdex server on stdio transport"
    );

    let scheduler = config
        .refresh_interval()
        .map(|period| scheduler::spawn(pipeline.clone(), period, config.refresh_on_start));

    let handler = handler::HostsServer::new(pipeline);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    if let Some(task) = scheduler {
        task.abort();
    }

    Ok(())
}
