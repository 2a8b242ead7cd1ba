//! `swagger-mcp`: serve the operations of a Swagger 2.0 / OpenAPI 3.0 API as MCP tools.

mod catalog;
mod cli;
mod error;
mod handler;
mod http;

use crate::catalog::ToolCatalog;
use crate::cli::{Cli, LogFormat, Transport};
use crate::error::{Result, ServerError};
use crate::handler::SwaggerMcpServer;
use clap::Parser;
use rmcp::ServiceExt;
use swagger_mcp_openapi_tools::runtime::OpenApiToolSource;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);
    run(cli).await?;
    Ok(())
}

fn init_tracing(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the stdio transport; logs always go to stderr.
    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(flag) = cli.missing_credentials() {
        tracing::warn!(security = %cli.security, "security mode selected but {flag} is empty");
    }

    let config = cli.api_config();
    let source = OpenApiToolSource::build(config.clone()).await?;

    let mut catalog = ToolCatalog::default();
    let derived = source.register_all(&mut catalog);
    tracing::info!(
        derived,
        registered = catalog.len(),
        base_url = %source.base_url(),
        "tools ready"
    );
    if catalog.is_empty() {
        tracing::warn!("no operations passed the path and method filters");
    }

    if cli.transport == Transport::Stdio && !config.forward_headers.is_empty() {
        tracing::warn!("--forward-headers has no effect on the stdio transport");
    }
    let server = SwaggerMcpServer::new(catalog, &config.forward_headers, source.spec_title());

    match cli.transport {
        Transport::Stdio => {
            let service = server
                .serve(rmcp::transport::stdio())
                .await
                .map_err(|e| ServerError::Transport(e.to_string()))?;
            service
                .waiting()
                .await
                .map_err(|e| ServerError::Transport(e.to_string()))?;
            tracing::info!("stdio session closed");
        }
        Transport::Http => http::serve(server, cli.bind).await?,
    }
    Ok(())
}
