//! Daemon entry point for the GraphRAG MCP server.
//!
//! Loads configuration from arguments and the environment, then serves the
//! retrieval tool over stdio until the peer disconnects.

mod config;

use std::sync::Arc;

use rag_core::services::RagService;
use rag_mcp::server::serve_stdio;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RagConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let config = RagConfig::from_args()?;
    info!(
        project_dir = %config.project_dir.display(),
        level = config.search.community_level,
        "starting rag-mcpd"
    );

    let engine = Arc::new(RagService::new(config.project_dir).with_options(config.search));
    serve_stdio(engine).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
