//! MCP server runner for rag-mcp.

use std::sync::Arc;

use rag_core::services::QueryEngine;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use tracing::info;

use crate::RagMcp;

/// Serves the MCP server over stdio until the peer disconnects.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<E: QueryEngine>(
    engine: Arc<E>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = RagMcp::with_engine(engine);
    let (stdin, stdout) = stdio();
    info!("serving MCP over stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    let reason = running.waiting().await?;
    info!(?reason, "stdio session ended");
    Ok(())
}
