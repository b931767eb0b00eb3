//! MCP server implementation for rag-mcp.
//!
//! This crate wires a [`QueryEngine`] into an rmcp tool handler and serves it
//! over stdio.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use rag_core::services::QueryEngine;
use rmcp::{ServerHandler, handler::server::tool::ToolRouter, tool_handler};
use rmcp::model::{ServerCapabilities, ServerInfo};

pub use tools::retrieval::{RAG_TOOL_NAME, RagQueryParams};

const SERVER_INSTRUCTIONS: &str = r"rag-mcp answers questions from a GraphRAG knowledge graph about machine learning decision trees.

Call `rag_ML` with a `query` holding the user's full question. The server runs a global search over the
precomputed community reports and returns the answer as a few paragraphs of markdown, citing report ids
as `[Data: Reports (...)]`. Each call re-reads the index, so answers reflect the latest indexing run.";

/// MCP server wrapper around a query engine.
pub struct RagMcp<E: QueryEngine> {
    tool_router: ToolRouter<Self>,
    engine: Arc<E>,
}

impl<E: QueryEngine> Clone for RagMcp<E> {
    fn clone(&self) -> Self {
        Self {
            tool_router: self.tool_router.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl<E: QueryEngine> RagMcp<E> {
    /// Creates a new server owning `engine`.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::with_engine(Arc::new(engine))
    }

    /// Creates a new server using a shared engine handle.
    #[must_use]
    pub fn with_engine(engine: Arc<E>) -> Self {
        Self {
            tool_router: Self::tool_router_retrieval(),
            engine,
        }
    }

    /// Shared handle to the query engine.
    #[must_use]
    pub fn engine(&self) -> Arc<E> {
        self.engine.clone()
    }
}

#[tool_handler]
impl<E: QueryEngine> ServerHandler for RagMcp<E> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
