use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use rag_core::services::QueryEngine;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{RagMcp, helpers};

pub const RAG_TOOL_NAME: &str = "rag_ML";

/// Parameters for the retrieval tool.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct RagQueryParams {
    /// The user's concrete question.
    pub query: String,
}

#[tool_router(router = tool_router_retrieval, vis = "pub")]
impl<E: QueryEngine> RagMcp<E> {
    #[tool(
        name = "rag_ML",
        description = "Query the knowledge graph for information about machine learning decision trees. Returns the final answer."
    )]
    async fn rag_ml(
        &self,
        Parameters(params): Parameters<RagQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = RAG_TOOL_NAME, "answering query");
        let answer = self.engine.answer(&params.query).await.map_err(|err| {
            error!(tool = RAG_TOOL_NAME, error = %err, "query failed");
            helpers::map_service_err(&err)
        })?;
        Ok(CallToolResult::success(vec![Content::text(answer)]))
    }
}
