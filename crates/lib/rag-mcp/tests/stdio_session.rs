use rag_core::services::{QueryEngine, RagService, ServiceError};
use rag_mcp::{RAG_TOOL_NAME, RagMcp};
use rmcp::ServiceExt;

struct EchoEngine;

impl QueryEngine for EchoEngine {
    async fn answer(&self, query: &str) -> Result<String, ServiceError> {
        Ok(format!("answer to: {query}"))
    }
}

#[tokio::test]
async fn lists_single_retrieval_tool_over_byte_stream() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let server = tokio::spawn(async move {
        let running = RagMcp::new(EchoEngine)
            .serve(tokio::io::split(server_io))
            .await
            .expect("server handshake");
        let _ = running.waiting().await;
    });

    let client = ()
        .serve(tokio::io::split(client_io))
        .await
        .expect("client handshake");

    let tools = client.list_all_tools().await.expect("tools listed");
    assert_eq!(tools.len(), 1);
    let tool = &tools[0];
    assert_eq!(tool.name, RAG_TOOL_NAME);
    assert!(tool.description.is_some());
    let properties = tool
        .input_schema
        .get("properties")
        .and_then(|value| value.as_object())
        .expect("schema has properties");
    assert!(properties.contains_key("query"));
    let required = tool
        .input_schema
        .get("required")
        .and_then(|value| value.as_array())
        .expect("schema lists required fields");
    assert_eq!(required, &vec![serde_json::json!("query")]);

    client.cancel().await.expect("client shuts down");
    server.await.expect("server task joins");
}

#[tokio::test]
async fn project_service_serves_over_byte_stream() {
    let project = tempfile::tempdir().expect("tempdir");
    let engine = RagService::new(project.path());
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let server = tokio::spawn(async move {
        let running = RagMcp::new(engine)
            .serve(tokio::io::split(server_io))
            .await
            .expect("server handshake");
        let _ = running.waiting().await;
    });

    let client = ()
        .serve(tokio::io::split(client_io))
        .await
        .expect("client handshake");

    let tools = client.list_all_tools().await.expect("tools listed");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, RAG_TOOL_NAME);

    client.cancel().await.expect("client shuts down");
    server.await.expect("server task joins");
}
