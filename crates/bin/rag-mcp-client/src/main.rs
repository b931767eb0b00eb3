//! Example client for rag-mcpd.
//!
//! Without arguments this only prints a greeting. With `--server-script` it
//! starts the server, lists its tools, prints them as OpenAI function
//! definitions and shuts the server down again.

use std::path::{Path, PathBuf};

use clap::Parser;
use rag_client::McpClient;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rag-mcp-client", version, about = "Example rag-mcp client.")]
struct CliArgs {
    /// Tool server script to launch (`.py` or `.js`).
    #[arg(long)]
    server_script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let args = CliArgs::parse();
    let Some(script) = args.server_script else {
        println!("Hello from rag-mcp-client!");
        return Ok(());
    };

    let mut client = McpClient::from_env()?;
    let outcome = run(&mut client, &script).await;
    client.cleanup().await;
    if let Err(err) = &outcome {
        error!(error = %err, "client run failed");
    }
    outcome
}

async fn run(
    client: &mut McpClient,
    script: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    client.connect_and_list_tools(script).await?;
    let functions = client.function_tools().await?;
    println!("{}", serde_json::to_string_pretty(&functions)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
