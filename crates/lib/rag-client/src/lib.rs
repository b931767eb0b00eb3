//! MCP client for rag-mcp.
//!
//! Spawns a tool server as a child process, speaks MCP over its stdio, lists
//! the tools it offers and converts their schemas into OpenAI function-calling
//! definitions.

pub mod client;
pub mod config;
pub mod launcher;
pub mod translate;

use std::error::Error;
use std::fmt;

pub use client::McpClient;
pub use config::ClientConfig;
pub use launcher::{ClientSession, LaunchCommand, LaunchFn, LaunchFuture, ScriptKind};
pub use translate::{FunctionSpec, FunctionTool, source_format, transform_tools};

#[derive(Debug)]
pub enum ClientError {
    MissingSetting(&'static str),
    InvalidInput(String),
    Spawn { command: String, source: std::io::Error },
    Handshake(String),
    Protocol(String),
    NotConnected,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => {
                write!(f, "missing required setting: {name} (set it in the environment or .env)")
            }
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Spawn { command, source } => {
                write!(f, "failed to launch `{command}`: {source}")
            }
            Self::Handshake(message) => write!(f, "MCP handshake failed: {message}"),
            Self::Protocol(message) => write!(f, "MCP request failed: {message}"),
            Self::NotConnected => write!(f, "not connected to an MCP server"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl ClientError {
    /// Returns true when the launch command or script could not be found.
    #[must_use]
    pub fn is_command_not_found(&self) -> bool {
        matches!(self, Self::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
