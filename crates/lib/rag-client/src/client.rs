use std::path::{Path, PathBuf};

use rag_core::llm::ChatClient;
use rmcp::model::Tool;
use tracing::{error, info, warn};

use crate::ClientError;
use crate::config::ClientConfig;
use crate::launcher::{ClientSession, LaunchCommand, LaunchFn, child_process_launcher};
use crate::translate::{FunctionTool, source_format, transform_tools};

/// Connection manager for a single tool server.
///
/// Holds at most one live session. Connecting while a session is open reuses
/// it; [`McpClient::cleanup`] closes it and may be called any number of times.
pub struct McpClient {
    llm: ChatClient,
    launcher: LaunchFn,
    session: Option<ClientSession>,
    server_path: Option<PathBuf>,
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("model", &self.llm.model())
            .field("connected", &self.session.is_some())
            .field("server_path", &self.server_path)
            .finish_non_exhaustive()
    }
}

impl McpClient {
    /// Builds a client from `OPENAI_API_KEY`, `BASE_URL` and `MODEL`.
    ///
    /// # Errors
    /// Returns [`ClientError::MissingSetting`] when the API key is not set.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_launcher(config, child_process_launcher())
    }

    /// Builds a client that starts servers through `launcher`.
    #[must_use]
    pub fn with_launcher(config: ClientConfig, launcher: LaunchFn) -> Self {
        let llm = ChatClient::new(config.api_key, config.base_url, config.model);
        info!(model = llm.model(), base_url = llm.base_url(), "chat model client ready");
        Self {
            llm,
            launcher,
            session: None,
            server_path: None,
        }
    }

    #[must_use]
    pub const fn llm(&self) -> &ChatClient {
        &self.llm
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Script of the currently connected server.
    #[must_use]
    pub fn server_path(&self) -> Option<&Path> {
        self.server_path.as_deref()
    }

    /// Starts the server script at `path`, if not already connected, and
    /// returns the tools it offers.
    ///
    /// Any launch, handshake or listing failure tears the session down before
    /// the error is returned.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] for scripts that are neither
    /// `.py` nor `.js`, [`ClientError::Spawn`] or [`ClientError::Handshake`]
    /// when the server cannot be started, and [`ClientError::Protocol`] when
    /// listing fails.
    pub async fn connect_and_list_tools(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<Tool>, ClientError> {
        let path = path.as_ref();
        let attempt = if self.session.is_some() {
            info!(server = ?self.server_path, "already connected, listing tools");
            self.list_tools().await
        } else {
            let command = LaunchCommand::for_script(path)?;
            self.open(path, command).await
        };
        match attempt {
            Ok(tools) => {
                log_tools(&tools);
                Ok(tools)
            }
            Err(err) => {
                if err.is_command_not_found() {
                    error!(
                        error = %err,
                        script = %path.display(),
                        "launch command or server script not found"
                    );
                } else {
                    error!(error = %err, script = %path.display(), "failed to connect to server");
                }
                self.cleanup().await;
                Err(err)
            }
        }
    }

    async fn open(&mut self, path: &Path, command: LaunchCommand) -> Result<Vec<Tool>, ClientError> {
        info!(program = %command.program, script = %path.display(), "starting MCP server");
        let session = (self.launcher)(command).await?;
        self.session = Some(session);
        self.server_path = Some(path.to_path_buf());
        info!("MCP session initialized");
        self.list_tools().await
    }

    async fn list_tools(&self) -> Result<Vec<Tool>, ClientError> {
        let session = self.session.as_ref().ok_or(ClientError::NotConnected)?;
        session
            .list_all_tools()
            .await
            .map_err(|err| ClientError::Protocol(err.to_string()))
    }

    /// Lists the server's tools in OpenAI function-calling form.
    ///
    /// # Errors
    /// Returns [`ClientError::NotConnected`] without a session and
    /// [`ClientError::Protocol`] when listing fails.
    pub async fn function_tools(&self) -> Result<Vec<FunctionTool>, ClientError> {
        let tools = self.list_tools().await?;
        Ok(transform_tools(&source_format(&tools)))
    }

    /// Closes the session and stops the server process. Safe to call when
    /// nothing is open.
    pub async fn cleanup(&mut self) {
        self.server_path = None;
        let Some(session) = self.session.take() else {
            return;
        };
        match session.cancel().await {
            Ok(reason) => info!(?reason, "MCP session closed"),
            Err(err) => warn!(error = %err, "MCP session did not shut down cleanly"),
        }
    }
}

fn log_tools(tools: &[Tool]) {
    let names: Vec<&str> = tools.iter().map(|tool| &*tool.name).collect();
    info!(count = tools.len(), tools = ?names, "server tools available");
}
