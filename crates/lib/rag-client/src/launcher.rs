use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use rmcp::service::RunningService;
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use tokio::process::Command;
use tracing::debug;

use crate::ClientError;

/// A live MCP session; owns the child process and its stdio stream pair.
pub type ClientSession = RunningService<RoleClient, ()>;

pub type LaunchFuture =
    Pin<Box<dyn Future<Output = Result<ClientSession, ClientError>> + Send + 'static>>;
pub type LaunchFn = Arc<dyn Fn(LaunchCommand) -> LaunchFuture + Send + Sync + 'static>;

/// Server script flavours the client knows how to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Python,
    Node,
}

impl ScriptKind {
    /// Picks the script kind from the file extension.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] for anything but `.py` or `.js`.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("py") => Ok(Self::Python),
            Some("js") => Ok(Self::Node),
            _ => Err(ClientError::InvalidInput(format!(
                "server script must be a .py or .js file: {}",
                path.display()
            ))),
        }
    }

    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Node => "node",
        }
    }
}

/// Program plus arguments used to start a tool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// Resolves the interpreter for `path`; the script is the only argument.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidInput`] for unsupported script types.
    pub fn for_script(path: &Path) -> Result<Self, ClientError> {
        let kind = ScriptKind::from_path(path)?;
        Ok(Self {
            program: kind.program().to_string(),
            args: vec![path.to_string_lossy().into_owned()],
        })
    }
}

/// Spawns `command` as a child process and performs the MCP handshake over
/// its stdin/stdout.
///
/// # Errors
/// Returns [`ClientError::Spawn`] if the process cannot be started and
/// [`ClientError::Handshake`] if initialization fails.
pub async fn spawn_child_process(command: LaunchCommand) -> Result<ClientSession, ClientError> {
    debug!(program = %command.program, args = ?command.args, "spawning tool server");
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);
    let transport = TokioChildProcess::new(cmd).map_err(|source| ClientError::Spawn {
        command: command.program.clone(),
        source,
    })?;
    ().serve(transport)
        .await
        .map_err(|err| ClientError::Handshake(err.to_string()))
}

/// Default launcher backed by [`spawn_child_process`].
#[must_use]
pub fn child_process_launcher() -> LaunchFn {
    Arc::new(|command| -> LaunchFuture { Box::pin(spawn_child_process(command)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_supported_extensions() {
        assert_eq!(ScriptKind::from_path(Path::new("rag_server.py")).ok(), Some(ScriptKind::Python));
        assert_eq!(ScriptKind::from_path(Path::new("build/index.js")).ok(), Some(ScriptKind::Node));
    }

    #[test]
    fn rejects_other_extensions() {
        for path in ["server.exe", "server", "server.py.bak", "server.ts"] {
            let err = ScriptKind::from_path(Path::new(path)).expect_err("unsupported");
            assert!(matches!(err, ClientError::InvalidInput(_)), "{path}");
        }
    }

    #[test]
    fn script_is_the_only_argument() {
        let command = LaunchCommand::for_script(Path::new("/srv/rag_server.py")).expect("python");
        assert_eq!(command.program, "python");
        assert_eq!(command.args, vec!["/srv/rag_server.py".to_string()]);
    }

    #[tokio::test]
    async fn missing_interpreter_is_command_not_found() {
        let err = spawn_child_process(LaunchCommand {
            program: "rag-client-test-no-such-interpreter".to_string(),
            args: vec!["server.py".to_string()],
        })
        .await
        .expect_err("program does not exist");

        assert!(err.is_command_not_found(), "unexpected error: {err}");
    }
}
