//! Connection lifecycle: build a transport, connect an MCP client over it,
//! and guarantee the whole thing is torn down exactly once.
//!
//! `McpRunner::connect` owns the full sequence; failures are classified into
//! a `transport` phase (bad target, spawn failure) and a `connect` phase
//! (handshake failure) so callers can tell target-syntax problems apart from
//! unreachable servers.

use rmcp::{
    RoleClient, ServiceExt,
    model::{ClientCapabilities, ClientInfo, Implementation},
    service::{Peer, RunningService},
    transport::{
        ConfigureCommandExt, SseClientTransport, StreamableHttpClientTransport, TokioChildProcess,
    },
};
use std::fmt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio::task::JoinHandle;

use crate::transport::TransportTarget;
use crate::{log_debug, log_trace};

/// A failure to establish a session, tagged with the phase it happened in.
#[derive(Debug)]
pub enum RunnerError {
    /// The transport could not be constructed (unspawnable command,
    /// unreachable SSE endpoint).
    Transport(anyhow::Error),
    /// The transport came up but the MCP handshake failed.
    Connect(anyhow::Error),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerError::Transport(e) => write!(f, "Invalid target: {e:#}"),
            RunnerError::Connect(e) => write!(f, "Failed to connect to server: {e:#}"),
        }
    }
}

impl std::error::Error for RunnerError {}

/// One connected session: a client handle plus its idempotent shutdown.
pub struct McpRunner {
    client: Peer<RoleClient>,
    service: Option<RunningService<RoleClient, ClientInfo>>,
    stderr_task: Option<JoinHandle<()>>,
}

impl McpRunner {
    /// Build the transport for `target`, attach the stderr forwarder for
    /// stdio servers, and perform the MCP handshake.
    pub async fn connect(target: TransportTarget) -> Result<Self, RunnerError> {
        log_debug!("connecting to {target}");
        match target {
            TransportTarget::Stdio { command, args } => {
                let (transport, stderr) = TokioChildProcess::builder(
                    Command::new(&command).configure(|c| {
                        c.args(&args);
                        // the child must not outlive us on any exit path
                        c.kill_on_drop(true);
                    }),
                )
                .stderr(Stdio::piped())
                .spawn()
                .map_err(|e| {
                    RunnerError::Transport(anyhow::anyhow!("failed to spawn '{command}': {e}"))
                })?;
                let stderr_task = stderr.map(forward_server_stderr);
                match client_identity().serve(transport).await {
                    Ok(service) => Ok(Self::from_service(service, stderr_task)),
                    Err(e) => {
                        // the dropped transport kills the child; only the
                        // forwarder needs explicit cleanup
                        if let Some(task) = stderr_task {
                            task.abort();
                        }
                        Err(RunnerError::Connect(e.into()))
                    }
                }
            }
            TransportTarget::Http { url } => {
                let transport = StreamableHttpClientTransport::from_uri(url.as_str());
                let service = client_identity()
                    .serve(transport)
                    .await
                    .map_err(|e| RunnerError::Connect(e.into()))?;
                Ok(Self::from_service(service, None))
            }
            TransportTarget::Sse { url } => {
                let transport = SseClientTransport::start(url.as_str())
                    .await
                    .map_err(|e| RunnerError::Transport(e.into()))?;
                let service = client_identity()
                    .serve(transport)
                    .await
                    .map_err(|e| RunnerError::Connect(e.into()))?;
                Ok(Self::from_service(service, None))
            }
        }
    }

    fn from_service(
        service: RunningService<RoleClient, ClientInfo>,
        stderr_task: Option<JoinHandle<()>>,
    ) -> Self {
        let client = service.peer().clone();
        Self {
            client,
            service: Some(service),
            stderr_task,
        }
    }

    /// The connected client handle.
    pub fn client(&self) -> &Peer<RoleClient> {
        &self.client
    }

    /// Tear the session down: cancel the client service (closing the
    /// transport and, for stdio, the child process with it), then stop the
    /// stderr forwarder. Safe to call more than once; the close sequence
    /// runs at most once.
    pub async fn shutdown(&mut self) {
        if let Some(service) = self.service.take() {
            match service.cancel().await {
                Ok(reason) => log_trace!("session closed: {reason:?}"),
                Err(e) => log_trace!("session close error: {e}"),
            }
        }
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }
}

fn client_identity() -> ClientInfo {
    ClientInfo {
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
    }
}

/// Relay the server's stderr to ours, line by line, tagged so interleaved
/// output stays attributable.
fn forward_server_stderr(stderr: ChildStderr) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            eprintln!("[server] {line}");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::{ErrorData, ServerHandler};
    use rmcp::model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo, Tool,
    };
    use rmcp::service::{RequestContext, RoleServer};
    use serde_json::Value;
    use std::sync::Arc;

    #[derive(Clone)]
    struct StubServer;

    impl ServerHandler for StubServer {
        fn get_info(&self) -> ServerInfo {
            ServerInfo {
                capabilities: ServerCapabilities::builder().enable_tools().build(),
                ..Default::default()
            }
        }

        async fn list_tools(
            &self,
            _request: Option<PaginatedRequestParam>,
            _context: RequestContext<RoleServer>,
        ) -> Result<ListToolsResult, ErrorData> {
            let schema = serde_json::json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Directory to list" }
                },
                "required": ["path"]
            });
            let Value::Object(schema) = schema else {
                unreachable!()
            };
            Ok(ListToolsResult {
                next_cursor: None,
                tools: vec![Tool::new(
                    "list_directory",
                    "List the entries of a directory",
                    Arc::new(schema),
                )],
            })
        }

        async fn call_tool(
            &self,
            request: CallToolRequestParam,
            _context: RequestContext<RoleServer>,
        ) -> Result<CallToolResult, ErrorData> {
            let path = request
                .arguments
                .as_ref()
                .and_then(|args| args.get("path"))
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            Ok(CallToolResult::success(vec![Content::text(format!(
                "content of {path}"
            ))]))
        }
    }

    async fn connected_runner() -> (McpRunner, JoinHandle<()>) {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let server = tokio::spawn(async move {
            if let Ok(service) = StubServer.serve(server_io).await {
                let _ = service.waiting().await;
            }
        });
        let service = client_identity().serve(client_io).await.expect("connect");
        let runner = McpRunner::from_service(service, None);
        (runner, server)
    }

    #[tokio::test]
    async fn shutdown_runs_close_sequence_once() {
        let (mut runner, server) = connected_runner().await;
        assert!(runner.service.is_some());
        runner.shutdown().await;
        assert!(runner.service.is_none());
        // second call is a no-op, not a double close
        runner.shutdown().await;
        assert!(runner.service.is_none());
        let _ = server.await;
    }

    #[tokio::test]
    async fn lists_and_calls_tools() {
        let (mut runner, _server) = connected_runner().await;

        let tools = crate::tools::list_tools(runner.client()).await.expect("list");
        assert!(crate::tools::validate_tool_name(&tools, "list_directory"));
        assert!(!crate::tools::validate_tool_name(&tools, "unknown_tool"));

        let mut args = serde_json::Map::new();
        args.insert("path".to_string(), Value::String(".".to_string()));
        let result = crate::tools::call_tool(runner.client(), "list_directory", args)
            .await
            .expect("call");
        let rendered = crate::tools::format_call_result(&result);
        assert!(rendered.starts_with("< result:"));
        assert!(rendered.contains("content"));

        runner.shutdown().await;
    }

    #[tokio::test]
    async fn spawn_failure_is_transport_phase() {
        let target = TransportTarget::Stdio {
            command: "climcp-test-missing-binary".to_string(),
            args: Vec::new(),
        };
        match McpRunner::connect(target).await {
            Err(RunnerError::Transport(_)) => {}
            Err(other) => panic!("expected transport-phase error, got: {other}"),
            Ok(_) => panic!("expected connection to fail"),
        }
    }

    #[tokio::test]
    async fn handshake_failure_is_connect_phase() {
        // `true` spawns fine but exits without speaking MCP
        let target = TransportTarget::Stdio {
            command: "true".to_string(),
            args: Vec::new(),
        };
        match McpRunner::connect(target).await {
            Err(RunnerError::Connect(_)) => {}
            Err(other) => panic!("expected connect-phase error, got: {other}"),
            Ok(_) => panic!("expected connection to fail"),
        }
    }
}
