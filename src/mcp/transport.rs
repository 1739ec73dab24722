//! Stdio transport for MCP client connections.
//!
//! Spawns the server as a child process and exchanges newline-delimited
//! JSON-RPC frames over its stdin/stdout. The server's stderr passes through
//! to ours, so server-side diagnostics stay visible.

use std::process::Stdio;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use super::protocol::{JsonRpcFrame, JsonRpcNotification, JsonRpcRequest};
use crate::error::McpError;

/// How long to wait for the child to exit before killing it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A child-process MCP connection speaking newline-delimited JSON-RPC.
///
/// One request is in flight at a time; [`StdioTransport::request`] writes a
/// frame and reads until the response with the matching ID arrives, skipping
/// anything the server sends in between.
pub struct StdioTransport {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    timeout: Duration,
    command: String,
}

impl StdioTransport {
    /// Spawns the server process with piped stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Spawn`] if the process cannot be launched, or
    /// [`McpError::Protocol`] if its pipes are unavailable.
    pub fn spawn(command: &str, args: &[String], timeout: Duration) -> Result<Self, McpError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| McpError::Spawn {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Protocol("child stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Protocol("child stdout unavailable".to_string()))?;

        debug!(command, ?args, "spawned MCP server process");

        Ok(Self {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            next_id: 0,
            timeout,
            command: command.to_string(),
        })
    }

    /// The command this transport was spawned with.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Sends a request and waits for its response.
    ///
    /// # Errors
    ///
    /// Returns [`McpError::Timeout`] if no response arrives in time,
    /// [`McpError::ServerClosed`] if the server exits first, or
    /// [`McpError::Rpc`] if the server answers with a JSON-RPC error.
    pub async fn request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        self.next_id += 1;
        let id = self.next_id;

        let request = JsonRpcRequest::new(id, method, params);
        self.write_frame(&serde_json::to_string(&request).map_err(|e| {
            McpError::Protocol(format!("failed to encode {method} request: {e}"))
        })?)
        .await?;

        let timeout = self.timeout;
        match tokio::time::timeout(timeout, self.read_response(id)).await {
            Ok(result) => result,
            Err(_) => Err(McpError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    }

    /// Sends a notification (no response expected).
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] if writing to the server fails.
    pub async fn notify(&mut self, method: &str, params: Value) -> Result<(), McpError> {
        let note = JsonRpcNotification::new(method, params);
        let frame = serde_json::to_string(&note)
            .map_err(|e| McpError::Protocol(format!("failed to encode notification: {e}")))?;
        self.write_frame(&frame).await
    }

    /// Closes the connection and reaps the child process.
    ///
    /// Closing stdin signals the server to exit; if it has not done so
    /// within the grace period it is killed.
    ///
    /// # Errors
    ///
    /// Returns [`McpError`] if killing a stuck process fails.
    pub async fn shutdown(self) -> Result<(), McpError> {
        let Self {
            mut child,
            stdin,
            command,
            ..
        } = self;

        drop(stdin);

        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(command, %status, "MCP server exited");
                Ok(())
            }
            Ok(Err(e)) => Err(McpError::Transport(e)),
            Err(_) => {
                warn!(command, "MCP server did not exit, killing");
                child.kill().await.map_err(McpError::Transport)
            }
        }
    }

    async fn write_frame(&mut self, frame: &str) -> Result<(), McpError> {
        self.stdin.write_all(frame.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Reads frames until the response matching `id` arrives.
    ///
    /// Notifications, server-originated requests, and unparseable lines are
    /// skipped: a server logging to stdout must not take the session down.
    async fn read_response(&mut self, id: u64) -> Result<Value, McpError> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(McpError::Transport)?
                .ok_or(McpError::ServerClosed)?;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let frame: JsonRpcFrame = match serde_json::from_str(line) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(command = self.command, error = %e, "skipping non-JSON frame from MCP server");
                    continue;
                }
            };

            if frame.method.is_some() {
                // Notification or server request; we don't handle either.
                debug!(
                    command = self.command,
                    method = frame.method.as_deref().unwrap_or(""),
                    "ignoring server-originated message"
                );
                continue;
            }

            match frame.id {
                Some(ref frame_id) if *frame_id == Value::from(id) => {
                    if let Some(err) = frame.error {
                        return Err(McpError::Rpc {
                            code: err.code,
                            message: err.message,
                        });
                    }
                    return frame
                        .result
                        .ok_or_else(|| McpError::Protocol("response missing result".to_string()));
                }
                _ => {
                    warn!(
                        command = self.command,
                        "skipping response with unexpected id"
                    );
                }
            }
        }
    }
}

impl std::fmt::Debug for StdioTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioTransport")
            .field("command", &self.command)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}
