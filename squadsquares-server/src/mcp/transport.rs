// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! MCP transport abstraction (stdio and in-process channels).

use crate::mcp::handlers::McpHandler;
use crate::mcp::protocol::JsonRpcResponse;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Channel closed")]
    ChannelClosed,
}

/// Transport abstraction for MCP JSON-RPC messages.
#[async_trait::async_trait]
pub trait McpTransport: Send {
    /// Receive the next raw message. `None` ends the session.
    async fn recv(&mut self) -> Result<Option<String>, TransportError>;
    /// Send a JSON-RPC response.
    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError>;
}

/// Stdio transport with newline-delimited framing.
///
/// One JSON-RPC message per line; blank lines are skipped and end of input
/// ends the session. Generic over the streams so sessions can be scripted.
pub struct StdioTransport<R = tokio::io::Stdin, W = tokio::io::Stdout> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
    line: String,
}

impl StdioTransport {
    /// Create a transport over the process's stdin and stdout.
    pub fn new() -> Self {
        Self::from_io(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn from_io(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
            line: String::new(),
        }
    }

    /// Give back the output stream.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait::async_trait]
impl<R, W> McpTransport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line).await? == 0 {
                return Ok(None);
            }
            let message = self.line.trim();
            if !message.is_empty() {
                return Ok(Some(message.to_string()));
            }
        }
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError> {
        let payload = serde_json::to_vec(&response)?;
        self.writer.write_all(&payload).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Buffer-backed transport for tests and in-process use.
///
/// The session ends once every input sender is dropped.
pub struct BufferTransport {
    input: mpsc::Receiver<String>,
    output: mpsc::Sender<JsonRpcResponse>,
}

impl BufferTransport {
    pub fn new(input: mpsc::Receiver<String>, output: mpsc::Sender<JsonRpcResponse>) -> Self {
        Self { input, output }
    }
}

#[async_trait::async_trait]
impl McpTransport for BufferTransport {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.input.recv().await)
    }

    async fn send(&mut self, response: JsonRpcResponse) -> Result<(), TransportError> {
        self.output
            .send(response)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Run one MCP session: answer every message until the transport ends.
///
/// Malformed messages are answered and the loop goes on; only transport
/// failures stop it early.
pub async fn serve<T: McpTransport>(
    handler: &McpHandler,
    transport: &mut T,
) -> Result<(), TransportError> {
    info!("MCP session started");
    let mut handled = 0u64;

    while let Some(message) = transport.recv().await? {
        handled += 1;
        match handler.handle_message(&message).await {
            Some(response) => transport.send(response).await?,
            None => debug!("No response for notification"),
        }
    }

    info!(messages = handled, "MCP session ended");
    Ok(())
}
