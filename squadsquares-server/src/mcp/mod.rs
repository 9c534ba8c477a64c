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

//! Model Context Protocol (MCP) Server Implementation
//!
//! Exposes the Squad Squares backend to AI assistants as eight MCP tools.
//! The protocol is JSON-RPC 2.0; sessions run over stdio (newline-delimited,
//! the usual way assistants launch a local server) or over HTTP `POST /mcp`.
//!
//! ## Error reporting
//!
//! - Arguments that fail the tool's JSON Schema are rejected with -32602 and
//!   never reach the backend.
//! - Backend failures come back as a normal tool result with `isError: true`
//!   and a readable text such as `API 404: grid not found`.
//!
//! ```rust,ignore
//! let registry = Arc::new(default_registry(client)?);
//! let handler = McpHandler::new(registry);
//! serve(&handler, &mut StdioTransport::new()).await?;
//! ```

pub mod handlers;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use handlers::McpHandler;
pub use protocol::*;
pub use server::{McpServer, McpServerState};
pub use tools::{default_registry, McpTool, RegistrationError, ToolContext, ToolError, ToolRegistry, ToolResult};
pub use transport::{serve, BufferTransport, McpTransport, StdioTransport, TransportError};
