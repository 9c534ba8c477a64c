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

//! MCP Server Implementation
//!
//! Serves the same handler as the stdio session over HTTP.

use crate::mcp::handlers::McpHandler;
use crate::mcp::protocol::*;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// MCP endpoint paths
pub mod paths {
    /// HTTP POST endpoint for JSON-RPC requests
    pub const MCP_HTTP: &str = "/mcp";
    /// Health check endpoint (GET)
    pub const MCP_HEALTH: &str = "/mcp/health";
}

/// MCP Server state
#[derive(Clone)]
pub struct McpServerState {
    pub handler: Arc<McpHandler>,
}

/// MCP Server
pub struct McpServer {
    state: McpServerState,
}

impl McpServer {
    pub fn new(handler: Arc<McpHandler>) -> Self {
        Self {
            state: McpServerState { handler },
        }
    }

    /// Get the Axum router for the MCP server
    pub fn router(&self) -> Router {
        Router::new()
            .route(paths::MCP_HTTP, post(handle_mcp_request))
            .route(paths::MCP_HEALTH, get(handle_mcp_health))
            .with_state(self.state.clone())
    }
}

/// Handle MCP health check (GET /mcp/health)
async fn handle_mcp_health(State(state): State<McpServerState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "protocol_version": MCP_PROTOCOL_VERSION,
        "server_name": SERVER_NAME,
        "server_version": env!("CARGO_PKG_VERSION"),
        "tools": state.handler.registry().len(),
    }))
}

/// Handle MCP JSON-RPC request over HTTP POST
///
/// A notification is acknowledged with 202 and no body.
async fn handle_mcp_request(State(state): State<McpServerState>, body: String) -> Response {
    match state.handler.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
