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

//! MCP Request Handlers
//!
//! Handles JSON-RPC 2.0 requests for the MCP protocol.

use crate::mcp::protocol::*;
use crate::mcp::tools::{ToolContext, ToolError, ToolRegistry};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// MCP request handler
pub struct McpHandler {
    registry: Arc<ToolRegistry>,
}

impl McpHandler {
    /// Create a new MCP handler
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one raw JSON-RPC message as read off a transport.
    ///
    /// Text that is not JSON gets a -32700 reply with a null id; JSON that is
    /// not a request gets -32600.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Invalid JSON-RPC message");
                return Some(JsonRpcResponse::error(
                    JsonRpcId::Null,
                    JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
                ));
            }
        };

        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<JsonRpcId>(id.clone()).ok())
            .unwrap_or(JsonRpcId::Null);

        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                warn!(error = %e, "Malformed JSON-RPC request");
                Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ))
            }
        }
    }

    /// Handle a JSON-RPC request
    ///
    /// Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }
        let id = request.id.clone().unwrap_or(JsonRpcId::Null);

        info!(method = %request.method, "MCP request received");

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            ));
        }

        let response = match request.method.as_str() {
            "ping" => JsonRpcResponse::success(id, json!({})),
            "initialize" => self.handle_initialize(id, request.params),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => {
                warn!(method = %request.method, "Unknown MCP method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(&request.method))
            }
        };

        Some(response)
    }

    fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => info!("MCP client initialized"),
            other => debug!(method = %other, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, id: JsonRpcId, params: Option<Value>) -> JsonRpcResponse {
        let init_params: InitializeParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                    )
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing initialize params"),
                )
            }
        };

        info!(
            client = %init_params.client_info.name,
            client_version = %init_params.client_info.version,
            requested_protocol = %init_params.protocol_version,
            "MCP client connecting"
        );

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(id, &result)
    }

    /// Handle tools/list
    fn handle_tools_list(&self, id: JsonRpcId) -> JsonRpcResponse {
        let result = ListToolsResult {
            tools: self.registry.list(),
            next_cursor: None,
        };
        respond(id, &result)
    }

    /// Handle tools/call
    ///
    /// Argument problems are protocol errors. A backend failure is a tool
    /// result flagged `isError` so the assistant can read it.
    async fn handle_tools_call(&self, id: JsonRpcId, params: Option<Value>) -> JsonRpcResponse {
        let call_params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid tool call params: {}", e)),
                    )
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing tool call params"),
                )
            }
        };

        let arguments = Value::Object(call_params.arguments.unwrap_or_default());
        let context = ToolContext {
            request_id: Some(id.clone()),
        };

        match self
            .registry
            .execute(&call_params.name, arguments, &context)
            .await
        {
            Ok(output) => respond(id, &CallToolResult::text(output.text)),
            Err(ToolError::NotFound(name)) => JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_params(format!("Unknown tool: {}", name)),
            ),
            Err(ToolError::InvalidParams(message)) => {
                debug!(tool = %call_params.name, %message, "Rejected tool arguments");
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(message))
            }
            Err(err) => {
                warn!(tool = %call_params.name, error = %err, "Tool call failed");
                respond(id, &CallToolResult::error_text(err.to_string()))
            }
        }
    }
}

fn respond<T: Serialize>(id: JsonRpcId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::tools::tests::registry_for;

    fn handler_for(base_url: &str) -> McpHandler {
        McpHandler::new(Arc::new(registry_for(base_url)))
    }

    fn call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(
            id,
            "tools/call",
            Some(json!({"name": name, "arguments": arguments})),
        )
    }

    #[tokio::test]
    async fn test_initialize_reports_server_info() {
        let handler = handler_for("http://localhost:8000");
        let response = handler
            .handle_request(JsonRpcRequest::new(
                1,
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "0.0.1"}
                })),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "squad-squares-mcp");
        assert_eq!(result["serverInfo"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let handler = handler_for("http://localhost:8000");
        for method in ["notifications/initialized", "initialized", "tools/list"] {
            let notification: JsonRpcRequest =
                serde_json::from_value(json!({"jsonrpc": "2.0", "method": method})).unwrap();
            assert!(handler.handle_request(notification).await.is_none(), "{method}");
        }
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let handler = handler_for("http://localhost:8000");
        let response = handler
            .handle_request(JsonRpcRequest::new(7, "resources/list", None))
            .await
            .unwrap();
        assert_eq!(response.id, JsonRpcId::Number(7));
        assert_eq!(response.error.unwrap().code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tools_list_has_all_eight() {
        let handler = handler_for("http://localhost:8000");
        let response = handler
            .handle_request(JsonRpcRequest::new(2, "tools/list", None))
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 8);
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_argument_and_name_errors_are_invalid_params() {
        let handler = handler_for("http://127.0.0.1:1");

        let response = handler
            .handle_request(call(3, "claimSquare", json!({"gridId": "abc123"})))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_PARAMS);

        let response = handler
            .handle_request(call(4, "deleteGrid", json!({})))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, JsonRpcError::INVALID_PARAMS);
        assert_eq!(error.message, "Unknown tool: deleteGrid");
    }

    #[tokio::test]
    async fn test_backend_rejection_is_tool_error_result() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/grids/nope")
            .with_status(404)
            .with_body("grid not found")
            .create_async()
            .await;

        let handler = handler_for(&server.url());
        let response = handler
            .handle_request(call(5, "getGridStatus", json!({"gridId": "nope"})))
            .await
            .unwrap();

        assert!(response.error.is_none());
        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.joined_text(), "API 404: grid not found");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_tool_error_result() {
        let handler = handler_for("http://127.0.0.1:1");
        let response = handler
            .handle_request(call(6, "listRooms", json!({})))
            .await
            .unwrap();

        let result: CallToolResult = serde_json::from_value(response.result.unwrap()).unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result.joined_text().starts_with("Backend unavailable: "));
    }

    #[tokio::test]
    async fn test_raw_message_errors() {
        let handler = handler_for("http://localhost:8000");

        let response = handler.handle_message("{not json").await.unwrap();
        assert_eq!(response.id, JsonRpcId::Null);
        assert_eq!(response.error.unwrap().code, JsonRpcError::PARSE_ERROR);

        let response = handler
            .handle_message(r#"{"jsonrpc":"2.0","id":9}"#)
            .await
            .unwrap();
        assert_eq!(response.id, JsonRpcId::Number(9));
        assert_eq!(response.error.unwrap().code, JsonRpcError::INVALID_REQUEST);

        let response = handler
            .handle_message(r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(response.result, Some(json!({})));
    }
}
