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

//! Room chat tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use squadsquares_client::SquadSquaresClient;
use std::sync::Arc;

use super::{grid_id_property, parse_params, verbatim, McpTool, ToolContext, ToolError, ToolResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageParams {
    grid_id: String,
    sender: String,
    content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessagesParams {
    grid_id: String,
    #[serde(default)]
    after_seq: u64,
}

/// `sendMessage`
pub struct SendMessageTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl SendMessageTool {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self {
            client,
            schema: json!({
                "type": "object",
                "properties": {
                    "gridId": grid_id_property("The grid/room ID to send the message to"),
                    "sender": {
                        "type": "string",
                        "description": "Display name of the sender"
                    },
                    "content": {
                        "type": "string",
                        "description": "Message content"
                    }
                },
                "required": ["gridId", "sender", "content"]
            }),
        }
    }
}

#[async_trait]
impl McpTool for SendMessageTool {
    fn name(&self) -> &str {
        "sendMessage"
    }

    fn description(&self) -> &str {
        "Send a chat message to a Squad Squares game room"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let params: SendMessageParams = parse_params(params)?;
        let receipt = self
            .client
            .send_message(&params.grid_id, &params.sender, &params.content)
            .await?;

        Ok(ToolResult::text(format!(
            "Message sent (seq={}, ts={})",
            verbatim(receipt.seq.as_ref()),
            verbatim(receipt.ts.as_ref())
        )))
    }
}

/// `listMessages`
pub struct ListMessagesTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl ListMessagesTool {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self {
            client,
            schema: json!({
                "type": "object",
                "properties": {
                    "gridId": grid_id_property("The grid/room ID"),
                    "afterSeq": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 0,
                        "description": "Only return messages after this sequence number"
                    }
                },
                "required": ["gridId"]
            }),
        }
    }
}

#[async_trait]
impl McpTool for ListMessagesTool {
    fn name(&self) -> &str {
        "listMessages"
    }

    fn description(&self) -> &str {
        "List chat messages in a Squad Squares game room"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let params: ListMessagesParams = parse_params(params)?;
        let messages = self
            .client
            .list_messages(&params.grid_id, params.after_seq)
            .await?;
        ToolResult::json(&messages)
    }
}
