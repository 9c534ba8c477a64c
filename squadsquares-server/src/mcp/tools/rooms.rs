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

//! Room listing and grid status tools.

use async_trait::async_trait;
use serde_json::{json, Value};
use squadsquares_client::SquadSquaresClient;
use std::sync::Arc;

use super::{grid_id_property, parse_params, GridParams, McpTool, ToolContext, ToolError, ToolResult};

/// `listRooms`
pub struct ListRoomsTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl ListRoomsTool {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self {
            client,
            schema: json!({
                "type": "object",
                "properties": {}
            }),
        }
    }
}

#[async_trait]
impl McpTool for ListRoomsTool {
    fn name(&self) -> &str {
        "listRooms"
    }

    fn description(&self) -> &str {
        "List all active Squad Squares game rooms"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, _params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let rooms = self.client.list_rooms().await?;
        ToolResult::json(&rooms)
    }
}

/// `getGridStatus`
pub struct GetGridStatusTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl GetGridStatusTool {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self {
            client,
            schema: json!({
                "type": "object",
                "properties": {
                    "gridId": grid_id_property("The grid/room ID")
                },
                "required": ["gridId"]
            }),
        }
    }
}

#[async_trait]
impl McpTool for GetGridStatusTool {
    fn name(&self) -> &str {
        "getGridStatus"
    }

    fn description(&self) -> &str {
        "Get the current score, period, clock, and status of a Squad Squares game"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let GridParams { grid_id } = parse_params(params)?;
        let status = self.client.get_grid_status(&grid_id).await?;
        ToolResult::json(&status)
    }
}
