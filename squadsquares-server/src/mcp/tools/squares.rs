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

//! Square claim and availability tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use squadsquares_client::SquadSquaresClient;
use std::sync::Arc;

use super::{
    grid_id_property, parse_params, verbatim, GridParams, McpTool, ToolContext, ToolError,
    ToolResult,
};

/// Squares on a 10x10 grid.
pub const GRID_SQUARES: u32 = 100;

/// `row,col` with non-negative integer coordinates.
pub const POSITION_PATTERN: &str = r"^\d+\s*,\s*\d+$";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimSquareParams {
    grid_id: String,
    position: String,
    user_name: String,
}

/// `claimSquare`
pub struct ClaimSquareTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl ClaimSquareTool {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self {
            client,
            schema: json!({
                "type": "object",
                "properties": {
                    "gridId": grid_id_property("The grid/room ID"),
                    "position": {
                        "type": "string",
                        "pattern": POSITION_PATTERN,
                        "description": "Square position in 'row,col' format (e.g. '3,7')"
                    },
                    "userName": {
                        "type": "string",
                        "description": "Name of the player claiming the square"
                    }
                },
                "required": ["gridId", "position", "userName"]
            }),
        }
    }
}

#[async_trait]
impl McpTool for ClaimSquareTool {
    fn name(&self) -> &str {
        "claimSquare"
    }

    fn description(&self) -> &str {
        "Claim a square on the Squad Squares grid for a player"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let params: ClaimSquareParams = parse_params(params)?;
        let claim = self
            .client
            .claim_square(&params.grid_id, &params.position, &params.user_name)
            .await?;

        Ok(ToolResult::text(format!(
            "Square {} claimed by {} (userId={})",
            verbatim(claim.position.as_ref()),
            params.user_name,
            verbatim(claim.user_id.as_ref())
        )))
    }
}

/// `checkAvailability`
pub struct CheckAvailabilityTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl CheckAvailabilityTool {
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
impl McpTool for CheckAvailabilityTool {
    fn name(&self) -> &str {
        "checkAvailability"
    }

    fn description(&self) -> &str {
        "Check which squares are available (unclaimed) on a Squad Squares grid"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let GridParams { grid_id } = parse_params(params)?;
        let availability = self.client.check_availability(&grid_id).await?;

        let positions = availability
            .positions()
            .map(verbatim)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(ToolResult::text(format!(
            "{} available, {} claimed out of {}.\n\nAvailable positions: {}",
            verbatim(availability.total_available.as_ref()),
            verbatim(availability.total_claimed.as_ref()),
            GRID_SQUARES,
            positions
        )))
    }
}
