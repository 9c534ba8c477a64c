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

//! Squad Squares tools
//!
//! Eight tools, one backend call each (`checkScore` searches the fetched
//! game list locally). Arguments are checked against each tool's JSON Schema
//! by the [`ToolRegistry`] before any tool code runs.

pub mod chat;
pub mod games;
pub mod registry;
pub mod rooms;
pub mod squares;

use serde::Deserialize;
use serde_json::Value;
use squadsquares_client::SquadSquaresClient;
use std::sync::Arc;

pub use chat::{ListMessagesTool, SendMessageTool};
pub use games::{CheckScoreTool, ListLiveGamesTool};
pub use registry::{
    parse_params, McpTool, RegistrationError, ToolContext, ToolError, ToolRegistry, ToolResult,
};
pub use rooms::{GetGridStatusTool, ListRoomsTool};
pub use squares::{CheckAvailabilityTool, ClaimSquareTool};

/// Arguments shared by the tools that act on a single grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridParams {
    pub grid_id: String,
}

/// JSON Schema property for the grid id.
pub(crate) fn grid_id_property(description: &str) -> Value {
    serde_json::json!({ "type": "string", "minLength": 1, "description": description })
}

/// Render a backend scalar the way it reads in prose: strings unquoted.
///
/// A field the backend left out renders as `null`.
pub(crate) fn verbatim(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => Value::Null.to_string(),
    }
}

/// Registry holding every Squad Squares tool, all sharing one backend client.
pub fn default_registry(client: Arc<SquadSquaresClient>) -> Result<ToolRegistry, RegistrationError> {
    let registry = ToolRegistry::new();
    let tools: Vec<Arc<dyn McpTool>> = vec![
        Arc::new(ListRoomsTool::new(client.clone())),
        Arc::new(GetGridStatusTool::new(client.clone())),
        Arc::new(ClaimSquareTool::new(client.clone())),
        Arc::new(CheckAvailabilityTool::new(client.clone())),
        Arc::new(SendMessageTool::new(client.clone())),
        Arc::new(ListMessagesTool::new(client.clone())),
        Arc::new(ListLiveGamesTool::new(client.clone())),
        Arc::new(CheckScoreTool::new(client)),
    ];
    for tool in tools {
        registry.register(tool)?;
    }
    Ok(registry)
}
