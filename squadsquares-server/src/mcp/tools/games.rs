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

//! ESPN live game tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use squadsquares_client::{SquadSquaresClient, Sport};
use std::sync::Arc;
use tracing::debug;

use super::{parse_params, McpTool, ToolContext, ToolError, ToolResult};

#[derive(Debug, Deserialize)]
struct ListLiveGamesParams {
    #[serde(default)]
    sport: Sport,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckScoreParams {
    game_id: String,
    #[serde(default)]
    sport: Sport,
}

fn sport_property(description: &str) -> Value {
    let leagues: Vec<&str> = Sport::ALL.iter().map(|s| s.league()).collect();
    json!({
        "type": "string",
        "enum": leagues,
        "default": Sport::default().league(),
        "description": description
    })
}

/// `listLiveGames`
pub struct ListLiveGamesTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl ListLiveGamesTool {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self {
            client,
            schema: json!({
                "type": "object",
                "properties": {
                    "sport": sport_property("Sport league to query (nba or nfl)")
                }
            }),
        }
    }
}

#[async_trait]
impl McpTool for ListLiveGamesTool {
    fn name(&self) -> &str {
        "listLiveGames"
    }

    fn description(&self) -> &str {
        "List live and upcoming games from ESPN for a given sport"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let ListLiveGamesParams { sport } = parse_params(params)?;
        let games = self.client.list_live_games(sport).await?;
        ToolResult::json(&games)
    }
}

/// `checkScore`
///
/// An id missing from the fetched list is an ordinary answer, not an error.
pub struct CheckScoreTool {
    client: Arc<SquadSquaresClient>,
    schema: Value,
}

impl CheckScoreTool {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self {
            client,
            schema: json!({
                "type": "object",
                "properties": {
                    "gameId": {
                        "type": "string",
                        "description": "ESPN game ID"
                    },
                    "sport": sport_property("Sport league (nba or nfl)")
                },
                "required": ["gameId"]
            }),
        }
    }
}

#[async_trait]
impl McpTool for CheckScoreTool {
    fn name(&self) -> &str {
        "checkScore"
    }

    fn description(&self) -> &str {
        "Check the live ESPN score for a specific game by game ID"
    }

    fn input_schema(&self) -> &Value {
        &self.schema
    }

    async fn execute(&self, params: Value, _context: &ToolContext) -> Result<ToolResult, ToolError> {
        let CheckScoreParams { game_id, sport } = parse_params(params)?;
        let games = self.client.list_live_games(sport).await?;

        match games.iter().find(|game| game.has_id(&game_id)) {
            Some(game) => ToolResult::json(game),
            None => {
                debug!(game_id = %game_id, sport = %sport, searched = games.len(), "game not found");
                Ok(ToolResult::text(format!("No game found with ID {}", game_id)))
            }
        }
    }
}
