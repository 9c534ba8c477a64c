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

//! Request and response shapes of the Squad Squares backend.
//!
//! Every type here mirrors what the backend sends. Response fields are kept as
//! raw JSON values, so a number where a string was expected (or a missing
//! field) is relayed as-is instead of failing the call. Fields the adapter does
//! not name are kept in a flattened map so they survive a round trip untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Keep an explicit `null` as `Some(Value::Null)`; only an absent field is `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// A game room summary as listed by `GET /rooms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RoomsResponse {
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// Play-state snapshot of one grid.
///
/// Only the fields surfaced to callers are kept. Anything the backend omits
/// stays omitted on output rather than turning into `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridStatus {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub game_mode: Option<Value>,
    /// Team names or team objects, whichever the backend uses.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub home_team: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub away_team: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub home_score: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub away_score: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub period: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub clock: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub total_claimed: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub current_winner_position: Option<Value>,
}

/// Body of `POST /grids/{gridId}/join`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRequest {
    pub user_name: String,
    /// `"row,col"`
    pub preferred_position: String,
}

/// Outcome of a successful square claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResult {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(
        rename = "userId",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<Value>,
}

/// A single free cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Square {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub position: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which cells of a grid are still free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub total_available: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub total_claimed: Option<Value>,
    #[serde(default)]
    pub available: Vec<Square>,
}

impl Availability {
    /// Positions of the free squares in backend order.
    pub fn positions(&self) -> impl Iterator<Item = Option<&Value>> {
        self.available.iter().map(|s| s.position.as_ref())
    }
}

/// Body of `POST /grids/{gridId}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    pub sender: String,
    pub content: String,
}

/// What the backend assigns to a posted message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageReceipt {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub seq: Option<Value>,
    /// Timestamp exactly as the backend formats it (string or number).
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
}

/// One chat entry of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sender: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub seq: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub ts: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// A game snapshot relayed from ESPN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveGame {
    /// ESPN ids are usually strings but may arrive as numbers.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub game_id: Option<Value>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl LiveGame {
    /// Strict id match: only a string id equal to `game_id` counts.
    pub fn has_id(&self, game_id: &str) -> bool {
        matches!(&self.game_id, Some(Value::String(id)) if id == game_id)
    }
}

/// The ESPN endpoint answers with either a bare list or a `{ games }` wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GamesPayload {
    Bare(Vec<LiveGame>),
    Wrapped {
        #[serde(default)]
        games: Vec<LiveGame>,
    },
}

impl GamesPayload {
    pub fn into_games(self) -> Vec<LiveGame> {
        match self {
            GamesPayload::Bare(games) => games,
            GamesPayload::Wrapped { games } => games,
        }
    }
}

/// Leagues the ESPN passthrough knows about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    #[default]
    Nba,
    Nfl,
}

impl Sport {
    pub const ALL: [Sport; 2] = [Sport::Nba, Sport::Nfl];

    /// League token, also sent as the `league` query parameter.
    pub fn league(self) -> &'static str {
        match self {
            Sport::Nba => "nba",
            Sport::Nfl => "nfl",
        }
    }

    /// Path segment ESPN files this league under.
    pub fn espn_path(self) -> &'static str {
        match self {
            Sport::Nba => "basketball",
            Sport::Nfl => "football",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.league())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sport: {0} (expected nba or nfl)")]
pub struct UnknownSport(pub String);

impl FromStr for Sport {
    type Err = UnknownSport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nba" => Ok(Sport::Nba),
            "nfl" => Ok(Sport::Nfl),
            other => Err(UnknownSport(other.to_string())),
        }
    }
}

/// Path segment and `league` value for a sport token.
///
/// Known leagues are remapped; anything else is passed through unchanged as
/// both segment and league.
pub fn espn_route(sport: &str) -> (&str, &str) {
    match sport.parse::<Sport>() {
        Ok(known) => (known.espn_path(), known.league()),
        Err(_) => (sport, sport),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sport_mapping_keeps_league_token() {
        for sport in Sport::ALL {
            let (segment, league) = espn_route(sport.league());
            assert_eq!(segment, sport.espn_path());
            assert_eq!(league, sport.league());
            assert_ne!(segment, league);
        }
        assert_eq!(espn_route("nba"), ("basketball", "nba"));
        assert_eq!(espn_route("nfl"), ("football", "nfl"));
    }

    #[test]
    fn test_unknown_sport_passes_through() {
        assert_eq!(espn_route("mlb"), ("mlb", "mlb"));
        assert!("NBA".parse::<Sport>().is_err());
    }

    #[test]
    fn test_games_payload_shapes_normalize() {
        let bare: GamesPayload =
            serde_json::from_value(json!([{"game_id": "1", "home": "LAL"}])).unwrap();
        let wrapped: GamesPayload =
            serde_json::from_value(json!({"games": [{"game_id": "1", "home": "LAL"}]})).unwrap();
        let empty: GamesPayload = serde_json::from_value(json!({"source": "espn"})).unwrap();

        assert_eq!(bare.into_games(), wrapped.into_games());
        assert!(empty.into_games().is_empty());
    }

    #[test]
    fn test_grid_status_omits_missing_fields() {
        let status: GridStatus = serde_json::from_value(json!({
            "id": "abc123",
            "homeScore": 21,
            "clock": "4:12",
            "squares": [[null]]
        }))
        .unwrap();

        let out = serde_json::to_value(&status).unwrap();
        assert_eq!(out, json!({"id": "abc123", "homeScore": 21, "clock": "4:12"}));
    }

    #[test]
    fn test_grid_status_relays_values_as_sent() {
        let raw = json!({
            "id": 42,
            "homeScore": "21",
            "awayScore": null,
            "clock": 0,
            "totalClaimed": "64"
        });
        let status: GridStatus = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(status.home_score, Some(json!("21")));
        assert_eq!(status.away_score, Some(Value::Null));
        assert_eq!(serde_json::to_value(&status).unwrap(), raw);
    }

    #[test]
    fn test_partial_chat_messages_decode() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "messages": [
                {"sender": "Bob", "content": "hi", "seq": 1},
                {"content": "system notice", "seq": "2", "ts": 1739143860}
            ]
        }))
        .unwrap();

        assert_eq!(response.messages.len(), 2);
        assert_eq!(response.messages[0].ts, None);
        assert_eq!(response.messages[1].sender, None);
        assert_eq!(response.messages[1].seq, Some(json!("2")));
        assert_eq!(
            serde_json::to_value(&response.messages[0]).unwrap(),
            json!({"sender": "Bob", "content": "hi", "seq": 1})
        );
    }

    #[test]
    fn test_numeric_game_ids_decode_but_never_match() {
        let games = serde_json::from_value::<GamesPayload>(json!({
            "games": [{"game_id": 401585, "home": "BOS"}, {"game_id": "401586"}, {"home": "NYK"}]
        }))
        .unwrap()
        .into_games();

        assert_eq!(games.len(), 3);
        assert_eq!(games[0].game_id, Some(json!(401585)));
        assert!(!games[0].has_id("401585"));
        assert!(games[1].has_id("401586"));
        assert!(!games[2].has_id(""));
    }

    #[test]
    fn test_room_keeps_unknown_fields() {
        let raw = json!({"id": "r1", "name": "Super Bowl", "players": 12});
        let room: Room = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(room.metadata.len(), 2);
        assert_eq!(serde_json::to_value(&room).unwrap(), raw);
    }
}
