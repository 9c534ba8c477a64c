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

use axum::{
    extract::{Path, State},
    http::Method,
    response::Response,
};
use squadsquares_client::espn_route;
use tracing::debug;

use crate::api::{preflight, relay, ProxyError, ProxyState};

const ALLOWED: &[&str] = &["GET"];

/// GET /api/games/:sport
///
/// `nba` and `nfl` are remapped to ESPN's sport path; the `league` query
/// parameter always carries the token the caller sent.
pub async fn live_games(
    State(state): State<ProxyState>,
    Path(sport): Path<String>,
    method: Method,
) -> Result<Response, ProxyError> {
    if let Some(done) = preflight(&method, ALLOWED)? {
        return Ok(done);
    }

    let (espn_sport, league) = espn_route(&sport);
    debug!(sport = %sport, espn_sport, "relaying live games");

    let forwarded = state
        .client
        .forward(
            method,
            &["games", "espn", espn_sport],
            &[("league", league.to_string())],
            None,
        )
        .await?;
    Ok(relay(forwarded))
}
