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

//! Grid-scoped proxy functions: square claims and room chat.

use axum::{
    extract::{Path, Query, State},
    http::Method,
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::api::{non_empty, preflight, relay, ProxyError, ProxyState};

const JOIN_ALLOWED: &[&str] = &["POST"];
const MESSAGES_ALLOWED: &[&str] = &["GET", "POST"];

/// Query parameters for listing messages
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    /// Forwarded as-is when present
    pub after_seq: Option<String>,
}

/// POST /api/grids/:grid_id/join
pub async fn join(
    State(state): State<ProxyState>,
    Path(grid_id): Path<String>,
    method: Method,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if let Some(done) = preflight(&method, JOIN_ALLOWED)? {
        return Ok(done);
    }

    let forwarded = state
        .client
        .forward(method, &["grids", &grid_id, "join"], &[], non_empty(body))
        .await?;
    Ok(relay(forwarded))
}

/// GET|POST /api/grids/:grid_id/messages
pub async fn messages(
    State(state): State<ProxyState>,
    Path(grid_id): Path<String>,
    Query(query): Query<MessagesQuery>,
    method: Method,
    body: Bytes,
) -> Result<Response, ProxyError> {
    if let Some(done) = preflight(&method, MESSAGES_ALLOWED)? {
        return Ok(done);
    }

    let segments = ["grids", grid_id.as_str(), "messages"];
    let forwarded = if method == Method::POST {
        state
            .client
            .forward(method, &segments, &[], non_empty(body))
            .await?
    } else {
        let params: Vec<(&str, String)> = query
            .after_seq
            .map(|seq| vec![("after_seq", seq)])
            .unwrap_or_default();
        state.client.forward(method, &segments, &params, None).await?
    };
    Ok(relay(forwarded))
}
