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

//! HTTP proxy functions
//!
//! One stateless handler per backend resource. Each handler answers `OPTIONS`
//! itself, rejects methods the resource does not take, and otherwise relays
//! the call to the backend and the backend's status and JSON back.
//!
//! ```text
//! GET      /api/games/:sport             -> /games/espn/{basketball|football}?league={sport}
//! POST     /api/grids/:grid_id/join      -> /grids/{gridId}/join
//! GET|POST /api/grids/:grid_id/messages  -> /grids/{gridId}/messages[?after_seq=N]
//! GET      /api/rooms                    -> /rooms
//! ```

pub mod games;
pub mod grids;
pub mod health;
pub mod rooms;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use squadsquares_client::{BackendError, ForwardedResponse, SquadSquaresClient};
use std::sync::Arc;
use tracing::warn;

/// Label of the 502 body every handler returns when the backend is unreachable.
pub const BACKEND_UNAVAILABLE: &str = "Backend unavailable";
pub const INVALID_BACKEND_RESPONSE: &str = "Invalid backend response";
/// Label used when the backend's error body is not JSON and is relayed as text.
pub const BACKEND_REJECTED: &str = "Backend rejected request";

/// Shared proxy state
#[derive(Clone)]
pub struct ProxyState {
    pub client: Arc<SquadSquaresClient>,
}

impl ProxyState {
    pub fn new(client: Arc<SquadSquaresClient>) -> Self {
        Self { client }
    }
}

/// Proxy error type
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed { allowed: &'static [&'static str] },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::MethodNotAllowed { allowed } => {
                let allow = allowed
                    .iter()
                    .copied()
                    .chain(std::iter::once("OPTIONS"))
                    .collect::<Vec<_>>()
                    .join(", ");
                (
                    StatusCode::METHOD_NOT_ALLOWED,
                    [(header::ALLOW, allow)],
                    Json(ErrorBody {
                        error: "Method not allowed".to_string(),
                        detail: None,
                    }),
                )
                    .into_response()
            }
            ProxyError::Backend(err) => {
                warn!(error = %err, "proxy call failed");
                let (status, label, detail) = match err {
                    BackendError::Unavailable(detail)
                    | BackendError::InvalidUrl(detail)
                    | BackendError::ClientSetup(detail) => {
                        (StatusCode::BAD_GATEWAY, BACKEND_UNAVAILABLE, detail)
                    }
                    BackendError::InvalidResponse(detail) => {
                        (StatusCode::BAD_GATEWAY, INVALID_BACKEND_RESPONSE, detail)
                    }
                    BackendError::Rejected { status, body } => (
                        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                        BACKEND_REJECTED,
                        body,
                    ),
                };
                (
                    status,
                    Json(ErrorBody {
                        error: label.to_string(),
                        detail: Some(detail),
                    }),
                )
                    .into_response()
            }
        }
    }
}

/// Answer `OPTIONS` and unsupported methods before any backend call.
///
/// `Ok(Some(_))` is a finished response, `Ok(None)` means go ahead and forward.
pub(crate) fn preflight(
    method: &Method,
    allowed: &'static [&'static str],
) -> Result<Option<Response>, ProxyError> {
    if *method == Method::OPTIONS {
        return Ok(Some(StatusCode::NO_CONTENT.into_response()));
    }
    if !allowed.contains(&method.as_str()) {
        return Err(ProxyError::MethodNotAllowed { allowed });
    }
    Ok(None)
}

/// Turn a relayed backend answer into our response, status and JSON unchanged.
pub(crate) fn relay(forwarded: ForwardedResponse) -> Response {
    let status = StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY);
    match forwarded.body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    }
}

/// Non-empty request body, if any.
pub(crate) fn non_empty(body: bytes::Bytes) -> Option<Vec<u8>> {
    if body.is_empty() {
        None
    } else {
        Some(body.to_vec())
    }
}

/// Router with every proxy function mounted under `/api`
pub fn api_router(state: ProxyState) -> Router {
    let routes = Router::new()
        .route("/games/:sport", any(games::live_games))
        .route("/grids/:grid_id/join", any(grids::join))
        .route("/grids/:grid_id/messages", any(grids::messages))
        .route("/rooms", any(rooms::list_rooms))
        .route("/health", get(health::health_check))
        .with_state(state);

    Router::new().nest("/api", routes)
}
