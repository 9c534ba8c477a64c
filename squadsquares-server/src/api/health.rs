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

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use crate::api::ProxyState;

/// Health check response structure
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Backend base URL this proxy relays to
    pub backend: String,
}

/// GET /api/health - local liveness only, the backend is not contacted
pub async fn health_check(State(state): State<ProxyState>) -> Json<HealthResponse> {
    debug!("Health check requested");

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        backend: state.client.base_url().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{send, test_app};
    use axum::http::StatusCode;
    use serde_json::Value;

    #[tokio::test]
    async fn test_health_reports_backend() {
        let (status, body) = send(test_app("http://127.0.0.1:1"), "GET", "/api/health", "").await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "http://127.0.0.1:1");
    }
}
