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

use axum::{extract::State, http::Method, response::Response};

use crate::api::{preflight, relay, ProxyError, ProxyState};

const ALLOWED: &[&str] = &["GET"];

/// GET /api/rooms
pub async fn list_rooms(
    State(state): State<ProxyState>,
    method: Method,
) -> Result<Response, ProxyError> {
    if let Some(done) = preflight(&method, ALLOWED)? {
        return Ok(done);
    }

    let forwarded = state.client.forward(method, &["rooms"], &[], None).await?;
    Ok(relay(forwarded))
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{send, test_app};
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_rooms_relayed_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rooms")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"rooms":[{"id":"abc123","name":"Finals"}]}"#)
            .create_async()
            .await;

        let (status, body) = send(test_app(&server.url()), "GET", "/api/rooms", "").await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"rooms": [{"id": "abc123", "name": "Finals"}]}));
        mock.assert_async().await;
    }
}
