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

//! Squad Squares backend client
//!
//! One request per call, no retries, no caching. Failures are split into
//! "backend answered with an error" and "backend could not be reached".

use crate::types::*;
use reqwest::{header, Client as HttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Backend call errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Backend reachable but answered with a non-success status.
    #[error("API {status}: {body}")]
    Rejected { status: u16, body: String },

    /// No response obtained at all (connect, DNS, timeout).
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Backend answered but the body is not the JSON we expect.
    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client itself could not be set up.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

impl BackendError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            BackendError::InvalidUrl(error_chain(&err))
        } else {
            BackendError::Unavailable(error_chain(&err))
        }
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Squad Squares backend
    pub base_url: String,
    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Status and body of a relayed backend response.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardedResponse {
    pub status: u16,
    /// `None` when the backend sent an empty body.
    pub body: Option<Value>,
}

/// Client for the Squad Squares backend.
///
/// # Example
///
/// ```no_run
/// use squadsquares_client::{ClientConfig, SquadSquaresClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = SquadSquaresClient::new(ClientConfig::new("http://localhost:8000"))?;
/// let claim = client.claim_square("abc123", "3,7", "Alice").await?;
/// println!("claimed {:?} as {:?}", claim.position, claim.user_id);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SquadSquaresClient {
    config: ClientConfig,
    http_client: HttpClient,
}

impl SquadSquaresClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::ClientSetup(error_chain(&e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", self.config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn build(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<reqwest::RequestBuilder> {
        let url = self.url_for(segments)?;
        debug!(method = %method, url = %url, "backend request");

        let mut request = self
            .http_client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        Ok(request)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request.send().await.map_err(|e| {
            let err = BackendError::from_transport(e);
            warn!(error = %err, "backend call failed");
            err
        })
    }

    /// Issue a call and decode a successful JSON body into `T`.
    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = self.build(method, segments, query)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.send(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(BackendError::from_transport)?;
            warn!(status = status.as_u16(), "backend rejected request");
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(BackendError::from_transport)?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        self.request::<T, ()>(Method::GET, segments, query, None)
            .await
    }

    /// `GET /rooms`
    pub async fn list_rooms(&self) -> Result<Vec<Room>> {
        let response: RoomsResponse = self.get(&["rooms"], &[]).await?;
        Ok(response.rooms)
    }

    /// `GET /grids/{gridId}`
    pub async fn get_grid_status(&self, grid_id: &str) -> Result<GridStatus> {
        self.get(&["grids", grid_id], &[]).await
    }

    /// `POST /grids/{gridId}/join`
    pub async fn claim_square(
        &self,
        grid_id: &str,
        position: &str,
        user_name: &str,
    ) -> Result<ClaimResult> {
        let body = ClaimRequest {
            user_name: user_name.to_string(),
            preferred_position: position.to_string(),
        };
        self.request(Method::POST, &["grids", grid_id, "join"], &[], Some(&body))
            .await
    }

    /// `GET /grids/{gridId}/availability`
    pub async fn check_availability(&self, grid_id: &str) -> Result<Availability> {
        self.get(&["grids", grid_id, "availability"], &[]).await
    }

    /// `POST /grids/{gridId}/messages`
    pub async fn send_message(
        &self,
        grid_id: &str,
        sender: &str,
        content: &str,
    ) -> Result<MessageReceipt> {
        let body = MessageRequest {
            sender: sender.to_string(),
            content: content.to_string(),
        };
        self.request(
            Method::POST,
            &["grids", grid_id, "messages"],
            &[],
            Some(&body),
        )
        .await
    }

    /// `GET /grids/{gridId}/messages?after_seq=N`
    pub async fn list_messages(&self, grid_id: &str, after_seq: u64) -> Result<Vec<ChatMessage>> {
        let response: MessagesResponse = self
            .get(
                &["grids", grid_id, "messages"],
                &[("after_seq", after_seq.to_string())],
            )
            .await?;
        Ok(response.messages)
    }

    /// `GET /games/espn/{sportPath}?league={sport}`, normalized to a list.
    pub async fn list_live_games(&self, sport: Sport) -> Result<Vec<LiveGame>> {
        let payload: GamesPayload = self
            .get(
                &["games", "espn", sport.espn_path()],
                &[("league", sport.league().to_string())],
            )
            .await?;
        Ok(payload.into_games())
    }

    /// Relay a call verbatim.
    ///
    /// Unlike the typed operations a non-success status with a JSON (or empty)
    /// body is returned as data, so the caller can pass it on unchanged. A
    /// non-success status with any other body is a [`BackendError::Rejected`]
    /// carrying the raw text.
    pub async fn forward(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<Vec<u8>>,
    ) -> Result<ForwardedResponse> {
        let mut request = self.build(method, segments, query)?;
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = self.send(request).await?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(BackendError::from_transport)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ForwardedResponse {
                status: status.as_u16(),
                body: None,
            });
        }

        match serde_json::from_slice(&bytes) {
            Ok(body) => Ok(ForwardedResponse {
                status: status.as_u16(),
                body: Some(body),
            }),
            Err(_) if !status.is_success() => {
                warn!(status = status.as_u16(), "backend rejected request");
                Err(BackendError::Rejected {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                })
            }
            Err(e) => Err(BackendError::InvalidResponse(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    async fn client_for(server: &mockito::ServerGuard) -> SquadSquaresClient {
        SquadSquaresClient::new(ClientConfig::new(server.url())).unwrap()
    }

    fn unreachable_client() -> SquadSquaresClient {
        SquadSquaresClient::new(
            ClientConfig::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2)),
        )
        .unwrap()
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let client =
            SquadSquaresClient::new(ClientConfig::new("http://localhost:8000/api/")).unwrap();
        let url = client.url_for(&["grids", "a b/c", "join"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/grids/a%20b%2Fc/join");

        let client = SquadSquaresClient::new(ClientConfig::new("not a url")).unwrap();
        assert!(matches!(
            client.url_for(&["rooms"]),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_claim_square_sends_backend_field_names() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/grids/abc123/join")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(
                json!({"user_name": "Alice", "preferred_position": "3,7"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"position":"3,7","userId":"u1"}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let claim = client.claim_square("abc123", "3,7", "Alice").await.unwrap();

        assert_eq!(claim.position, Some(json!("3,7")));
        assert_eq!(claim.user_id, Some(json!("u1")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_messages_sends_after_seq() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/grids/g1/messages")
            .match_query(Matcher::UrlEncoded("after_seq".into(), "0".into()))
            .with_status(200)
            .with_body(r#"{"messages":[{"sender":"Bob","content":"hi","seq":1,"ts":"2025-02-09T01:00:00Z"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let messages = client.list_messages("g1", 0).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Some(json!("Bob")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_live_games_uses_espn_path_and_league() {
        let mut server = mockito::Server::new_async().await;
        let nfl = server
            .mock("GET", "/games/espn/football")
            .match_query(Matcher::UrlEncoded("league".into(), "nfl".into()))
            .with_status(200)
            .with_body(r#"{"games":[{"game_id":"401","home":"KC"}]}"#)
            .create_async()
            .await;
        let nba = server
            .mock("GET", "/games/espn/basketball")
            .match_query(Matcher::UrlEncoded("league".into(), "nba".into()))
            .with_status(200)
            .with_body(r#"[{"game_id":"9"}]"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let games = client.list_live_games(Sport::Nfl).await.unwrap();
        assert!(games[0].has_id("401"));
        let games = client.list_live_games(Sport::Nba).await.unwrap();
        assert!(games[0].has_id("9"));

        nfl.assert_async().await;
        nba.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejection_keeps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/grids/missing")
            .with_status(404)
            .with_body(r#"{"detail":"Grid not found"}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let err = client.get_grid_status("missing").await.unwrap_err();

        assert_eq!(
            err,
            BackendError::Rejected {
                status: 404,
                body: r#"{"detail":"Grid not found"}"#.to_string()
            }
        );
        assert_eq!(err.to_string(), r#"API 404: {"detail":"Grid not found"}"#);
        assert!(!err.is_unavailable());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_unavailable() {
        let err = unreachable_client().list_rooms().await.unwrap_err();
        assert!(err.is_unavailable(), "got {err:?}");
        assert!(err.to_string().starts_with("Backend unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rooms")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let client = client_for(&server).await;
        let err = client.list_rooms().await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_forward_relays_rejections_as_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/grids/g1/join")
            .match_body(r#"{"user_name":"Al"}"#)
            .with_status(409)
            .with_body(r#"{"detail":"Square taken"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/rooms")
            .with_status(204)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let relayed = client
            .forward(
                Method::POST,
                &["grids", "g1", "join"],
                &[],
                Some(br#"{"user_name":"Al"}"#.to_vec()),
            )
            .await
            .unwrap();
        assert_eq!(relayed.status, 409);
        assert_eq!(relayed.body, Some(json!({"detail": "Square taken"})));

        let empty = client
            .forward(Method::GET, &["rooms"], &[], None)
            .await
            .unwrap();
        assert_eq!(empty, ForwardedResponse { status: 204, body: None });
    }

    #[tokio::test]
    async fn test_forward_plain_text_rejection_keeps_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rooms")
            .with_status(500)
            .with_header("content-type", "text/plain")
            .with_body("Internal Server Error")
            .create_async()
            .await;
        server
            .mock("GET", "/grids/g1")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_for(&server).await;
        let err = client
            .forward(Method::GET, &["rooms"], &[], None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BackendError::Rejected {
                status: 500,
                body: "Internal Server Error".to_string()
            }
        );

        let err = client
            .forward(Method::GET, &["grids", "g1"], &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_truncated_rejection_body_is_unavailable() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\npartial")
                .await
                .unwrap();
        });

        let client = SquadSquaresClient::new(
            ClientConfig::new(format!("http://{}", addr)).with_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        let err = client.list_rooms().await.unwrap_err();
        assert!(err.is_unavailable(), "got {err:?}");
    }
}
