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

//! Squad Squares adapter server
//!
//! Two front doors onto one backend client:
//! - [`mcp`]: the eight Squad Squares tools for AI assistants, over stdio or
//!   `POST /mcp`.
//! - [`api`]: stateless HTTP proxy functions under `/api` for the web client.

pub mod api;
pub mod config;
pub mod mcp;

use anyhow::{Context, Result};
use axum::Router;
use squadsquares_client::SquadSquaresClient;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{api_router, ProxyState};
use config::ServerConfig;
use mcp::{default_registry, McpHandler, McpServer, StdioTransport};

/// Install the global tracing subscriber.
///
/// Output goes to stderr; stdout carries the MCP stdio session.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "squadsquares_server=info,squadsquares_client=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// The shared backend client for a configuration.
pub fn build_client(config: &ServerConfig) -> Result<Arc<SquadSquaresClient>> {
    let client = SquadSquaresClient::new(config.client_config())
        .context("Failed to build backend client")?;
    Ok(Arc::new(client))
}

/// MCP handler with every tool registered against `client`.
pub fn build_handler(client: Arc<SquadSquaresClient>) -> Result<Arc<McpHandler>> {
    let registry = default_registry(client).context("Failed to register MCP tools")?;
    Ok(Arc::new(McpHandler::new(Arc::new(registry))))
}

/// Proxy functions and MCP-over-HTTP on one router.
pub fn app(config: &ServerConfig) -> Result<Router> {
    let client = build_client(config)?;
    let handler = build_handler(client.clone())?;

    Ok(Router::new()
        .merge(api_router(ProxyState::new(client)))
        .merge(McpServer::new(handler).router())
        .layer(TraceLayer::new_for_http()))
}

/// Serve the HTTP proxy and MCP-over-HTTP until the process is stopped.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    config.validate()?;
    let addr = config.socket_addr()?;

    tracing::info!("Starting Squad Squares server");
    tracing::info!(backend = %config.backend.base_url, "Relaying to backend");

    let app = app(&config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Proxy listening on http://{}/api", addr);
    tracing::info!("MCP endpoint available at http://{}/mcp", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Run one MCP session over stdin/stdout.
pub async fn run_stdio(config: ServerConfig) -> Result<()> {
    config.validate()?;

    let client = build_client(&config)?;
    let handler = build_handler(client)?;
    tracing::info!(backend = %config.backend.base_url, "Squad Squares MCP server running on stdio");

    let mut transport = StdioTransport::new();
    mcp::serve(&handler, &mut transport).await?;
    Ok(())
}
