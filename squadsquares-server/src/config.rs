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

use anyhow::Result;
use serde::{Deserialize, Serialize};
use squadsquares_client::ClientConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_BACKEND_URL: &str = "SQUAD_SQUARES_API";
pub const ENV_BACKEND_TIMEOUT: &str = "SQUAD_SQUARES_TIMEOUT_SECS";
pub const ENV_HTTP_ADDR: &str = "SQUAD_SQUARES_HTTP_ADDR";

/// Squad Squares adapter configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: HttpServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the Squad Squares backend (e.g., "http://localhost:8000")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP listen address for the proxy and MCP-over-HTTP endpoints
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_http_addr() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - SQUAD_SQUARES_API: backend base URL (default: http://localhost:8000)
    /// - SQUAD_SQUARES_TIMEOUT_SECS: backend request timeout (default: 30)
    /// - SQUAD_SQUARES_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:3000)
    pub fn from_env() -> Self {
        Self::merge_with_env(Self::default())
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        Ok(Self::merge_with_env(config))
    }

    /// Override fields whose environment variable is set
    fn merge_with_env(mut config: Self) -> Self {
        if let Ok(url) = std::env::var(ENV_BACKEND_URL) {
            config.backend.base_url = url;
        }

        if let Ok(timeout) = std::env::var(ENV_BACKEND_TIMEOUT) {
            match timeout.parse() {
                Ok(secs) => config.backend.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", ENV_BACKEND_TIMEOUT, timeout),
            }
        }

        if let Ok(addr) = std::env::var(ENV_HTTP_ADDR) {
            config.server.listen_addr = addr;
        }

        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        let url = url::Url::parse(&self.backend.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid backend URL {:?}: {}", self.backend.base_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Backend URL must be http or https, got {:?}",
                self.backend.base_url
            );
        }

        if self.backend.timeout_secs == 0 {
            anyhow::bail!("Backend timeout must be at least one second");
        }

        Ok(())
    }

    /// Backend client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.backend.base_url.clone())
            .with_timeout(Duration::from_secs(self.backend.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_fills_missing_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nbase_url = \"https://squares.example.com\"\ntimeout_secs = 5"
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.backend.base_url, "https://squares.example.com");
        assert_eq!(config.client_config().timeout, Duration::from_secs(5));
        assert_eq!(config.server.listen_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.server.listen_addr, default_http_addr());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ServerConfig::default();
        config.backend.base_url = "ftp://squares".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.server.listen_addr = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
