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
use clap::{Parser, Subcommand};
use squadsquares_server::{config::ServerConfig, init_tracing, run_server, run_stdio};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config file)
    #[arg(long, env = "SQUAD_SQUARES_API", global = true)]
    api: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP proxy and MCP over HTTP
    Serve {
        /// HTTP listen address (overrides config file)
        #[arg(long, env = "SQUAD_SQUARES_HTTP_ADDR")]
        http_addr: Option<String>,
    },
    /// Run the MCP server on stdin/stdout (default)
    Mcp,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ServerConfig::load(cli.config)?;
    if let Some(api) = cli.api {
        config.backend.base_url = api;
    }

    match cli.command.unwrap_or(Command::Mcp) {
        Command::Serve { http_addr } => {
            if let Some(addr) = http_addr {
                config.server.listen_addr = addr;
            }
            run_server(config).await
        }
        Command::Mcp => run_stdio(config).await,
    }
}
