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

//! # Squad Squares backend client
//!
//! Typed access to the Squad Squares game backend: rooms, grid status,
//! square claims, availability, room chat and the ESPN live-games relay.
//!
//! ## Quick Start
//!
//! ```no_run
//! use squadsquares_client::{ClientConfig, SquadSquaresClient, Sport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SquadSquaresClient::new(ClientConfig::new("http://localhost:8000"))?;
//!
//!     for room in client.list_rooms().await? {
//!         println!("room {:?}", room.id);
//!     }
//!
//!     let games = client.list_live_games(Sport::Nfl).await?;
//!     println!("{} NFL games", games.len());
//!     Ok(())
//! }
//! ```

mod client;
mod types;

pub use client::{BackendError, ClientConfig, ForwardedResponse, Result, SquadSquaresClient};
pub use types::*;

/// HTTP method type accepted by [`SquadSquaresClient::forward`].
pub use reqwest::Method;
