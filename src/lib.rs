// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Dice Wars: an authoritative server for a networked territorial dice game.
//!
//! The server generates a hex board split into areas, deals them and their
//! dice to the connected players, and then runs turns: the current player
//! attacks neighbouring areas with dice rolls and ends the turn to collect
//! reinforcements sized by its largest connected region. The last player
//! standing wins.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  server: accept, reader threads,    │
//! │  session loop, outbox               │
//! ├─────────────────────────────────────┤
//! │  protocol: line-delimited JSON      │
//! ├─────────────────────────────────────┤
//! │  engine: commands in, events out    │
//! ├─────────────────────────────────────┤
//! │  game: board, regions, battles      │
//! └─────────────────────────────────────┘
//! ```
//!
//! Everything below `server` is synchronous and deterministic for a given
//! [`Seeds`](config::Seeds).

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod logging;
pub mod protocol;
pub mod rng;
pub mod server;

pub use config::{GameConfig, Seeds, ServerConfig};
pub use engine::{Command, Engine, Event};
pub use error::{EngineError, ProtocolError, RuleViolation, ServerError};

// Re-export key game types at crate root for convenience
pub use game::{Area, AreaId, Board, GameState, GameSummary, Phase, Player, PlayerId};
