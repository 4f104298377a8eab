//! Game and server configuration.
//!
//! All randomness is driven by [`Seeds`], so a game is reproducible from its
//! configuration. Missing seeds are drawn from the clock once, at startup, and
//! logged.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tracing::info;

use crate::error::EngineError;
use crate::game::{BoardShape, MAX_PLAYERS};

/// The four independent random seeds of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seeds {
    /// Board topology.
    pub board: u64,
    /// Area ownership.
    pub ownership: u64,
    /// Starting dice strength.
    pub strength: u64,
    /// Turn order, dice rolls and reinforcement.
    pub fixed: u64,
}

impl Seeds {
    /// Derive all four seeds from a single value.
    #[must_use]
    pub const fn from_seed(seed: u64) -> Self {
        Self {
            board: seed,
            ownership: seed.wrapping_add(1),
            strength: seed.wrapping_add(2),
            fixed: seed.wrapping_add(3),
        }
    }

    /// Fill in missing seeds from the clock and log the result.
    #[must_use]
    pub fn resolve(
        board: Option<u64>,
        ownership: Option<u64>,
        strength: Option<u64>,
        fixed: Option<u64>,
    ) -> Self {
        let clock = clock_seed();
        let pick = |given: Option<u64>, slot: u64| {
            given.unwrap_or_else(|| {
                clock ^ 0x9E37_79B9_7F4A_7C15u64.wrapping_mul(slot)
            })
        };

        let seeds = Self {
            board: pick(board, 1),
            ownership: pick(ownership, 2),
            strength: pick(strength, 3),
            fixed: pick(fixed, 4),
        };
        info!(
            board = seeds.board,
            ownership = seeds.ownership,
            strength = seeds.strength,
            fixed = seeds.fixed,
            "using seeds"
        );
        seeds
    }
}

/// Current time as a seed.
#[allow(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0x2545_F491_4F6C_DD1D, |d| d.as_nanos() as u64)
}

/// Rules and randomness of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// Number of players, `2..=MAX_PLAYERS`.
    pub players: usize,
    /// Board generator settings.
    pub shape: BoardShape,
    /// Random seeds.
    pub seeds: Seeds,
    /// Time a player has to send each command.
    pub turn_timeout: Duration,
    /// Timeouts in a row that make a player forfeit.
    pub max_consecutive_timeouts: u32,
    /// Optional cap on attacks per turn.
    pub max_attacks_per_turn: Option<u32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 2,
            shape: BoardShape::default(),
            seeds: Seeds::from_seed(1),
            turn_timeout: Duration::from_secs(10),
            max_consecutive_timeouts: 3,
            max_attacks_per_turn: None,
        }
    }
}

impl GameConfig {
    /// Check the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(2..=MAX_PLAYERS).contains(&self.players) {
            return Err(EngineError::InvalidConfig(format!(
                "player count must be 2..={MAX_PLAYERS}, got {}",
                self.players
            )));
        }
        if usize::from(self.shape.areas) < self.players {
            return Err(EngineError::InvalidConfig(format!(
                "{} areas cannot be shared by {} players",
                self.shape.areas, self.players
            )));
        }
        if self.max_consecutive_timeouts == 0 {
            return Err(EngineError::InvalidConfig(
                "max consecutive timeouts must be at least 1".to_string(),
            ));
        }
        if self.max_attacks_per_turn == Some(0) {
            return Err(EngineError::InvalidConfig(
                "attack limit must be at least 1".to_string(),
            ));
        }
        self.shape.validate()?;
        Ok(())
    }
}

/// Network settings of the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen: SocketAddr,
    /// Time a client has to send its handshake.
    pub handshake_timeout: Duration,
    /// Per-socket write timeout.
    pub write_timeout: Duration,
    /// Where to write the summary, if anywhere.
    pub report: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5005)),
            handshake_timeout: Duration::from_secs(5),
            write_timeout: Duration::from_secs(5),
            report: None,
        }
    }
}
