//! Player state management.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player (1-based, 0 means "nobody").
pub type PlayerId = u8;

/// Reason a player left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationReason {
    /// Lost their last area.
    Conquered,
    /// Disconnected or ran out of timeouts.
    Forfeited,
}

/// State for a single player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Unique identifier for this player.
    pub id: PlayerId,
    /// Name sent in the handshake.
    pub nickname: String,
    /// Set once the player holds no areas.
    pub eliminated: bool,
    /// Set once the player disconnected or timed out too often.
    pub forfeited: bool,
    /// Battles won.
    pub score: u32,
    /// Dice carried over from earlier reinforcements.
    pub reserve: u32,
    /// Turns in a row that ended by timeout.
    pub consecutive_timeouts: u32,
}

impl Player {
    /// Create a new active player.
    #[must_use]
    pub fn new(id: PlayerId, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            eliminated: false,
            forfeited: false,
            score: 0,
            reserve: 0,
            consecutive_timeouts: 0,
        }
    }

    /// Whether the player still takes turns.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.eliminated && !self.forfeited
    }

    /// Remove the player from play.
    pub fn eliminate(&mut self, reason: EliminationReason) {
        match reason {
            EliminationReason::Conquered => self.eliminated = true,
            EliminationReason::Forfeited => self.forfeited = true,
        }
    }
}
