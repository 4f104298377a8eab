//! Error types shared across the engine and the server.

use std::io;

use crate::game::{AreaId, MapGenError, PlayerId};

/// A message that could not be read from or written to the wire.
///
/// The connection that produced it is dropped.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Not valid JSON or not a known message.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A line exceeded the framing limit.
    #[error("message longer than {limit} bytes")]
    LineTooLong {
        /// Maximum accepted line length in bytes.
        limit: usize,
    },
    /// The line was not UTF-8.
    #[error("message is not valid UTF-8")]
    InvalidUtf8,
    /// A well-formed message arrived where another kind was required.
    #[error("expected {expected}, got {got}")]
    Unexpected {
        /// What the receiver was waiting for.
        expected: &'static str,
        /// What arrived instead.
        got: &'static str,
    },
    /// The peer closed the stream.
    #[error("connection closed")]
    Closed,
    /// Socket failure.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// An illegal command. Reported to the offending client only; the game
/// state is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    /// No game is running.
    #[error("game is not in progress")]
    GameNotInProgress,
    /// Someone other than the current player sent a command.
    #[error("it is not player {player}'s turn")]
    NotYourTurn {
        /// The player who sent the command.
        player: PlayerId,
    },
    /// The area does not exist.
    #[error("area {0} does not exist")]
    UnknownArea(AreaId),
    /// The attacking area belongs to someone else.
    #[error("area {0} does not belong to the current player")]
    NotYourArea(AreaId),
    /// The two areas do not share a border.
    #[error("areas {source_area} and {target} are not adjacent")]
    NotAdjacent {
        /// Attacking area.
        source_area: AreaId,
        /// Attacked area.
        target: AreaId,
    },
    /// The attacking area has fewer than two dice.
    #[error("area {0} needs at least 2 dice to attack")]
    InsufficientDice(AreaId),
    /// Both areas have the same owner.
    #[error("area {0} is already owned by the attacker")]
    SelfAttack(AreaId),
    /// The per-turn attack cap was hit.
    #[error("attack limit of {0} per turn reached")]
    AttackLimitReached(u32),
}

/// A client's socket went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("connection to player {player} lost")]
pub struct ConnectionLost {
    /// The disconnected player.
    pub player: PlayerId,
}

/// The current player did not act in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("player {player} did not act within {timeout_ms} ms")]
pub struct TurnTimeout {
    /// The player whose turn expired.
    pub player: PlayerId,
    /// The turn budget that ran out.
    pub timeout_ms: u64,
}

/// Failure to set up or drive the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Board generation failed.
    #[error(transparent)]
    MapGen(#[from] MapGenError),
    /// All player slots are taken.
    #[error("game is full ({0} players)")]
    LobbyFull(usize),
    /// Not every player has joined yet.
    #[error("waiting for {missing} more player(s)")]
    NotEnoughPlayers {
        /// Open slots.
        missing: usize,
    },
    /// The operation is only valid while the game is forming.
    #[error("game has already started")]
    AlreadyStarted,
}

/// Failure that ends a server run.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Listener or socket failure.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A registered client left before the game started.
    #[error("game forming aborted: {0}")]
    FormingAborted(ConnectionLost),
    /// The engine rejected setup.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violation_messages() {
        assert_eq!(
            RuleViolation::NotAdjacent {
                source_area: 3,
                target: 9
            }
            .to_string(),
            "areas 3 and 9 are not adjacent"
        );
        assert_eq!(
            RuleViolation::InsufficientDice(4).to_string(),
            "area 4 needs at least 2 dice to attack"
        );
    }

    #[test]
    fn test_server_error_wraps_forming_abort() {
        let err = ServerError::FormingAborted(ConnectionLost { player: 2 });
        assert_eq!(
            err.to_string(),
            "game forming aborted: connection to player 2 lost"
        );
    }
}
