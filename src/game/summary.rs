//! End-of-game record.
//!
//! The textual form is two lines:
//!
//! ```text
//! Winner: 3
//! Battles total: 57
//! ```
//!
//! `Winner: none` marks a match that ended without a winner.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::game::PlayerId;

/// Winner and battle count of a finished game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    /// Winning player, if any.
    pub winner: Option<PlayerId>,
    /// Battles resolved during the game.
    pub battles: u64,
}

/// Error parsing a summary.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    /// A required line is missing.
    #[error("missing line: {0}")]
    MissingLine(&'static str),
    /// A line does not have the expected prefix or value.
    #[error("invalid line: {0:?}")]
    InvalidLine(String),
    /// The file could not be read.
    #[error("failed to read summary: {0}")]
    Io(#[from] std::io::Error),
}

impl GameSummary {
    /// Write the textual form to a file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_string())
    }

    /// Read a summary from a file.
    pub fn load(path: &Path) -> Result<Self, SummaryError> {
        std::fs::read_to_string(path)?.parse()
    }
}

impl fmt::Display for GameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(winner) => writeln!(f, "Winner: {winner}")?,
            None => writeln!(f, "Winner: none")?,
        }
        writeln!(f, "Battles total: {}", self.battles)
    }
}

impl FromStr for GameSummary {
    type Err = SummaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();

        let winner_line = lines.next().ok_or(SummaryError::MissingLine("Winner"))?;
        let winner = match winner_line.strip_prefix("Winner:").map(str::trim) {
            Some("none") => None,
            Some(value) => Some(
                value
                    .parse()
                    .map_err(|_| SummaryError::InvalidLine(winner_line.to_string()))?,
            ),
            None => return Err(SummaryError::InvalidLine(winner_line.to_string())),
        };

        let battles_line = lines
            .next()
            .ok_or(SummaryError::MissingLine("Battles total"))?;
        let battles = battles_line
            .strip_prefix("Battles total:")
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| SummaryError::InvalidLine(battles_line.to_string()))?;

        Ok(Self { winner, battles })
    }
}
