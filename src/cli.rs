//! CLI command implementations for Dice Wars.

pub(crate) mod board;
pub(crate) mod odds;
pub(crate) mod serve;
pub(crate) mod summary;

mod output;

use clap::{Args, ValueEnum};
use dicewars::game::{BoardShape, MapGenError, SummaryError};
use dicewars::{EngineError, Seeds, ServerError};
use std::error::Error;
use std::fmt;

/// Output format for the `odds` and `summary` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Seed options shared by commands that build a game.
#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct SeedArgs {
    /// Derive all four seeds from this value
    #[arg(short, long)]
    seed: Option<u64>,

    /// Board topology seed
    #[arg(long)]
    board_seed: Option<u64>,

    /// Area ownership seed
    #[arg(long)]
    ownership_seed: Option<u64>,

    /// Starting dice seed
    #[arg(long)]
    strength_seed: Option<u64>,

    /// Turn order, battle and reinforcement seed
    #[arg(long)]
    fixed_seed: Option<u64>,
}

impl SeedArgs {
    /// Explicit seeds win over `--seed`; anything still missing comes from the clock.
    pub(crate) fn resolve(&self) -> Seeds {
        let base = self.seed.map(Seeds::from_seed);
        Seeds::resolve(
            self.board_seed.or(base.map(|s| s.board)),
            self.ownership_seed.or(base.map(|s| s.ownership)),
            self.strength_seed.or(base.map(|s| s.strength)),
            self.fixed_seed.or(base.map(|s| s.fixed)),
        )
    }
}

/// Board generator options.
#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct ShapeArgs {
    /// Grid width in cells
    #[arg(long, default_value = "28")]
    width: u16,

    /// Grid height in cells
    #[arg(long, default_value = "24")]
    height: u16,

    /// Number of areas
    #[arg(long, default_value = "30")]
    areas: u16,

    /// Smallest area, in cells
    #[arg(long, default_value = "8")]
    min_area_size: usize,

    /// Largest area, in cells
    #[arg(long, default_value = "40")]
    max_area_size: usize,
}

impl ShapeArgs {
    pub(crate) const fn shape(&self) -> BoardShape {
        BoardShape {
            width: self.width,
            height: self.height,
            areas: self.areas,
            min_area_size: self.min_area_size,
            max_area_size: self.max_area_size,
        }
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("Failed to encode JSON: {e}"))
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ServerError> for CliError {
    fn from(e: ServerError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<MapGenError> for CliError {
    fn from(e: MapGenError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SummaryError> for CliError {
    fn from(e: SummaryError) -> Self {
        Self::new(e.to_string())
    }
}
