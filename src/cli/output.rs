//! Output formatting utilities for CLI.

use dicewars::game::{win_probability, AreaId, Board, BoardShape, Hex, MAX_DICE};
use serde::Serialize;
use std::fmt::Write as _;

/// JSON-serializable board.
#[derive(Debug, Serialize)]
pub(super) struct JsonBoard {
    /// Board seed.
    pub(super) seed: u64,
    /// Generator settings.
    pub(super) shape: BoardShape,
    /// Every area in id order.
    pub(super) areas: Vec<JsonArea>,
}

/// JSON-serializable area topology.
#[derive(Debug, Serialize)]
pub(super) struct JsonArea {
    /// Area id.
    pub(super) id: AreaId,
    /// Adjacent area ids.
    pub(super) neighbours: Vec<AreaId>,
    /// Grid cells.
    pub(super) hexes: Vec<Hex>,
}

impl JsonBoard {
    /// Create from a generated board.
    pub(super) fn from_board(seed: u64, shape: BoardShape, board: &Board) -> Self {
        Self {
            seed,
            shape,
            areas: board
                .areas()
                .map(|a| JsonArea {
                    id: a.id,
                    neighbours: a.neighbors.iter().copied().collect(),
                    hexes: a.hexes.clone(),
                })
                .collect(),
        }
    }
}

/// One attacker/defender pairing of the odds table.
#[derive(Debug, Serialize)]
pub(super) struct JsonOdds {
    /// Attacking dice.
    pub(super) attacker: u8,
    /// Defending dice.
    pub(super) defender: u8,
    /// Chance the attacker wins.
    pub(super) probability: f64,
}

/// Every pairing from 2 attacking and 1 defending die up to `MAX_DICE`.
pub(super) fn odds_table() -> Vec<JsonOdds> {
    (2..=MAX_DICE)
        .flat_map(|attacker| {
            (1..=MAX_DICE).map(move |defender| JsonOdds {
                attacker,
                defender,
                probability: win_probability(attacker, defender),
            })
        })
        .collect()
}

/// Format the odds table as a grid, attackers down and defenders across.
pub(super) fn format_odds_text() -> String {
    let mut output = String::from("atk\\def");
    for defender in 1..=MAX_DICE {
        let _ = write!(output, "{defender:>7}");
    }
    output.push('\n');

    for attacker in 2..=MAX_DICE {
        let _ = write!(output, "{attacker:>7}");
        for defender in 1..=MAX_DICE {
            let _ = write!(output, "{:>7.3}", win_probability(attacker, defender));
        }
        output.push('\n');
    }
    output
}
