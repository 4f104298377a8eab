//! Game layer for Dice Wars.
//!
//! Pure rules on top of a [`Board`]:
//! - Board generation on a hex grid
//! - Starting ownership and dice
//! - Region analysis
//! - Battle resolution and exact win odds
//! - Game state, invariants and the end-of-game summary
//!
//! Everything here is deterministic given an explicit [`Rng`](crate::rng::Rng).
//! The turn state machine that drives these pieces lives in
//! [`engine`](crate::engine).

mod allocation;
mod analysis;
mod board;
mod combat;
mod hex;
pub mod invariants;
mod mapgen;
mod player;
mod regions;
mod state;
mod summary;

pub use allocation::{assign_dice, assign_ownership};
pub use analysis::{has_legal_attack, player_dice, possible_attacks, probability_of_holding_area};
pub use board::{Area, AreaId, Board, MAX_DICE};
pub use combat::{
    dice_sum_distribution, resolve_battle, validate_attack, win_probability, AreaSnapshot,
    BattleOutcome,
};
pub use hex::Hex;
pub use mapgen::{generate_board, BoardShape, MapGenError, MAX_GENERATION_ATTEMPTS};
pub use player::{EliminationReason, Player, PlayerId};
pub use regions::{largest_region_size, region_containing, regions_of};
pub use state::{GameState, Phase, TurnOrder, MAX_PLAYERS, MAX_RESERVE};
pub use summary::{GameSummary, SummaryError};
