//! Game invariants - sanity checks that detect bugs.
//!
//! These should NEVER trigger in a correctly implemented engine. The engine
//! runs them after every mutation in debug builds.

use crate::game::{GameState, Phase, MAX_DICE, MAX_RESERVE};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut report = |message: String| violations.push(InvariantViolation { message });

    // Topology
    if !state.board.is_symmetric() {
        report("Adjacency is not symmetric".to_string());
    }
    if !state.board.is_connected() {
        report("Board is not connected".to_string());
    }

    if state.phase == Phase::Forming {
        return violations;
    }

    // Dice and ownership bounds
    for area in state.board.areas() {
        if !(1..=MAX_DICE).contains(&area.dice) {
            report(format!(
                "Area {} has {} dice, outside 1..={MAX_DICE}",
                area.id, area.dice
            ));
        }
        if state.player(area.owner).is_none() {
            report(format!("Area {} owned by unknown player {}", area.id, area.owner));
        }
    }

    for player in &state.players {
        let owned = state.board.count_owned(player.id);

        if player.eliminated && owned > 0 {
            report(format!(
                "Eliminated player {} still owns {owned} areas",
                player.id
            ));
        }
        if state.phase == Phase::InProgress && player.is_active() && owned == 0 {
            report(format!("Active player {} owns no areas", player.id));
        }
        if player.reserve > MAX_RESERVE {
            report(format!(
                "Player {} reserve {} exceeds {MAX_RESERVE}",
                player.id, player.reserve
            ));
        }
    }

    let total_score: u64 = state.players.iter().map(|p| u64::from(p.score)).sum();
    if total_score > state.battles {
        report(format!(
            "Scores add up to {total_score} but only {} battles were fought",
            state.battles
        ));
    }

    if let Some(current) = state.current_player().filter(|&id| !state.is_active(id)) {
        report(format!("Current player {current} is not active"));
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}
