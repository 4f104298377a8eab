//! Starting ownership and dice.
//!
//! Both steps draw from their own [`Rng`] so that the territory split and the
//! dice strength can be varied independently.

use tracing::debug;

use crate::game::{AreaId, Board, PlayerId, MAX_DICE};
use crate::rng::Rng;

/// Hand every area to a player.
///
/// Repeatedly picks an unassigned area at random and gives it to the next
/// player in `order`, so area counts differ by at most one.
pub fn assign_ownership(board: &mut Board, order: &[PlayerId], rng: &mut Rng) {
    if order.is_empty() {
        return;
    }

    let mut unassigned = board.ids();
    let mut turn = 0;
    while !unassigned.is_empty() {
        let id = unassigned.swap_remove(rng.below(unassigned.len()));
        if let Some(area) = board.get_mut(id) {
            area.owner = order[turn % order.len()];
        }
        turn += 1;
    }
}

/// Distribute starting dice.
///
/// The total budget is `3 * areas - r` with `r` drawn from `0..=5`. Players
/// take their share of the remaining budget in `order`. Every owned area gets
/// one die from the share, the rest lands one die at a time on random areas
/// below [`MAX_DICE`]. Dice that fit nowhere are discarded.
pub fn assign_dice(board: &mut Board, order: &[PlayerId], rng: &mut Rng) {
    let budget = (3 * board.len()).saturating_sub(rng.below(6));
    let mut remaining = budget;

    for (i, &player) in order.iter().enumerate() {
        let players_left = order.len() - i;
        let share = rounded_share(remaining, players_left);
        remaining -= share;

        let owned: Vec<AreaId> = board.owned_by(player).map(|a| a.id).collect();
        for &id in &owned {
            if let Some(area) = board.get_mut(id) {
                area.dice = 1;
            }
        }

        let mut left = share.saturating_sub(owned.len());
        let mut open = owned;
        while left > 0 && !open.is_empty() {
            let slot = rng.below(open.len());
            let Some(area) = board.get_mut(open[slot]) else {
                open.swap_remove(slot);
                continue;
            };
            area.dice += 1;
            left -= 1;
            if !area.can_reinforce() {
                open.swap_remove(slot);
            }
        }

        debug!(player, share, discarded = left, "starting dice assigned");
    }

    debug_assert!(board.areas().all(|a| a.owner == 0 || (1..=MAX_DICE).contains(&a.dice)));
}

/// `remaining / players_left`, rounded half up.
const fn rounded_share(remaining: usize, players_left: usize) -> usize {
    (2 * remaining + players_left) / (2 * players_left)
}
