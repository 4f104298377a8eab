//! Read-only board queries for agents.

use crate::game::{win_probability, AreaId, Board, PlayerId};

/// Every legal `(source, target)` attack available to a player.
///
/// Sorted by source then target id.
#[must_use]
pub fn possible_attacks(board: &Board, player: PlayerId) -> Vec<(AreaId, AreaId)> {
    let mut attacks = Vec::new();
    for area in board.owned_by(player).filter(|a| a.can_attack()) {
        for &target in &area.neighbors {
            if board.get(target).is_some_and(|t| t.owner != player) {
                attacks.push((area.id, target));
            }
        }
    }
    attacks
}

/// Whether a player has at least one legal attack.
#[must_use]
pub fn has_legal_attack(board: &Board, player: PlayerId) -> bool {
    board.owned_by(player).any(|area| {
        area.can_attack()
            && area
                .neighbors
                .iter()
                .any(|&n| board.get(n).is_some_and(|t| t.owner != player))
    })
}

/// Chance that `area`, holding `dice` dice, survives one attack from every
/// hostile neighbor able to attack.
#[must_use]
pub fn probability_of_holding_area(
    board: &Board,
    area: AreaId,
    dice: u8,
    player: PlayerId,
) -> f64 {
    let Some(area) = board.get(area) else {
        return 0.0;
    };

    area.neighbors
        .iter()
        .filter_map(|&n| board.get(n))
        .filter(|n| n.owner != player && n.can_attack())
        .map(|n| 1.0 - win_probability(n.dice, dice))
        .product()
}

/// Total dice a player has on the board.
#[must_use]
pub fn player_dice(board: &Board, player: PlayerId) -> u32 {
    board.owned_by(player).map(|a| u32::from(a.dice)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Area;

    /// Star: area 1 (player 1) bordered by 2, 3 (player 2) and 4 (player 1).
    fn star() -> Board {
        let layout = [(1, 1, 3), (2, 2, 4), (3, 2, 1), (4, 1, 2)];
        let mut board = Board::from_areas(layout.iter().map(|&(id, owner, dice)| {
            let mut area = Area::new(id, vec![]);
            area.owner = owner;
            area.dice = dice;
            area
        }));
        for other in 2..=4 {
            board.connect(1, other);
        }
        board
    }

    #[test]
    fn test_possible_attacks() {
        let board = star();
        assert_eq!(possible_attacks(&board, 1), vec![(1, 2), (1, 3)]);
        // Area 2 borders only area 1
        assert_eq!(possible_attacks(&board, 2), vec![(2, 1)]);
        assert!(has_legal_attack(&board, 1));
    }

    #[test]
    fn test_no_attack_with_single_dice() {
        let mut board = star();
        for area in board.areas_mut() {
            area.dice = 1;
        }
        assert!(possible_attacks(&board, 1).is_empty());
        assert!(!has_legal_attack(&board, 2));
    }

    #[test]
    fn test_probability_of_holding() {
        let board = star();
        // Only area 2 can attack area 1; area 3 has a single die
        let expected = 1.0 - win_probability(4, 3);
        let got = probability_of_holding_area(&board, 1, 3, 1);
        assert!((got - expected).abs() < 1e-12);

        // Area 4 is only bordered by a friendly area
        assert!((probability_of_holding_area(&board, 4, 2, 1) - 1.0).abs() < 1e-12);
        assert!(probability_of_holding_area(&board, 99, 2, 1).abs() < 1e-12);
    }

    #[test]
    fn test_player_dice() {
        let board = star();
        assert_eq!(player_dice(&board, 1), 5);
        assert_eq!(player_dice(&board, 2), 5);
        assert_eq!(player_dice(&board, 3), 0);
    }
}
