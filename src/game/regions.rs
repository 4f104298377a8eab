//! Connected regions of same-owner areas.

use std::collections::{BTreeSet, VecDeque};

use crate::game::{AreaId, Board, PlayerId};

/// Compute the regions of a player.
///
/// A region is a maximal set of the player's areas reachable from each other
/// through adjacent areas of the same player. When `exclude` is given, that
/// area is treated as not belonging to the player.
///
/// Regions are disjoint and their union is exactly the player's areas (minus
/// `exclude`). They are returned in order of their smallest area id.
#[must_use]
pub fn regions_of(
    board: &Board,
    player: PlayerId,
    exclude: Option<AreaId>,
) -> Vec<BTreeSet<AreaId>> {
    let is_member = |id: AreaId| {
        Some(id) != exclude && board.get(id).is_some_and(|a| a.owner == player)
    };

    let mut visited = BTreeSet::new();
    let mut regions = Vec::new();

    for start in board.owned_by(player).map(|a| a.id) {
        if !is_member(start) || visited.contains(&start) {
            continue;
        }

        let mut region = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        visited.insert(start);

        while let Some(id) = queue.pop_front() {
            let Some(area) = board.get(id) else { continue };
            for &next in &area.neighbors {
                if is_member(next) && visited.insert(next) {
                    region.insert(next);
                    queue.push_back(next);
                }
            }
        }

        regions.push(region);
    }

    regions
}

/// Size of the player's largest region (0 if they own nothing).
#[must_use]
pub fn largest_region_size(board: &Board, player: PlayerId) -> usize {
    regions_of(board, player, None)
        .iter()
        .map(BTreeSet::len)
        .max()
        .unwrap_or(0)
}

/// The region holding `area`, if the area belongs to `player`.
#[must_use]
pub fn region_containing(board: &Board, player: PlayerId, area: AreaId) -> Option<BTreeSet<AreaId>> {
    regions_of(board, player, None)
        .into_iter()
        .find(|region| region.contains(&area))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Area;

    /// Line 1-2-3-4-5 owned by players 1,1,2,1,1.
    fn split_line() -> Board {
        let owners = [1, 1, 2, 1, 1];
        let mut board = Board::from_areas((1..=5).map(|id| {
            let mut area = Area::new(id, vec![]);
            area.owner = owners[usize::from(id - 1)];
            area.dice = 1;
            area
        }));
        for id in 1..5 {
            board.connect(id, id + 1);
        }
        board
    }

    #[test]
    fn test_regions_split_by_enemy() {
        let board = split_line();
        let regions = regions_of(&board, 1, None);
        assert_eq!(
            regions,
            vec![BTreeSet::from([1, 2]), BTreeSet::from([4, 5])]
        );
        assert_eq!(regions_of(&board, 2, None), vec![BTreeSet::from([3])]);
    }

    #[test]
    fn test_exclude_splits_region() {
        let board = split_line();
        let regions = regions_of(&board, 1, Some(2));
        assert_eq!(
            regions,
            vec![BTreeSet::from([1]), BTreeSet::from([4, 5])]
        );
    }

    #[test]
    fn test_largest_region() {
        let mut board = split_line();
        assert_eq!(largest_region_size(&board, 1), 2);
        assert_eq!(largest_region_size(&board, 3), 0);

        if let Some(area) = board.get_mut(3) {
            area.owner = 1;
        }
        assert_eq!(largest_region_size(&board, 1), 5);
    }

    #[test]
    fn test_region_containing() {
        let board = split_line();
        assert_eq!(
            region_containing(&board, 1, 5),
            Some(BTreeSet::from([4, 5]))
        );
        assert_eq!(region_containing(&board, 1, 3), None);
    }
}
