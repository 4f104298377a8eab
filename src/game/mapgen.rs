//! Deterministic board generation.
//!
//! Areas are grown on a bounded hex grid from pseudo-randomly placed seed
//! cells. Each step picks an area that still has unclaimed cells on its
//! border and claims one of them, until the whole grid is partitioned.
//! Adjacency is derived from shared cell borders.
//!
//! Boards that come out degenerate (disconnected, an isolated area, an area
//! outside the size bounds) are thrown away and regrown from the same random
//! stream, so the result depends on the seed alone.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::game::{Area, AreaId, Board, Hex};
use crate::rng::Rng;

/// Number of growth attempts before giving up on a seed.
pub const MAX_GENERATION_ATTEMPTS: u32 = 64;

/// Grid dimensions and area bounds for the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardShape {
    /// Grid width in cells.
    pub width: u16,
    /// Grid height in cells.
    pub height: u16,
    /// Number of areas to carve out of the grid.
    pub areas: u16,
    /// Smallest acceptable area, in cells.
    pub min_area_size: usize,
    /// Largest acceptable area, in cells.
    pub max_area_size: usize,
}

impl Default for BoardShape {
    fn default() -> Self {
        Self {
            width: 28,
            height: 24,
            areas: 30,
            min_area_size: 8,
            max_area_size: 40,
        }
    }
}

impl BoardShape {
    /// Total number of grid cells.
    #[must_use]
    pub fn cells(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Check that a board with this shape can exist at all.
    pub fn validate(&self) -> Result<(), MapGenError> {
        let invalid = |reason: String| Err(MapGenError::InvalidShape(reason));

        if self.width < 2 || self.height < 2 {
            return invalid(format!(
                "grid must be at least 2x2, got {}x{}",
                self.width, self.height
            ));
        }
        if self.areas < 2 {
            return invalid(format!("need at least 2 areas, got {}", self.areas));
        }
        if self.min_area_size == 0 || self.min_area_size > self.max_area_size {
            return invalid(format!(
                "area size bounds {}..={} are empty",
                self.min_area_size, self.max_area_size
            ));
        }
        let areas = usize::from(self.areas);
        if self.cells() < areas * self.min_area_size {
            return invalid(format!(
                "{} cells cannot hold {} areas of at least {} cells",
                self.cells(),
                areas,
                self.min_area_size
            ));
        }
        if self.cells() > areas * self.max_area_size {
            return invalid(format!(
                "{} cells cannot be split into {} areas of at most {} cells",
                self.cells(),
                areas,
                self.max_area_size
            ));
        }
        Ok(())
    }
}

/// Error type for board generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapGenError {
    /// The requested shape cannot produce a valid board.
    #[error("invalid board shape: {0}")]
    InvalidShape(String),
    /// Every attempt produced a degenerate board.
    #[error("no valid board after {0} attempts")]
    Exhausted(u32),
}

/// Generate a board from a seed.
///
/// # Errors
///
/// Returns an error if the shape is invalid or no valid board was produced
/// within [`MAX_GENERATION_ATTEMPTS`].
#[instrument(skip(shape), fields(areas = shape.areas))]
pub fn generate_board(seed: u64, shape: &BoardShape) -> Result<Board, MapGenError> {
    shape.validate()?;
    let mut rng = Rng::new(seed);

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let cells = grow_areas(shape, &mut rng);
        let board = build_board(shape, &cells);
        match check_board(&board, shape) {
            Ok(()) => {
                debug!(attempt, "board generated");
                return Ok(board);
            }
            Err(reason) => debug!(attempt, reason, "rejected degenerate board"),
        }
    }

    Err(MapGenError::Exhausted(MAX_GENERATION_ATTEMPTS))
}

/// Partition the grid; returns the owning area of every cell (row-major).
fn grow_areas(shape: &BoardShape, rng: &mut Rng) -> Vec<Option<AreaId>> {
    let total = shape.cells();
    let mut cells: Vec<Option<AreaId>> = vec![None; total];
    let mut sizes = vec![0usize; usize::from(shape.areas)];
    let mut frontiers: Vec<Vec<usize>> = vec![Vec::new(); usize::from(shape.areas)];

    // Seed cells
    let mut placed: u16 = 0;
    while placed < shape.areas {
        let idx = rng.below(total);
        if cells[idx].is_some() {
            continue;
        }
        placed += 1;
        let slot = usize::from(placed - 1);
        cells[idx] = Some(placed);
        sizes[slot] = 1;
        push_neighbors(shape, idx, &cells, &mut frontiers[slot]);
    }

    let mut unclaimed = total - usize::from(shape.areas);
    while unclaimed > 0 {
        for frontier in &mut frontiers {
            frontier.retain(|&c| cells[c].is_none());
        }

        let growing: Vec<usize> = (0..frontiers.len())
            .filter(|&i| !frontiers[i].is_empty())
            .collect();
        let under_cap: Vec<usize> = growing
            .iter()
            .copied()
            .filter(|&i| sizes[i] < shape.max_area_size)
            .collect();
        let pool = if under_cap.is_empty() { &growing } else { &under_cap };

        let Some(&slot) = rng.choose(pool) else {
            // Grid is connected, so this only happens once every cell is claimed
            break;
        };

        let frontier = &mut frontiers[slot];
        let cell = frontier.swap_remove(rng.below(frontier.len()));
        #[allow(clippy::cast_possible_truncation)]
        let id = (slot + 1) as AreaId;
        cells[cell] = Some(id);
        sizes[slot] += 1;
        unclaimed -= 1;
        push_neighbors(shape, cell, &cells, &mut frontiers[slot]);
    }

    cells
}

/// Queue the unclaimed neighbors of a cell.
fn push_neighbors(
    shape: &BoardShape,
    idx: usize,
    cells: &[Option<AreaId>],
    frontier: &mut Vec<usize>,
) {
    let hex = Hex::from_index(idx, shape.width);
    let (adjacent, count) = hex.neighbors(shape.width, shape.height);
    for adj in &adjacent[..usize::from(count)] {
        let n = adj.index(shape.width);
        if cells[n].is_none() {
            frontier.push(n);
        }
    }
}

/// Turn a cell partition into areas with adjacency.
fn build_board(shape: &BoardShape, cells: &[Option<AreaId>]) -> Board {
    let mut hexes: Vec<Vec<Hex>> = vec![Vec::new(); usize::from(shape.areas)];
    for (idx, owner) in cells.iter().enumerate() {
        if let Some(id) = owner {
            hexes[usize::from(*id - 1)].push(Hex::from_index(idx, shape.width));
        }
    }

    let mut board = Board::from_areas(
        hexes
            .into_iter()
            .zip(1..=shape.areas)
            .map(|(cells, id)| Area::new(id, cells)),
    );

    for (idx, owner) in cells.iter().enumerate() {
        let Some(id) = *owner else { continue };
        let hex = Hex::from_index(idx, shape.width);
        let (adjacent, count) = hex.neighbors(shape.width, shape.height);
        for adj in &adjacent[..usize::from(count)] {
            if let Some(other) = cells[adj.index(shape.width)].filter(|&other| other != id) {
                board.connect(id, other);
            }
        }
    }

    board
}

/// Reject degenerate boards.
fn check_board(board: &Board, shape: &BoardShape) -> Result<(), &'static str> {
    if board.len() != usize::from(shape.areas) {
        return Err("wrong area count");
    }
    if board.areas().any(|a| a.neighbors.is_empty()) {
        return Err("isolated area");
    }
    if board
        .areas()
        .any(|a| a.hexes.len() < shape.min_area_size || a.hexes.len() > shape.max_area_size)
    {
        return Err("area size out of bounds");
    }
    if !board.is_connected() {
        return Err("disconnected board");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_determinism() {
        let shape = BoardShape::default();
        let a = generate_board(42, &shape).unwrap();
        let b = generate_board(42, &shape).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let shape = BoardShape::default();
        let a = generate_board(1, &shape).unwrap();
        let b = generate_board(2, &shape).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_board_is_valid() {
        let shape = BoardShape::default();
        let board = generate_board(7, &shape).unwrap();

        assert_eq!(board.len(), usize::from(shape.areas));
        assert_eq!(board.ids(), (1..=shape.areas).collect::<Vec<_>>());
        assert!(board.is_connected());
        assert!(board.is_symmetric());
        for area in board.areas() {
            assert!(!area.neighbors.is_empty(), "area {} is isolated", area.id);
            assert!(area.hexes.len() >= shape.min_area_size);
            assert!(area.hexes.len() <= shape.max_area_size);
        }
    }

    #[test]
    fn test_every_cell_claimed_once() {
        let shape = BoardShape::default();
        let board = generate_board(3, &shape).unwrap();

        let mut all: Vec<Hex> = board.areas().flat_map(|a| a.hexes.iter().copied()).collect();
        assert_eq!(all.len(), shape.cells());
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), shape.cells());
    }

    #[test]
    fn test_invalid_shapes() {
        let too_small = BoardShape {
            width: 4,
            height: 4,
            areas: 10,
            min_area_size: 2,
            max_area_size: 4,
        };
        assert!(matches!(
            generate_board(1, &too_small),
            Err(MapGenError::InvalidShape(_))
        ));

        let one_area = BoardShape {
            areas: 1,
            ..BoardShape::default()
        };
        assert!(one_area.validate().is_err());

        let empty_bounds = BoardShape {
            min_area_size: 10,
            max_area_size: 5,
            ..BoardShape::default()
        };
        assert!(empty_bounds.validate().is_err());
    }

    #[test]
    fn test_small_board_for_three_players() {
        let shape = BoardShape {
            width: 16,
            height: 12,
            areas: 12,
            min_area_size: 4,
            max_area_size: 40,
        };
        let board = generate_board(2024, &shape).unwrap();
        assert_eq!(board.len(), 12);
        assert!(board.is_connected());
    }
}
