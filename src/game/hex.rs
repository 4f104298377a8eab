//! Hex grid cells.

use serde::{Deserialize, Serialize};

/// A cell on the hex grid, in odd-r offset coordinates.
///
/// Odd rows are shifted half a cell to the right. Serialized as `[col, row]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u16; 2]", into = "[u16; 2]")]
pub struct Hex {
    /// Column.
    pub col: u16,
    /// Row.
    pub row: u16,
}

impl From<[u16; 2]> for Hex {
    fn from([col, row]: [u16; 2]) -> Self {
        Self { col, row }
    }
}

impl From<Hex> for [u16; 2] {
    fn from(hex: Hex) -> Self {
        [hex.col, hex.row]
    }
}

/// Neighbor offsets `(dcol, drow)` for even rows.
const EVEN_ROW_OFFSETS: [(i32, i32); 6] = [(1, 0), (-1, 0), (0, -1), (-1, -1), (0, 1), (-1, 1)];

/// Neighbor offsets `(dcol, drow)` for odd rows.
const ODD_ROW_OFFSETS: [(i32, i32); 6] = [(1, 0), (-1, 0), (1, -1), (0, -1), (1, 1), (0, 1)];

impl Hex {
    /// Create a new cell.
    #[must_use]
    pub const fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }

    /// Get the in-bounds neighbors of this cell.
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid cells in indices 0..count.
    #[must_use]
    #[inline]
    pub fn neighbors(&self, width: u16, height: u16) -> ([Hex; 6], u8) {
        let offsets = if self.row % 2 == 0 {
            &EVEN_ROW_OFFSETS
        } else {
            &ODD_ROW_OFFSETS
        };

        let mut result = [Hex::new(0, 0); 6];
        let mut count = 0u8;

        for &(dcol, drow) in offsets {
            let col = i32::from(self.col) + dcol;
            let row = i32::from(self.row) + drow;
            if col < 0 || row < 0 || col >= i32::from(width) || row >= i32::from(height) {
                continue;
            }
            // Both values are within u16 bounds after the check above
            if let (Ok(col), Ok(row)) = (u16::try_from(col), u16::try_from(row)) {
                result[usize::from(count)] = Hex::new(col, row);
                count += 1;
            }
        }

        (result, count)
    }

    /// Row-major index of this cell in a grid of the given width.
    #[must_use]
    pub fn index(&self, width: u16) -> usize {
        usize::from(self.row) * usize::from(width) + usize::from(self.col)
    }

    /// Inverse of [`Hex::index`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_index(index: usize, width: u16) -> Self {
        let width = usize::from(width);
        Self::new((index % width) as u16, (index / width) as u16)
    }
}
