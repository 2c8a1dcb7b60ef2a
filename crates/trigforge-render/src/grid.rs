use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use trigforge_core::id::{ObjectId, VisualId};

use crate::piece::{Facing, Occupant, Tetromino};

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A rectangular block of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRegion {
    pub rows: Range<u32>,
    pub cols: Range<u32>,
}

impl BoardRegion {
    pub fn new(rows: Range<u32>, cols: Range<u32>) -> Self {
        Self { rows, cols }
    }

    /// The rows a player can see: the bottom `rows - hidden` rows.
    pub fn visible(rows: u32, cols: u32, hidden: u32) -> Self {
        Self::new(hidden.min(rows)..rows, 0..cols)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.rows.contains(&cell.row) && self.cols.contains(&cell.col)
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> Vec<Cell> {
        let cols = self.cols.clone();
        self.rows
            .clone()
            .flat_map(|row| cols.clone().map(move |col| Cell::new(row, col)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len() * self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Placement collaborator: which object stands in for a (cell, facing).
pub trait GridGeometry {
    fn placeholder(&self, cell: Cell, facing: Facing) -> Option<ObjectId>;
}

/// Table-backed geometry.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderMap {
    objects: HashMap<(Cell, Facing), ObjectId>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cell: Cell, facing: Facing, object: ObjectId) {
        self.objects.insert((cell, facing), object);
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl GridGeometry for PlaceholderMap {
    fn placeholder(&self, cell: Cell, facing: Facing) -> Option<ObjectId> {
        self.objects.get(&(cell, facing)).copied()
    }
}

/// Visual for each occupant: a neutral placeholder for empty, one per piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceVisuals {
    pub empty: VisualId,
    /// Indexed by `Tetromino::code() - 1`.
    pub pieces: [VisualId; 7],
}

impl PieceVisuals {
    pub fn visual(&self, occupant: Occupant) -> VisualId {
        match occupant {
            Occupant::Empty => self.empty,
            Occupant::Piece(piece) => self.piece(piece),
        }
    }

    pub fn piece(&self, piece: Tetromino) -> VisualId {
        let index = match piece {
            Tetromino::I => 0,
            Tetromino::J => 1,
            Tetromino::L => 2,
            Tetromino::O => 3,
            Tetromino::S => 4,
            Tetromino::T => 5,
            Tetromino::Z => 6,
        };
        self.pieces[index]
    }
}

impl Default for PieceVisuals {
    fn default() -> Self {
        Self {
            empty: VisualId(0),
            pieces: [1, 2, 3, 4, 5, 6, 7].map(VisualId),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_region_is_bottom_half() {
        let region = BoardRegion::visible(20, 10, 10);
        assert_eq!(region.len(), 100);
        assert!(region.contains(Cell::new(10, 0)));
        assert!(!region.contains(Cell::new(9, 0)));
        assert_eq!(region.cells().first(), Some(&Cell::new(10, 0)));
        assert_eq!(region.cells().last(), Some(&Cell::new(19, 9)));
    }

    #[test]
    fn hidden_larger_than_board_is_empty() {
        assert!(BoardRegion::visible(4, 4, 9).is_empty());
    }

    #[test]
    fn visuals_keep_empty_distinct() {
        let v = PieceVisuals::default();
        assert_eq!(v.visual(Occupant::Empty), VisualId(0));
        assert_eq!(v.visual(Occupant::Piece(Tetromino::Z)), VisualId(7));
    }
}
