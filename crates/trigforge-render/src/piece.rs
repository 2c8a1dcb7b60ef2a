use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RenderError;

/// A row/column offset from a piece's center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Offset {
    pub row: i32,
    pub col: i32,
}

impl Offset {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn rotate_cw(self) -> Self {
        Self::new(self.col, -self.row)
    }

    pub fn rotate_ccw(self) -> Self {
        Self::new(-self.col, self.row)
    }
}

/// The direction a board is viewed from. Each cell owns one placeholder
/// per facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Facing {
    Up,
    Right,
    Down,
    Left,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Right, Facing::Down, Facing::Left];

    pub fn code(self) -> i32 {
        match self {
            Facing::Up => 0,
            Facing::Right => 1,
            Facing::Down => 2,
            Facing::Left => 3,
        }
    }

    pub fn clockwise(self) -> Facing {
        match self {
            Facing::Up => Facing::Right,
            Facing::Right => Facing::Down,
            Facing::Down => Facing::Left,
            Facing::Left => Facing::Up,
        }
    }

    pub fn counterclockwise(self) -> Facing {
        match self {
            Facing::Up => Facing::Left,
            Facing::Left => Facing::Down,
            Facing::Down => Facing::Right,
            Facing::Right => Facing::Up,
        }
    }

    /// Rotate an offset from the `Up` orientation into this one.
    pub fn orient(self, offset: Offset) -> Offset {
        match self {
            Facing::Up => offset,
            Facing::Right => offset.rotate_cw(),
            Facing::Down => offset.rotate_cw().rotate_cw(),
            Facing::Left => offset.rotate_ccw(),
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Facing::Up => "U",
            Facing::Right => "R",
            Facing::Down => "D",
            Facing::Left => "L",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tetromino {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::J,
        Tetromino::L,
        Tetromino::O,
        Tetromino::S,
        Tetromino::T,
        Tetromino::Z,
    ];

    /// Occupant code. Never `0`, which means empty.
    pub fn code(self) -> i32 {
        match self {
            Tetromino::I => 1,
            Tetromino::J => 2,
            Tetromino::L => 3,
            Tetromino::O => 4,
            Tetromino::S => 5,
            Tetromino::T => 6,
            Tetromino::Z => 7,
        }
    }

    /// Cells relative to the rotation center, spawn orientation.
    pub fn shape(self) -> [Offset; 4] {
        let o = Offset::new;
        match self {
            Tetromino::I => [o(0, -1), o(0, 0), o(0, 1), o(0, 2)],
            Tetromino::J => [o(-1, -1), o(0, -1), o(0, 0), o(0, 1)],
            Tetromino::L => [o(0, -1), o(0, 0), o(0, 1), o(-1, 1)],
            Tetromino::O => [o(0, 0), o(-1, 0), o(-1, 1), o(0, 1)],
            Tetromino::S => [o(0, -1), o(0, 0), o(-1, 0), o(-1, 1)],
            Tetromino::T => [o(0, -1), o(0, 0), o(0, 1), o(-1, 0)],
            Tetromino::Z => [o(-1, -1), o(-1, 0), o(0, 0), o(0, 1)],
        }
    }

    /// Cells for the given orientation. The O piece does not rotate.
    pub fn oriented(self, facing: Facing) -> [Offset; 4] {
        match self {
            Tetromino::O => self.shape(),
            _ => self.shape().map(|offset| facing.orient(offset)),
        }
    }
}

impl fmt::Display for Tetromino {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What a cell or preview slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Occupant {
    Empty,
    Piece(Tetromino),
}

impl Occupant {
    /// Empty followed by every piece.
    pub fn all() -> impl Iterator<Item = Occupant> {
        std::iter::once(Occupant::Empty).chain(Tetromino::ALL.into_iter().map(Occupant::Piece))
    }

    pub fn code(self) -> i32 {
        match self {
            Occupant::Empty => 0,
            Occupant::Piece(piece) => piece.code(),
        }
    }

    pub fn from_code(code: i32) -> Result<Occupant, RenderError> {
        if code == 0 {
            return Ok(Occupant::Empty);
        }
        Tetromino::ALL
            .into_iter()
            .find(|p| p.code() == code)
            .map(Occupant::Piece)
            .ok_or(RenderError::InvalidOccupantCode(code))
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Empty => f.write_str("Empty"),
            Occupant::Piece(piece) => write!(f, "{piece}"),
        }
    }
}
