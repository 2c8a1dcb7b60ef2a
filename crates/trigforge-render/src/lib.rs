//! Reactive redraw compiled to an enumerated diff graph.
//!
//! The substrate cannot read a cell's occupant and dispatch on it; it can
//! only evaluate a fixed predicate and act. Every (cell, facing, occupant)
//! combination in the visible region therefore gets its own one-shot
//! trigger, guarded by "this combination is the current ground truth" and
//! replacing the cell's placeholder with the occupant's visual.
//!
//! Occupant code `0` means empty; pieces are coded `1..=7`.

pub mod diff;
pub mod grid;
pub mod piece;
pub mod preview;

pub use diff::{GroundTruth, RenderDiffGraph, RenderKey};
pub use grid::{BoardRegion, Cell, GridGeometry, PieceVisuals, PlaceholderMap};
pub use piece::{Facing, Occupant, Offset, Tetromino};
pub use preview::{PreviewBoard, PreviewGeometry, PreviewGraph};

use trigforge_core::graph::GraphError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("no placeholder object for cell {cell} facing {facing}")]
    MissingPlaceholder { cell: Cell, facing: Facing },
    #[error("no object for slot {slot} of the {board} preview board")]
    MissingPreviewSlot { board: PreviewBoard, slot: Cell },
    #[error("occupant code {0} is neither empty (0) nor a piece (1..=7)")]
    InvalidOccupantCode(i32),
    #[error(transparent)]
    Graph(#[from] GraphError),
}
