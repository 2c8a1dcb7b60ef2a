//! Next-piece and held-piece preview boards.
//!
//! Same pattern as the main diff graph at a fixed 2×4 size, but the
//! occupant axis is "which piece owns this board": a trigger per piece
//! repaints all eight slots, the piece's slots with its visual and the set
//! difference with the empty visual.

use std::collections::BTreeSet;
use std::fmt;

use trigforge_core::condition::Condition;
use trigforge_core::effect::Effect;
use trigforge_core::graph::TriggerGraph;
use trigforge_core::id::{ObjectId, TriggerId};
use trigforge_core::trigger::TriggerSpec;

use crate::RenderError;
use crate::grid::{Cell, PieceVisuals};
use crate::piece::{Facing, Occupant, Offset};

/// Predicate for next boards. Arguments: `[board, piece]`.
pub const IS_NEXT_PIECE: &str = "isNextPiece";
/// Predicate for the hold board. Arguments: `[occupant]` (0 when empty).
pub const IS_HELD_PIECE: &str = "isHeldPiece";

pub const PREVIEW_ROWS: u32 = 2;
pub const PREVIEW_COLS: u32 = 4;

/// Where a piece's rotation center sits on a preview board.
const PREVIEW_CENTER: Offset = Offset::new(1, 1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreviewBoard {
    /// Position in the upcoming queue, `0` soonest.
    Next(u8),
    Hold,
}

impl fmt::Display for PreviewBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewBoard::Next(k) => write!(f, "next {k}"),
            PreviewBoard::Hold => f.write_str("hold"),
        }
    }
}

/// Placement collaborator for preview slots.
pub trait PreviewGeometry {
    fn preview_slot(&self, board: PreviewBoard, slot: Cell) -> Option<ObjectId>;
}

/// All eight slots of a preview board, row-major.
pub fn preview_slots() -> Vec<Cell> {
    (0..PREVIEW_ROWS)
        .flat_map(|row| (0..PREVIEW_COLS).map(move |col| Cell::new(row, col)))
        .collect()
}

/// Slots covered by `occupant` on a preview board, and the remainder.
pub fn split_slots(occupant: Occupant) -> (BTreeSet<Cell>, BTreeSet<Cell>) {
    let all: BTreeSet<Cell> = preview_slots().into_iter().collect();
    let covered: BTreeSet<Cell> = match occupant {
        Occupant::Empty => BTreeSet::new(),
        Occupant::Piece(piece) => piece
            .oriented(Facing::Up)
            .into_iter()
            .filter_map(|o| {
                let row = u32::try_from(o.row + PREVIEW_CENTER.row).ok()?;
                let col = u32::try_from(o.col + PREVIEW_CENTER.col).ok()?;
                Some(Cell::new(row, col))
            })
            .filter(|cell| all.contains(cell))
            .collect(),
    };
    let rest = all.difference(&covered).copied().collect();
    (covered, rest)
}

/// Preview triggers for every next board plus the hold board.
#[derive(Debug, Clone, Default)]
pub struct PreviewGraph {
    boards: Vec<(PreviewBoard, Vec<(Occupant, TriggerId)>)>,
}

impl PreviewGraph {
    /// Declare `next_boards` next-piece boards (one trigger per piece each)
    /// and one hold board (one trigger per occupant, including empty).
    pub fn declare<G>(
        graph: &mut TriggerGraph,
        next_boards: u8,
        geometry: &G,
        visuals: &PieceVisuals,
    ) -> Result<Self, RenderError>
    where
        G: PreviewGeometry + ?Sized,
    {
        let mut out = PreviewGraph::default();
        for k in 0..next_boards {
            let board = PreviewBoard::Next(k);
            let occupants = Occupant::all().filter(|o| *o != Occupant::Empty);
            let call = |o: Occupant| Condition::script(IS_NEXT_PIECE, [i32::from(k), o.code()]);
            let nodes = declare_board(graph, board, occupants, call, geometry, visuals)?;
            out.boards.push((board, nodes));
        }
        let call = |o: Occupant| Condition::script(IS_HELD_PIECE, [o.code()]);
        let nodes = declare_board(graph, PreviewBoard::Hold, Occupant::all(), call, geometry, visuals)?;
        out.boards.push((PreviewBoard::Hold, nodes));
        Ok(out)
    }

    pub fn boards(&self) -> impl Iterator<Item = PreviewBoard> + '_ {
        self.boards.iter().map(|(b, _)| *b)
    }

    pub fn board(&self, board: PreviewBoard) -> &[(Occupant, TriggerId)] {
        self.boards
            .iter()
            .find(|(b, _)| *b == board)
            .map_or(&[], |(_, nodes)| nodes.as_slice())
    }

    pub fn triggers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.boards
            .iter()
            .flat_map(|(_, nodes)| nodes.iter().map(|&(_, id)| id))
    }

    pub fn len(&self) -> usize {
        self.triggers().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn activation_effects(&self) -> Vec<Effect> {
        self.triggers().map(Effect::Activate).collect()
    }

    pub fn deactivation_effects(&self) -> Vec<Effect> {
        self.triggers().map(Effect::Deactivate).collect()
    }
}

fn declare_board<G, F>(
    graph: &mut TriggerGraph,
    board: PreviewBoard,
    occupants: impl Iterator<Item = Occupant>,
    condition: F,
    geometry: &G,
    visuals: &PieceVisuals,
) -> Result<Vec<(Occupant, TriggerId)>, RenderError>
where
    G: PreviewGeometry + ?Sized,
    F: Fn(Occupant) -> Condition,
{
    let slot_object = |slot: Cell| {
        geometry
            .preview_slot(board, slot)
            .ok_or(RenderError::MissingPreviewSlot { board, slot })
    };
    let mut nodes = Vec::new();
    for occupant in occupants {
        let id = graph.declare(format!("Render {board} {occupant}"), TriggerSpec::ONE_SHOT)?;
        graph.add_condition(id, condition(occupant))?;
        let (covered, rest) = split_slots(occupant);
        for slot in covered {
            let object = slot_object(slot)?;
            graph.add_effect(id, Effect::ReplaceObject { object, visual: visuals.visual(occupant) })?;
        }
        for slot in rest {
            let object = slot_object(slot)?;
            graph.add_effect(id, Effect::ReplaceObject { object, visual: visuals.empty })?;
        }
        nodes.push((occupant, id));
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Tetromino;
    use std::collections::HashMap;

    struct Slots(HashMap<(PreviewBoard, Cell), ObjectId>);

    impl PreviewGeometry for Slots {
        fn preview_slot(&self, board: PreviewBoard, slot: Cell) -> Option<ObjectId> {
            self.0.get(&(board, slot)).copied()
        }
    }

    fn slots(next: u8) -> Slots {
        let mut map = HashMap::new();
        let mut id = 0;
        let boards = (0..next).map(PreviewBoard::Next).chain([PreviewBoard::Hold]);
        for board in boards {
            for slot in preview_slots() {
                map.insert((board, slot), ObjectId(id));
                id += 1;
            }
        }
        Slots(map)
    }

    #[test]
    fn every_piece_fits_in_two_by_four() {
        for piece in Tetromino::ALL {
            let (covered, rest) = split_slots(Occupant::Piece(piece));
            assert_eq!(covered.len(), 4, "{piece}");
            assert_eq!(rest.len(), 4, "{piece}");
            assert!(covered.is_disjoint(&rest));
        }
        let (covered, rest) = split_slots(Occupant::Empty);
        assert!(covered.is_empty());
        assert_eq!(rest.len(), 8);
    }

    #[test]
    fn i_piece_fills_bottom_row() {
        let (covered, _) = split_slots(Occupant::Piece(Tetromino::I));
        let expected: BTreeSet<Cell> = (0..4).map(|c| Cell::new(1, c)).collect();
        assert_eq!(covered, expected);
    }

    #[test]
    fn three_next_boards_and_hold() {
        let mut graph = TriggerGraph::new();
        let preview = PreviewGraph::declare(&mut graph, 3, &slots(3), &PieceVisuals::default()).unwrap();
        assert_eq!(preview.len(), 3 * 7 + 8);
        assert_eq!(preview.board(PreviewBoard::Hold).len(), 8);
        assert_eq!(preview.board(PreviewBoard::Next(2)).len(), 7);
        for id in preview.triggers() {
            assert_eq!(graph.effects(id).unwrap().len(), 8);
        }
    }

    #[test]
    fn hold_empty_clears_every_slot() {
        let mut graph = TriggerGraph::new();
        let visuals = PieceVisuals::default();
        let preview = PreviewGraph::declare(&mut graph, 0, &slots(0), &visuals).unwrap();
        let (_, id) = preview.board(PreviewBoard::Hold)[0];
        assert_eq!(graph.conditions(id).unwrap(), &[Condition::script(IS_HELD_PIECE, [0])]);
        assert!(graph.effects(id).unwrap().iter().all(|e| matches!(
            e,
            Effect::ReplaceObject { visual, .. } if *visual == visuals.empty
        )));
    }

    #[test]
    fn missing_slot_is_reported() {
        let mut graph = TriggerGraph::new();
        let err = PreviewGraph::declare(&mut graph, 1, &slots(0), &PieceVisuals::default()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingPreviewSlot { board: PreviewBoard::Next(0), .. }
        ));
    }
}
