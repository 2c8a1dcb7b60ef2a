use std::collections::HashMap;

use trigforge_core::id::ObjectId;
use trigforge_render::preview::{PREVIEW_COLS, PREVIEW_ROWS, PreviewBoard, PreviewGeometry};
use trigforge_render::{Cell, Facing, GridGeometry};

use crate::config::ScenarioConfig;
use crate::input::Action;

/// Object placement the compile pass consumes: board placeholders, preview
/// slots, and the hotkey object for each action.
pub trait ScenarioLayout: GridGeometry + PreviewGeometry {
    fn hotkey(&self, action: Action) -> Option<ObjectId>;
}

/// Allocates object ids in a fixed order: board placeholders (visible
/// cells row-major, facings innermost), preview slots (next boards then
/// hold), then hotkeys in priority order.
#[derive(Debug, Clone, Default)]
pub struct SequentialLayout {
    board: HashMap<(Cell, Facing), ObjectId>,
    previews: HashMap<(PreviewBoard, Cell), ObjectId>,
    hotkeys: HashMap<Action, ObjectId>,
    next_id: u32,
}

impl SequentialLayout {
    pub fn new(config: &ScenarioConfig) -> Self {
        let mut layout = Self {
            next_id: 1,
            ..Self::default()
        };
        for cell in config.board.visible_region().cells() {
            for &facing in &config.facings {
                let id = layout.allocate();
                layout.board.insert((cell, facing), id);
            }
        }
        let boards = (0..config.next_previews)
            .map(PreviewBoard::Next)
            .chain(std::iter::once(PreviewBoard::Hold));
        for board in boards {
            for row in 0..PREVIEW_ROWS {
                for col in 0..PREVIEW_COLS {
                    let id = layout.allocate();
                    layout.previews.insert((board, Cell::new(row, col)), id);
                }
            }
        }
        for action in Action::ALL {
            let id = layout.allocate();
            layout.hotkeys.insert(action, id);
        }
        layout
    }

    fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Total objects allocated.
    pub fn object_count(&self) -> usize {
        self.board.len() + self.previews.len() + self.hotkeys.len()
    }
}

impl GridGeometry for SequentialLayout {
    fn placeholder(&self, cell: Cell, facing: Facing) -> Option<ObjectId> {
        self.board.get(&(cell, facing)).copied()
    }
}

impl PreviewGeometry for SequentialLayout {
    fn preview_slot(&self, board: PreviewBoard, slot: Cell) -> Option<ObjectId> {
        self.previews.get(&(board, slot)).copied()
    }
}

impl ScenarioLayout for SequentialLayout {
    fn hotkey(&self, action: Action) -> Option<ObjectId> {
        self.hotkeys.get(&action).copied()
    }
}
