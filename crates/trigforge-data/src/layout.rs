//! Object placement read from a scenario file.

use std::collections::HashMap;

use trigforge_core::id::ObjectId;
use trigforge_render::preview::{PreviewBoard, PreviewGeometry};
use trigforge_render::{Cell, Facing, GridGeometry, PlaceholderMap};
use trigforge_schedule::{Action, ScenarioLayout};

use crate::schema::LayoutData;

/// Table-backed [`ScenarioLayout`].
#[derive(Debug, Clone, Default)]
pub struct ExplicitLayout {
    board: PlaceholderMap,
    previews: HashMap<(PreviewBoard, Cell), ObjectId>,
    hotkeys: HashMap<Action, ObjectId>,
}

/// A key listed twice in a layout section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateEntry(pub String);

impl ExplicitLayout {
    pub fn from_data(data: &LayoutData) -> Result<Self, DuplicateEntry> {
        let mut layout = Self::default();

        let mut seen = HashMap::new();
        for p in &data.placeholders {
            let cell = Cell::new(p.row, p.col);
            if seen.insert((cell, p.facing), ()).is_some() {
                return Err(DuplicateEntry(format!("placeholder {cell} {}", p.facing)));
            }
            layout.board.insert(cell, p.facing, ObjectId(p.object));
        }

        for slot in &data.previews {
            let board = slot.next.map_or(PreviewBoard::Hold, PreviewBoard::Next);
            let cell = Cell::new(slot.row, slot.col);
            if layout.previews.insert((board, cell), ObjectId(slot.object)).is_some() {
                return Err(DuplicateEntry(format!("preview {board} {cell}")));
            }
        }

        for hotkey in &data.hotkeys {
            if layout.hotkeys.insert(hotkey.action, ObjectId(hotkey.object)).is_some() {
                return Err(DuplicateEntry(format!("hotkey {}", hotkey.action)));
            }
        }
        Ok(layout)
    }

    pub fn placeholder_count(&self) -> usize {
        self.board.len()
    }
}

impl GridGeometry for ExplicitLayout {
    fn placeholder(&self, cell: Cell, facing: Facing) -> Option<ObjectId> {
        self.board.placeholder(cell, facing)
    }
}

impl PreviewGeometry for ExplicitLayout {
    fn preview_slot(&self, board: PreviewBoard, slot: Cell) -> Option<ObjectId> {
        self.previews.get(&(board, slot)).copied()
    }
}

impl ScenarioLayout for ExplicitLayout {
    fn hotkey(&self, action: Action) -> Option<ObjectId> {
        self.hotkeys.get(&action).copied()
    }
}
