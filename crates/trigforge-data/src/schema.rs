//! On-disk scenario format. Every section is optional and falls back to the
//! built-in defaults.

use serde::Deserialize;
use trigforge_render::Facing;
use trigforge_schedule::Action;

/// Top-level scenario file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioData {
    pub board: BoardData,
    /// Facings to render; all four when absent.
    pub facings: Option<Vec<Facing>>,
    pub next_previews: Option<u8>,
    pub visuals: VisualsData,
    pub stats: StatsData,
    pub objectives: ObjectivesData,
    /// Explicit object placement. Ids are allocated sequentially when absent.
    pub layout: Option<LayoutData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardData {
    pub rows: Option<u32>,
    pub cols: Option<u32>,
    pub hidden_rows: Option<u32>,
}

/// Visual ids per occupant.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisualsData {
    pub empty: Option<u32>,
    pub i: Option<u32>,
    pub j: Option<u32>,
    pub l: Option<u32>,
    pub o: Option<u32>,
    pub s: Option<u32>,
    pub t: Option<u32>,
    pub z: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsData {
    pub score: i32,
    pub level: i32,
    pub lines: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObjectivesData {
    pub new_game: Option<String>,
    pub game_over: Option<String>,
    pub stats: Option<String>,
}

// ===========================================================================
// Layout
// ===========================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutData {
    pub placeholders: Vec<PlaceholderData>,
    pub previews: Vec<PreviewSlotData>,
    pub hotkeys: Vec<HotkeyData>,
}

/// The object standing in for one board cell at one facing.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceholderData {
    pub row: u32,
    pub col: u32,
    pub facing: Facing,
    pub object: u32,
}

/// One preview slot. `next` selects a next-piece board; the hold board
/// when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreviewSlotData {
    #[serde(default)]
    pub next: Option<u8>,
    pub row: u32,
    pub col: u32,
    pub object: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HotkeyData {
    pub action: Action,
    pub object: u32,
}
