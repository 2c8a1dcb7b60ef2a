use trigforge_render::grid::BoardRegion;
use trigforge_render::{Facing, PieceVisuals};

use crate::objective::ObjectiveTexts;

/// Number of distinct pieces, and so the length of each sequence buffer.
pub const SEQUENCE_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board must have at least one row and one column, got {rows}x{cols}")]
    EmptyBoard { rows: u32, cols: u32 },
    #[error("hidden rows ({hidden}) leave no visible row on a {rows}-row board")]
    NothingVisible { rows: u32, hidden: u32 },
    #[error("at least one facing is required")]
    NoFacings,
    #[error("facing {0} is listed twice")]
    DuplicateFacing(Facing),
    #[error("visual {0} is shared between the empty placeholder and a piece")]
    EmptyVisualReused(u32),
}

/// Board dimensions. The top `hidden_rows` rows are spawn space and are
/// never rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub rows: u32,
    pub cols: u32,
    pub hidden_rows: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 10,
            hidden_rows: 10,
        }
    }
}

impl BoardConfig {
    pub fn visible_region(&self) -> BoardRegion {
        BoardRegion::visible(self.rows, self.cols, self.hidden_rows)
    }
}

/// Initial values of the stat registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsConfig {
    pub score: i32,
    pub level: i32,
    pub lines: i32,
}

/// Everything the compile pass needs besides object placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub board: BoardConfig,
    pub facings: Vec<Facing>,
    pub next_previews: u8,
    pub visuals: PieceVisuals,
    pub stats: StatsConfig,
    pub objectives: ObjectiveTexts,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            facings: Facing::ALL.to_vec(),
            next_previews: 3,
            visuals: PieceVisuals::default(),
            stats: StatsConfig::default(),
            objectives: ObjectiveTexts::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoardConfig { rows, cols, hidden_rows } = self.board;
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyBoard { rows, cols });
        }
        if hidden_rows >= rows {
            return Err(ConfigError::NothingVisible { rows, hidden: hidden_rows });
        }
        if self.facings.is_empty() {
            return Err(ConfigError::NoFacings);
        }
        for (i, facing) in self.facings.iter().enumerate() {
            if self.facings[..i].contains(facing) {
                return Err(ConfigError::DuplicateFacing(*facing));
            }
        }
        if self.visuals.pieces.contains(&self.visuals.empty) {
            return Err(ConfigError::EmptyVisualReused(self.visuals.empty.0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trigforge_core::id::VisualId;

    #[test]
    fn default_is_valid() {
        let config = ScenarioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.board.visible_region().len(), 100);
    }

    #[test]
    fn rejects_degenerate_boards() {
        let mut config = ScenarioConfig::default();
        config.board.cols = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyBoard { rows: 20, cols: 0 }));
        config.board = BoardConfig { rows: 4, cols: 4, hidden_rows: 4 };
        assert_eq!(config.validate(), Err(ConfigError::NothingVisible { rows: 4, hidden: 4 }));
    }

    #[test]
    fn rejects_duplicate_facings_and_shared_empty_visual() {
        let mut config = ScenarioConfig::default();
        config.facings = vec![Facing::Up, Facing::Up];
        assert_eq!(config.validate(), Err(ConfigError::DuplicateFacing(Facing::Up)));
        let mut config = ScenarioConfig::default();
        config.visuals.empty = VisualId(3);
        assert_eq!(config.validate(), Err(ConfigError::EmptyVisualReused(3)));
    }
}
