//! Format detection, deserialization and resolution of scenario files into
//! a [`ScenarioConfig`] plus optional layout.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;
use trigforge_core::id::VisualId;
use trigforge_render::{Facing, PieceVisuals};
use trigforge_schedule::config::{BoardConfig, StatsConfig};
use trigforge_schedule::objective::ObjectiveTexts;
use trigforge_schedule::{CompileError, CompiledScenario, ConfigError, ScenarioConfig, SequentialLayout, compile};

use crate::layout::ExplicitLayout;
use crate::schema::ScenarioData;

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A layout key appears twice.
    #[error("duplicate {name} in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The file parsed but describes an unusable scenario.
    #[error("invalid scenario in {file}: {source}")]
    Invalid {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

fn deserialize<T: DeserializeOwned>(content: &str, format: Format, file: &Path) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

// ===========================================================================
// Resolution
// ===========================================================================

/// A resolved scenario file.
#[derive(Debug, Clone)]
pub struct LoadedScenario {
    pub config: ScenarioConfig,
    /// `None` when the file has no layout section.
    pub layout: Option<ExplicitLayout>,
}

impl LoadedScenario {
    /// Compile with the file's layout, or sequential ids when it has none.
    pub fn compile(&self) -> Result<CompiledScenario, CompileError> {
        match &self.layout {
            Some(layout) => compile(&self.config, layout),
            None => compile(&self.config, &SequentialLayout::new(&self.config)),
        }
    }
}

fn resolve_config(data: &ScenarioData) -> ScenarioConfig {
    let defaults = ScenarioConfig::default();
    let board = BoardConfig {
        rows: data.board.rows.unwrap_or(defaults.board.rows),
        cols: data.board.cols.unwrap_or(defaults.board.cols),
        hidden_rows: data.board.hidden_rows.unwrap_or(defaults.board.hidden_rows),
    };
    let facings = data.facings.clone().unwrap_or_else(|| Facing::ALL.to_vec());

    let v = &data.visuals;
    let d = &defaults.visuals;
    let pick = |value: Option<u32>, default: VisualId| value.map_or(default, VisualId);
    let visuals = PieceVisuals {
        empty: pick(v.empty, d.empty),
        pieces: [
            pick(v.i, d.pieces[0]),
            pick(v.j, d.pieces[1]),
            pick(v.l, d.pieces[2]),
            pick(v.o, d.pieces[3]),
            pick(v.s, d.pieces[4]),
            pick(v.t, d.pieces[5]),
            pick(v.z, d.pieces[6]),
        ],
    };

    let o = &data.objectives;
    let objectives = ObjectiveTexts {
        new_game: o.new_game.clone().unwrap_or(defaults.objectives.new_game),
        game_over: o.game_over.clone().unwrap_or(defaults.objectives.game_over),
        stats: o.stats.clone().unwrap_or(defaults.objectives.stats),
    };

    ScenarioConfig {
        board,
        facings,
        next_previews: data.next_previews.unwrap_or(defaults.next_previews),
        visuals,
        stats: StatsConfig {
            score: data.stats.score,
            level: data.stats.level,
            lines: data.stats.lines,
        },
        objectives,
    }
}

/// Parse and resolve scenario text. `file` is only used in error messages.
pub fn parse_scenario(content: &str, format: Format, file: &Path) -> Result<LoadedScenario, DataLoadError> {
    let data: ScenarioData = deserialize(content, format, file)?;
    let config = resolve_config(&data);
    config.validate().map_err(|source| DataLoadError::Invalid {
        file: file.to_path_buf(),
        source,
    })?;
    let layout = data
        .layout
        .as_ref()
        .map(ExplicitLayout::from_data)
        .transpose()
        .map_err(|dup| DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: dup.0,
        })?;
    Ok(LoadedScenario { config, layout })
}

/// Read a scenario file, detecting its format from the extension.
pub fn load_scenario(path: &Path) -> Result<LoadedScenario, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let loaded = parse_scenario(&content, format, path)?;
    info!(
        file = %path.display(),
        ?format,
        rows = loaded.config.board.rows,
        cols = loaded.config.board.cols,
        explicit_layout = loaded.layout.is_some(),
        "scenario_loaded"
    );
    Ok(loaded)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use trigforge_render::Cell;
    use trigforge_render::GridGeometry;
    use trigforge_schedule::{Action, ScenarioLayout};

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trigforge_data_test_{suffix}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("s.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("s.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("s.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("s.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("scenario")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn empty_file_yields_defaults() {
        let loaded = parse_scenario("()", Format::Ron, Path::new("empty.ron")).unwrap();
        assert_eq!(loaded.config, ScenarioConfig::default());
        assert!(loaded.layout.is_none());

        let loaded = parse_scenario("", Format::Toml, Path::new("empty.toml")).unwrap();
        assert_eq!(loaded.config, ScenarioConfig::default());

        let loaded = parse_scenario("{}", Format::Json, Path::new("empty.json")).unwrap();
        assert_eq!(loaded.config, ScenarioConfig::default());
    }

    #[test]
    fn ron_overrides() {
        let src = r#"(
            board: (rows: Some(12), cols: Some(6), hidden_rows: Some(4)),
            facings: Some([Up, Down]),
            next_previews: Some(1),
            visuals: (empty: Some(100)),
            stats: (level: 1),
        )"#;
        let loaded = parse_scenario(src, Format::Ron, Path::new("s.ron")).unwrap();
        let c = &loaded.config;
        assert_eq!((c.board.rows, c.board.cols, c.board.hidden_rows), (12, 6, 4));
        assert_eq!(c.facings, [Facing::Up, Facing::Down]);
        assert_eq!(c.next_previews, 1);
        assert_eq!(c.visuals.empty, VisualId(100));
        assert_eq!(c.stats.level, 1);
        assert_eq!(c.objectives, ObjectiveTexts::default());
    }

    #[test]
    fn toml_overrides() {
        let src = r#"
            facings = ["Left"]

            [board]
            rows = 8
            cols = 4
            hidden_rows = 2

            [objectives]
            stats = "Points: <Score>"
        "#;
        let loaded = parse_scenario(src, Format::Toml, Path::new("s.toml")).unwrap();
        assert_eq!(loaded.config.board.rows, 8);
        assert_eq!(loaded.config.facings, [Facing::Left]);
        assert_eq!(loaded.config.objectives.stats, "Points: <Score>");
    }

    #[test]
    fn json_overrides() {
        let src = r#"{ "board": { "cols": 8 }, "stats": { "score": 5 } }"#;
        let loaded = parse_scenario(src, Format::Json, Path::new("s.json")).unwrap();
        assert_eq!(loaded.config.board.cols, 8);
        assert_eq!(loaded.config.board.rows, 20);
        assert_eq!(loaded.config.stats.score, 5);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = parse_scenario(r#"{ "bord": {} }"#, Format::Json, Path::new("s.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
    }

    #[test]
    fn invalid_board_is_rejected() {
        let src = "[board]\nrows = 4\nhidden_rows = 4\n";
        let err = parse_scenario(src, Format::Toml, Path::new("s.toml")).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Invalid {
                source: ConfigError::NothingVisible { rows: 4, hidden: 4 },
                ..
            }
        ));
    }

    #[test]
    fn layout_section_is_resolved() {
        let src = r#"
            [[layout.placeholders]]
            row = 11
            col = 3
            facing = "Right"
            object = 900

            [[layout.previews]]
            next = 0
            row = 1
            col = 2
            object = 901

            [[layout.hotkeys]]
            action = "Hold"
            object = 902
        "#;
        let loaded = parse_scenario(src, Format::Toml, Path::new("s.toml")).unwrap();
        let layout = loaded.layout.unwrap();
        assert_eq!(
            layout.placeholder(Cell::new(11, 3), Facing::Right),
            Some(trigforge_core::id::ObjectId(900))
        );
        assert_eq!(layout.hotkey(Action::Hold), Some(trigforge_core::id::ObjectId(902)));
        assert_eq!(layout.hotkey(Action::NewGame), None);
    }

    #[test]
    fn duplicate_hotkey_is_rejected() {
        let src = r#"(layout: Some((hotkeys: [
            (action: Hold, object: 1),
            (action: Hold, object: 2),
        ])))"#;
        let err = parse_scenario(src, Format::Ron, Path::new("s.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateName { .. }));
    }

    #[test]
    fn incomplete_layout_fails_to_compile() {
        let src = r#"(layout: Some((placeholders: [(row: 10, col: 0, facing: Up, object: 1)])))"#;
        let loaded = parse_scenario(src, Format::Ron, Path::new("s.ron")).unwrap();
        assert!(matches!(loaded.compile(), Err(CompileError::Render(_))));
    }

    #[test]
    fn load_scenario_from_disk() {
        let dir = make_test_dir("load");
        let path = dir.join("scenario.json");
        fs::write(&path, r#"{ "next_previews": 2 }"#).unwrap();
        let loaded = load_scenario(&path).unwrap();
        assert_eq!(loaded.config.next_previews, 2);
        let scenario = loaded.compile().unwrap();
        assert_eq!(scenario.previews.len(), 2 * 7 + 8);
        cleanup(&dir);
    }

    #[test]
    fn load_scenario_missing_file() {
        let dir = make_test_dir("missing");
        let err = load_scenario(&dir.join("nope.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
        cleanup(&dir);
    }

    #[test]
    fn bundled_scenario_compiles() {
        let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data/default_scenario.ron"));
        let loaded = load_scenario(path).unwrap();
        assert_eq!(loaded.config, ScenarioConfig::default());
        let scenario = loaded.compile().unwrap();
        assert_eq!(scenario.board.len(), 3200);
    }
}
