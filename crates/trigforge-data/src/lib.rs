//! Scenario files: board size, facings, visuals, stats, objective texts and
//! an optional explicit object layout, read from RON, TOML or JSON.

pub mod layout;
pub mod loader;
pub mod schema;

pub use layout::ExplicitLayout;
pub use loader::{DataLoadError, Format, LoadedScenario, detect_format, load_scenario, parse_scenario};
