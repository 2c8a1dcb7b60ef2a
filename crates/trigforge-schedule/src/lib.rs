//! Phase-sequenced turn loop compiled to a cyclic trigger subgraph, and the
//! compile pass that assembles a whole scenario.
//!
//! # Phases
//!
//! `init → begin-round → game-loop ⟲ (update → cleanup) → game-over →
//! begin-round → …`
//!
//! - **init** runs once: initializes the script state and arms begin-round.
//! - **begin-round** waits on an external start predicate, resets every
//!   register, shuffles both sequence buffers, then arms game-loop.
//! - **game-loop** (looping) clears the selection register, arms the input
//!   bank and update.
//! - **update** runs the external step function and arms the row, render,
//!   preview, reaction, reshuffle and game-over checks, and cleanup.
//! - **game-over** fires on an external predicate: stops game-loop, shows
//!   the game-over objective, arms its easter-egg reaction, re-arms
//!   begin-round.
//! - **cleanup** disarms every per-tick trigger.
//!
//! Round-level phases {init, begin-round, game-loop, game-over} and the tick
//! body {update, cleanup} are each wired as mutual-exclusion groups, with
//! the exclusion effects placed before any transition effect.

pub mod compile;
pub mod config;
pub mod input;
pub mod layout;
pub mod objective;
pub mod reaction;
pub mod rows;
pub mod scheduler;

pub use compile::{CompileError, CompiledScenario, StatRegisters, compile};
pub use config::{ConfigError, ScenarioConfig};
pub use input::{Action, InputBank};
pub use layout::{ScenarioLayout, SequentialLayout};
pub use scheduler::{Phase, PhaseNodes};
