//! Trigforge Core -- the automaton node graph every trigger compiler targets.
//!
//! The execution substrate offers nothing but named boolean flags (triggers)
//! guarded by conjunctions of side-effect-free conditions, each running an
//! ordered effect list when it fires. This crate models that substrate and a
//! reference interpreter for it.
//!
//! # Declare-then-wire
//!
//! Triggers are declared first and receive stable handles; conditions and
//! effects are attached afterwards, so effects may reference triggers that
//! were declared later:
//!
//! ```rust,ignore
//! let mut graph = TriggerGraph::new();
//! let a = graph.declare("A", TriggerSpec::ONE_SHOT.enabled())?;
//! let b = graph.declare("B", TriggerSpec::ONE_SHOT)?;
//! graph.activate(a, b)?;
//! graph.activate(b, a)?;
//! ```
//!
//! # Tick semantics
//!
//! Each call to [`engine::Engine::step`] visits every trigger once, in
//! declaration order:
//!
//! 1. A trigger fires if it is enabled at its turn and all of its conditions
//!    hold (evaluated left to right, short-circuit).
//! 2. A one-shot trigger is disabled before its effects run; looping
//!    triggers stay armed.
//! 3. Effects apply immediately, so a trigger activated by an earlier one
//!    fires later in the same tick if it is declared later.
//!
//! # Key Types
//!
//! - [`graph::TriggerGraph`] -- Append-only trigger registry with the
//!   activation/deactivation relation exposed as a directed graph.
//! - [`register::RegisterBank`] -- The shared integer registers.
//! - [`engine::Engine`] -- Reference interpreter with per-tick reports.
//! - [`host::ScriptHost`] -- External predicate/effect calls and objects.
//! - [`chance::ChanceSource`] -- Coin flips for `Chance` conditions.
//! - [`serialize`] -- Versioned runtime snapshots via bitcode.

pub mod chance;
pub mod condition;
pub mod effect;
pub mod engine;
pub mod event;
pub mod fixed;
pub mod graph;
pub mod hash;
pub mod host;
pub mod id;
pub mod register;
pub mod rng;
pub mod script;
pub mod serialize;
pub mod trigger;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
