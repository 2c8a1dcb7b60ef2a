use trigforge_chance::{ChanceError, ShuffleChain};
use trigforge_core::condition::Condition;
use trigforge_core::effect::Effect;
use trigforge_core::graph::{GraphError, TriggerGraph};
use trigforge_core::id::{RegisterId, TriggerId};
use trigforge_core::trigger::TriggerSpec;
use trigforge_render::{PreviewGraph, RenderDiffGraph};

use crate::input::InputBank;
use crate::objective::Objectives;
use crate::reaction::{Reaction, Reactions};
use crate::rows::RowTriggers;

/// Names of the external calls the scheduler emits.
pub mod calls {
    /// Initializes script-side state. Must run before any other call.
    pub const INIT_XS_ARRAY: &str = "initXsArray";
    pub const CAN_BEGIN_GAME: &str = "canBeginGame";
    pub const BEGIN_GAME: &str = "beginGame";
    /// The step function.
    pub const UPDATE: &str = "update";
    pub const SHOULD_SHUFFLE: &str = "shouldShuffle";
    pub const IS_GAME_OVER: &str = "isGameOver";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    BeginRound,
    GameLoop,
    Update,
    Cleanup,
    GameOver,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Init,
        Phase::BeginRound,
        Phase::GameLoop,
        Phase::Update,
        Phase::Cleanup,
        Phase::GameOver,
    ];
}

/// Handles of the scheduler's own triggers.
///
/// Besides the six phases, a round start needs two relays so each sequence
/// buffer's shuffle can hand off to the next step, and the reshuffle check
/// arms the third shuffle chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseNodes {
    pub init: TriggerId,
    pub begin_round: TriggerId,
    pub begin_round_middle: TriggerId,
    pub game_loop: TriggerId,
    pub update: TriggerId,
    pub shuffle: TriggerId,
    pub game_over: TriggerId,
    pub cleanup: TriggerId,
    pub begin_round_end: TriggerId,
}

impl PhaseNodes {
    pub fn phase(&self, phase: Phase) -> TriggerId {
        match phase {
            Phase::Init => self.init,
            Phase::BeginRound => self.begin_round,
            Phase::GameLoop => self.game_loop,
            Phase::Update => self.update,
            Phase::Cleanup => self.cleanup,
            Phase::GameOver => self.game_over,
        }
    }

    pub fn phases(&self) -> [TriggerId; 6] {
        Phase::ALL.map(|p| self.phase(p))
    }

    /// Phases of which exactly one is current between rounds and ticks.
    pub fn round_group(&self) -> [TriggerId; 4] {
        [self.init, self.begin_round, self.game_loop, self.game_over]
    }

    /// Phases run inside a game-loop tick.
    pub fn body_group(&self) -> [TriggerId; 2] {
        [self.update, self.cleanup]
    }

    pub fn declare_init(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Init Scenario", TriggerSpec::ONE_SHOT.enabled())
    }

    pub fn declare_begin_round(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Begin Game", TriggerSpec::ONE_SHOT)
    }

    pub fn declare_begin_round_middle(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Begin Game Middle", TriggerSpec::ONE_SHOT)
    }

    pub fn declare_game_loop(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Game Loop", TriggerSpec::LOOPING)
    }

    pub fn declare_update(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Update", TriggerSpec::ONE_SHOT)
    }

    pub fn declare_shuffle(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Activate Shuffle", TriggerSpec::ONE_SHOT)
    }

    pub fn declare_game_over(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Game Over", TriggerSpec::ONE_SHOT)
    }

    pub fn declare_cleanup(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Cleanup", TriggerSpec::ONE_SHOT)
    }

    pub fn declare_begin_round_end(graph: &mut TriggerGraph) -> Result<TriggerId, GraphError> {
        graph.declare("Begin Game End", TriggerSpec::ONE_SHOT)
    }
}

/// The declared subgraphs the scheduler arms and disarms.
#[derive(Debug, Clone, Copy)]
pub struct Scheduled<'a> {
    pub objectives: &'a Objectives,
    pub round_start: &'a ShuffleChain,
    pub round_start_second: &'a ShuffleChain,
    pub reshuffle: &'a ShuffleChain,
    pub inputs: &'a InputBank,
    pub row_clears: &'a RowTriggers,
    pub board: &'a RenderDiffGraph,
    pub previews: &'a PreviewGraph,
    pub row_explosions: &'a RowTriggers,
    pub reactions: &'a Reactions,
    pub selection: RegisterId,
}

impl Scheduled<'_> {
    /// Triggers armed by update and disarmed by cleanup, besides game-over.
    fn per_tick(&self) -> Vec<TriggerId> {
        self.row_clears
            .triggers()
            .chain(self.board.triggers())
            .chain(self.previews.triggers())
            .chain(self.row_explosions.triggers())
            .chain(self.reactions.triggers())
            .collect()
    }
}

impl PhaseNodes {
    /// Wire the phase cycle. Exclusion effects are attached before any
    /// transition effect, so a phase that excludes a peer may re-arm it.
    pub fn wire(
        &self,
        graph: &mut TriggerGraph,
        parts: &Scheduled<'_>,
        reset_registers: Vec<Effect>,
    ) -> Result<(), ChanceError> {
        graph.mutually_exclusive(&self.round_group())?;
        graph.mutually_exclusive(&self.body_group())?;

        // init -> begin-round
        graph.add_effect(self.init, Effect::script(calls::INIT_XS_ARRAY, []))?;
        graph.activate(self.init, self.begin_round)?;

        // begin-round -> first shuffle -> middle -> second shuffle -> end -> game-loop
        let to_middle = [Effect::Activate(self.begin_round_middle)];
        let to_end = [Effect::Activate(self.begin_round_end)];
        graph.add_condition(self.begin_round, Condition::script(calls::CAN_BEGIN_GAME, []))?;
        graph.add_effects(self.begin_round, parts.objectives.round_start_effects())?;
        graph.add_effects(self.begin_round, reset_registers)?;
        graph.add_effect(self.begin_round, Effect::script(calls::BEGIN_GAME, []))?;
        graph.add_effects(self.begin_round, parts.round_start.start_effects(&to_middle))?;
        parts.round_start.wire(graph, &to_middle)?;
        graph.add_effects(
            self.begin_round_middle,
            parts.round_start_second.start_effects(&to_end),
        )?;
        parts.round_start_second.wire(graph, &to_end)?;
        graph.activate(self.begin_round_end, self.game_loop)?;

        // game-loop -> inputs, update
        graph.add_effect(
            self.game_loop,
            Effect::SetRegister {
                register: parts.selection,
                value: 0,
            },
        )?;
        graph.add_effects(self.game_loop, parts.inputs.activation_effects())?;
        graph.activate(self.game_loop, self.update)?;

        // update -> per-tick checks, game-over, cleanup
        let per_tick = parts.per_tick();
        graph.add_effect(self.update, Effect::script(calls::UPDATE, []))?;
        graph.add_effects(self.update, per_tick.iter().copied().map(Effect::Activate))?;
        graph.activate(self.update, self.shuffle)?;
        graph.activate(self.update, self.game_over)?;
        graph.activate(self.update, self.cleanup)?;

        // reshuffle point
        graph.add_condition(self.shuffle, Condition::script(calls::SHOULD_SHUFFLE, []))?;
        graph.add_effects(self.shuffle, parts.reshuffle.start_effects(&[]))?;
        parts.reshuffle.wire(graph, &[])?;

        // game-over -> begin-round
        graph.add_condition(self.game_over, Condition::script(calls::IS_GAME_OVER, []))?;
        graph.activate(self.game_over, parts.objectives.game_over)?;
        graph.add_effect(self.game_over, Reaction::GameOver.play_effect())?;
        if let Some(egg) = parts.reactions.easter_egg() {
            graph.activate(self.game_over, egg)?;
        }
        graph.activate(self.game_over, self.begin_round)?;

        // cleanup
        graph.add_effects(self.cleanup, per_tick.iter().copied().map(Effect::Deactivate))?;
        graph.add_effects(self.cleanup, parts.inputs.deactivation_effects())?;
        graph.deactivate(self.cleanup, self.shuffle)?;
        graph.deactivate(self.cleanup, self.game_over)?;
        if let Some(egg) = parts.reactions.easter_egg() {
            graph.deactivate(self.cleanup, egg)?;
        }
        Ok(())
    }
}
