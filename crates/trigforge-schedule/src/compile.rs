use trigforge_chance::{ChanceError, SequenceBuffer, ShuffleChain, TreeBuilder};
use trigforge_core::engine::Engine;
use trigforge_core::graph::{GraphError, TriggerGraph};
use trigforge_core::id::{RegisterId, TriggerId};
use trigforge_core::register::{RegisterBank, RegisterError};
use trigforge_core::validation::{
    ValidationIssue, check_exclusive_group, undeclared_registers, unreachable_triggers,
};
use trigforge_render::{PreviewGraph, RenderDiffGraph, RenderError, Tetromino};
use tracing::info;

use crate::config::{ConfigError, SEQUENCE_LEN, ScenarioConfig};
use crate::input::{InputBank, InputError};
use crate::layout::ScenarioLayout;
use crate::objective::Objectives;
use crate::reaction::Reactions;
use crate::rows::{RowAction, RowTriggers};
use crate::scheduler::{PhaseNodes, Scheduled};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Any failure aborts the compile pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Chance(#[from] ChanceError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("compiled graph failed validation: {0}")]
    Validation(ValidationIssue),
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Handles of the shared registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRegisters {
    pub score: RegisterId,
    pub level: RegisterId,
    pub lines: RegisterId,
    /// Action captured this tick, `0` for none.
    pub selection: RegisterId,
}

/// A fully declared and wired scenario.
#[derive(Debug, Clone)]
pub struct CompiledScenario {
    pub graph: TriggerGraph,
    pub registers: RegisterBank,
    pub stats: StatRegisters,
    pub phases: PhaseNodes,
    pub objectives: Objectives,
    pub inputs: InputBank,
    pub reactions: Reactions,
    /// Wipe last tick's explosions, one per visible row.
    pub row_clears: RowTriggers,
    pub board: RenderDiffGraph,
    pub previews: PreviewGraph,
    /// Blow up cleared rows, one per visible row.
    pub row_explosions: RowTriggers,
    /// Shuffles sequence A at round start.
    pub round_start: ShuffleChain,
    /// Shuffles sequence B at round start, after `round_start`.
    pub round_start_second: ShuffleChain,
    /// Shuffles sequence B at a reshuffle point.
    pub reshuffle: ShuffleChain,
}

impl CompiledScenario {
    /// A fresh engine over a copy of the graph.
    pub fn engine(&self) -> Engine {
        Engine::new(self.graph.clone(), self.registers.clone())
    }

    /// All per-tick render triggers: row clears, board, previews, row
    /// explosions.
    pub fn render_triggers(&self) -> Vec<TriggerId> {
        self.row_clears
            .triggers()
            .chain(self.board.triggers())
            .chain(self.previews.triggers())
            .chain(self.row_explosions.triggers())
            .collect()
    }

    /// Every trigger group that must never have two members armed at once.
    pub fn exclusive_groups(&self) -> Vec<Vec<TriggerId>> {
        let mut groups = vec![
            self.phases.round_group().to_vec(),
            self.phases.body_group().to_vec(),
            self.inputs.triggers().collect(),
        ];
        for chain in [&self.round_start, &self.round_start_second, &self.reshuffle] {
            for tree in chain.trees() {
                for split in tree.splits() {
                    groups.push(vec![split.success, split.failure]);
                }
            }
        }
        groups
    }
}

// ---------------------------------------------------------------------------
// Compile pass
// ---------------------------------------------------------------------------

/// Declare every trigger of every component, then wire them, then verify
/// the exclusion groups and reachability.
pub fn compile<L>(config: &ScenarioConfig, layout: &L) -> Result<CompiledScenario, CompileError>
where
    L: ScenarioLayout + ?Sized,
{
    config.validate()?;
    info!(
        rows = config.board.rows,
        cols = config.board.cols,
        facings = config.facings.len(),
        "scenario_compile_start"
    );

    let mut registers = RegisterBank::new();
    let stats = StatRegisters {
        score: registers.declare("Score", config.stats.score)?,
        level: registers.declare("Level", config.stats.level)?,
        lines: registers.declare("Lines", config.stats.lines)?,
        selection: registers.declare("Selection", 0)?,
    };
    let sequence_a = SequenceBuffer::declare(&mut registers, "Sequence A", SEQUENCE_LEN)?;
    let sequence_b = SequenceBuffer::declare(&mut registers, "Sequence B", SEQUENCE_LEN)?;

    // Declaration order is evaluation order.
    let mut graph = TriggerGraph::new();
    let init = PhaseNodes::declare_init(&mut graph)?;
    let objectives = Objectives::declare(&mut graph, &config.objectives)?;
    let begin_round = PhaseNodes::declare_begin_round(&mut graph)?;
    let round_start = ShuffleChain::declare(&mut TreeBuilder::with_prefix("Init a"), &mut graph, sequence_a)?;
    let begin_round_middle = PhaseNodes::declare_begin_round_middle(&mut graph)?;
    let round_start_second = ShuffleChain::declare(
        &mut TreeBuilder::with_prefix("Init b"),
        &mut graph,
        sequence_b.clone(),
    )?;
    let game_loop = PhaseNodes::declare_game_loop(&mut graph)?;
    let inputs = InputBank::declare(&mut graph)?;
    let update = PhaseNodes::declare_update(&mut graph)?;
    let shuffle = PhaseNodes::declare_shuffle(&mut graph)?;
    let reshuffle = ShuffleChain::declare(&mut TreeBuilder::with_prefix("Reshuffle"), &mut graph, sequence_b)?;
    let region = config.board.visible_region();
    let row_clears = RowTriggers::declare(&mut graph, RowAction::Clear, region.rows.clone())?;
    let board = RenderDiffGraph::declare(
        &mut graph,
        &region.cells(),
        &config.facings,
        &Tetromino::ALL,
        layout,
        &config.visuals,
    )?;
    let previews = PreviewGraph::declare(&mut graph, config.next_previews, layout, &config.visuals)?;
    let row_explosions = RowTriggers::declare(&mut graph, RowAction::Explode, region.rows.clone())?;
    let mut reactions = Reactions::declare(&mut graph)?;
    let game_over = PhaseNodes::declare_game_over(&mut graph)?;
    reactions.declare_easter_egg(&mut graph)?;
    let cleanup = PhaseNodes::declare_cleanup(&mut graph)?;
    let begin_round_end = PhaseNodes::declare_begin_round_end(&mut graph)?;
    let phases = PhaseNodes {
        init,
        begin_round,
        begin_round_middle,
        game_loop,
        update,
        shuffle,
        game_over,
        cleanup,
        begin_round_end,
    };

    // Wiring.
    inputs.wire(&mut graph, stats.selection, |action| layout.hotkey(action))?;
    let parts = Scheduled {
        objectives: &objectives,
        round_start: &round_start,
        round_start_second: &round_start_second,
        reshuffle: &reshuffle,
        inputs: &inputs,
        row_clears: &row_clears,
        board: &board,
        previews: &previews,
        row_explosions: &row_explosions,
        reactions: &reactions,
        selection: stats.selection,
    };
    phases.wire(&mut graph, &parts, registers.reset_effects())?;

    let scenario = CompiledScenario {
        graph,
        registers,
        stats,
        phases,
        objectives,
        inputs,
        reactions,
        row_clears,
        board,
        previews,
        row_explosions,
        round_start,
        round_start_second,
        reshuffle,
    };

    for group in scenario.exclusive_groups() {
        if let Some(issue) = check_exclusive_group(&scenario.graph, &group).into_iter().next() {
            return Err(CompileError::Validation(issue));
        }
    }
    if let Some(issue) = undeclared_registers(&scenario.graph, &scenario.registers)
        .into_iter()
        .next()
    {
        return Err(CompileError::Validation(issue));
    }
    if let Some(&orphan) = unreachable_triggers(&scenario.graph).first() {
        return Err(CompileError::Validation(ValidationIssue::Unreachable(orphan)));
    }

    info!(
        triggers = scenario.graph.len(),
        registers = scenario.registers.len(),
        render_triggers = scenario.board.len(),
        row_triggers = scenario.row_clears.len() + scenario.row_explosions.len(),
        preview_triggers = scenario.previews.len(),
        "scenario_compiled"
    );
    Ok(scenario)
}
