use std::collections::HashMap;

use trigforge_core::condition::Condition;
use trigforge_core::effect::Effect;
use trigforge_core::graph::TriggerGraph;
use trigforge_core::id::TriggerId;
use trigforge_core::script::ScriptCall;
use trigforge_core::trigger::TriggerSpec;
use tracing::debug;

use crate::RenderError;
use crate::grid::{Cell, GridGeometry, PieceVisuals};
use crate::piece::{Facing, Occupant, Tetromino};

/// Ground-truth predicate. Arguments: `[row, col, facing, occupant]`.
pub const IS_RENDER_STATE: &str = "isRenderState";

/// One (cell, facing, occupant) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderKey {
    pub cell: Cell,
    pub facing: Facing,
    pub occupant: Occupant,
}

impl RenderKey {
    pub fn predicate(&self) -> ScriptCall {
        ScriptCall::new(
            IS_RENDER_STATE,
            [
                self.cell.row as i32,
                self.cell.col as i32,
                self.facing.code(),
                self.occupant.code(),
            ],
        )
    }

    /// Inverse of [`RenderKey::predicate`].
    pub fn from_predicate(call: &ScriptCall) -> Option<RenderKey> {
        if !call.is(IS_RENDER_STATE) {
            return None;
        }
        let [row, col, facing, occupant] = call.args[..] else {
            return None;
        };
        Some(RenderKey {
            cell: Cell::new(u32::try_from(row).ok()?, u32::try_from(col).ok()?),
            facing: Facing::ALL.into_iter().find(|f| f.code() == facing)?,
            occupant: Occupant::from_code(occupant).ok()?,
        })
    }
}

/// The enumerated render triggers for a set of cells.
///
/// Every trigger is one-shot, starts disabled, carries exactly one
/// condition (the ground-truth predicate) and exactly one effect (replace
/// the placeholder). Arming and disarming is left to the scheduler via
/// [`RenderDiffGraph::activation_effects`] and
/// [`RenderDiffGraph::deactivation_effects`].
#[derive(Debug, Clone, Default)]
pub struct RenderDiffGraph {
    nodes: Vec<(RenderKey, TriggerId)>,
    index: HashMap<RenderKey, TriggerId>,
}

impl RenderDiffGraph {
    /// Declare and wire one trigger per (cell, facing, occupant), where the
    /// occupant axis is empty plus `pieces`.
    pub fn declare<G>(
        graph: &mut TriggerGraph,
        cells: &[Cell],
        facings: &[Facing],
        pieces: &[Tetromino],
        geometry: &G,
        visuals: &PieceVisuals,
    ) -> Result<Self, RenderError>
    where
        G: GridGeometry + ?Sized,
    {
        let occupants: Vec<Occupant> = std::iter::once(Occupant::Empty)
            .chain(pieces.iter().copied().map(Occupant::Piece))
            .collect();
        let mut out = RenderDiffGraph::default();
        for &cell in cells {
            for &facing in facings {
                let object = geometry
                    .placeholder(cell, facing)
                    .ok_or(RenderError::MissingPlaceholder { cell, facing })?;
                for &occupant in &occupants {
                    let key = RenderKey { cell, facing, occupant };
                    let name = format!("Render r{} c{} {} {}", cell.row, cell.col, facing, occupant);
                    let id = graph.declare(name, TriggerSpec::ONE_SHOT)?;
                    graph.add_condition(id, Condition::Script(key.predicate()))?;
                    graph.add_effect(
                        id,
                        Effect::ReplaceObject {
                            object,
                            visual: visuals.visual(occupant),
                        },
                    )?;
                    out.nodes.push((key, id));
                    out.index.insert(key, id);
                }
            }
        }
        debug!(
            cells = cells.len(),
            facings = facings.len(),
            occupants = occupants.len(),
            triggers = out.nodes.len(),
            "render_diff_declared"
        );
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, cell: Cell, facing: Facing, occupant: Occupant) -> Option<TriggerId> {
        self.index.get(&RenderKey { cell, facing, occupant }).copied()
    }

    pub fn nodes(&self) -> &[(RenderKey, TriggerId)] {
        &self.nodes
    }

    pub fn triggers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.nodes.iter().map(|&(_, id)| id)
    }

    /// Triggers competing for one (cell, facing).
    pub fn competing(&self, cell: Cell, facing: Facing) -> Vec<TriggerId> {
        self.nodes
            .iter()
            .filter(|(k, _)| k.cell == cell && k.facing == facing)
            .map(|&(_, id)| id)
            .collect()
    }

    pub fn activation_effects(&self) -> Vec<Effect> {
        self.triggers().map(Effect::Activate).collect()
    }

    pub fn deactivation_effects(&self) -> Vec<Effect> {
        self.triggers().map(Effect::Deactivate).collect()
    }
}

/// The true board state, answering `isRenderState` predicates.
///
/// A (cell, facing) holds a single occupant, so at most one predicate per
/// pair can be true at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruth {
    occupants: HashMap<(Cell, Facing), Occupant>,
}

impl GroundTruth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, cell: Cell, facing: Facing, occupant: Occupant) {
        self.occupants.insert((cell, facing), occupant);
    }

    /// Unset pairs read as empty.
    pub fn get(&self, cell: Cell, facing: Facing) -> Occupant {
        self.occupants
            .get(&(cell, facing))
            .copied()
            .unwrap_or(Occupant::Empty)
    }

    /// `Some(answer)` for `isRenderState` calls, `None` for anything else.
    pub fn evaluate(&self, call: &ScriptCall) -> Option<bool> {
        RenderKey::from_predicate(call).map(|key| self.get(key.cell, key.facing) == key.occupant)
    }
}
