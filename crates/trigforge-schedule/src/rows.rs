use std::ops::Range;

use trigforge_core::condition::Condition;
use trigforge_core::effect::Effect;
use trigforge_core::graph::{GraphError, TriggerGraph};
use trigforge_core::id::TriggerId;
use trigforge_core::trigger::TriggerSpec;

/// Whether row `[row]` still shows an explosion from an earlier tick.
pub const IS_ROW_EXPLODED: &str = "isRowExploded";
/// Removes the explosion shown on row `[row]`.
pub const CLEAR_EXPLOSION: &str = "clearExplosion";
/// Whether the step function cleared row `[row]` this tick.
pub const IS_ROW_CLEARED: &str = "isRowCleared";
/// Plays the explosion for row `[row]`.
pub const EXPLODE_ROW: &str = "explodeRow";

/// What a row trigger does to its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    /// Wipes a leftover explosion. Declared ahead of the board diff so the
    /// board renders over a clean row.
    Clear,
    /// Shows a cleared row blowing up. Declared after the previews.
    Explode,
}

impl RowAction {
    fn label(self) -> &'static str {
        match self {
            RowAction::Clear => "Clear Row",
            RowAction::Explode => "Explode Row",
        }
    }

    fn calls(self) -> (&'static str, &'static str) {
        match self {
            RowAction::Clear => (IS_ROW_EXPLODED, CLEAR_EXPLOSION),
            RowAction::Explode => (IS_ROW_CLEARED, EXPLODE_ROW),
        }
    }
}

/// One guarded one-shot trigger per visible row.
#[derive(Debug, Clone, Default)]
pub struct RowTriggers {
    nodes: Vec<(u32, TriggerId)>,
}

impl RowTriggers {
    /// Declare and wire `"<label> <row>"` for every row in `rows`. The
    /// guard and the effect both take the row index as their only argument.
    pub fn declare(
        graph: &mut TriggerGraph,
        action: RowAction,
        rows: Range<u32>,
    ) -> Result<Self, GraphError> {
        let (guard, effect) = action.calls();
        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let arg = row as i32;
            let id = graph.declare(format!("{} {row}", action.label()), TriggerSpec::ONE_SHOT)?;
            graph.add_condition(id, Condition::script(guard, [arg]))?;
            graph.add_effect(id, Effect::script(effect, [arg]))?;
            nodes.push((row, id));
        }
        Ok(Self { nodes })
    }

    pub fn node(&self, row: u32) -> Option<TriggerId> {
        self.nodes.iter().find(|(r, _)| *r == row).map(|&(_, id)| id)
    }

    pub fn triggers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.nodes.iter().map(|&(_, id)| id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
