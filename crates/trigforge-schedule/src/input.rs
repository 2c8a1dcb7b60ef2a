use std::fmt;

use serde::{Deserialize, Serialize};
use trigforge_core::condition::Condition;
use trigforge_core::effect::Effect;
use trigforge_core::graph::{GraphError, TriggerGraph};
use trigforge_core::id::{ObjectId, RegisterId, TriggerId};
use trigforge_core::trigger::TriggerSpec;

/// Acknowledges a captured input. Arguments: `[action code]`.
pub const ACKNOWLEDGE_INPUT: &str = "acknowledgeInput";

/// Player actions, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateClockwise,
    RotateCounterclockwise,
    SoftDrop,
    HardDrop,
    Hold,
    NewGame,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::RotateClockwise,
        Action::RotateCounterclockwise,
        Action::SoftDrop,
        Action::HardDrop,
        Action::Hold,
        Action::NewGame,
    ];

    /// Value written to the selection register. `0` means no input.
    pub fn code(self) -> i32 {
        match self {
            Action::MoveLeft => 1,
            Action::MoveRight => 2,
            Action::RotateClockwise => 3,
            Action::RotateCounterclockwise => 4,
            Action::SoftDrop => 5,
            Action::HardDrop => 6,
            Action::Hold => 7,
            Action::NewGame => 8,
        }
    }

    pub fn from_code(code: i32) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.code() == code)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::MoveLeft => "Move Left",
            Action::MoveRight => "Move Right",
            Action::RotateClockwise => "Rotate Clockwise",
            Action::RotateCounterclockwise => "Rotate Counterclockwise",
            Action::SoftDrop => "Soft Drop",
            Action::HardDrop => "Hard Drop",
            Action::Hold => "Hold",
            Action::NewGame => "New Game",
        };
        f.write_str(s)
    }
}

/// Mutually exclusive input-capture triggers, one per [`Action`].
///
/// Declared in priority order, so when several hotkeys are selected in the
/// same tick the highest-priority one fires first and disarms the rest.
#[derive(Debug, Clone, Default)]
pub struct InputBank {
    nodes: Vec<(Action, TriggerId)>,
}

impl InputBank {
    pub fn declare(graph: &mut TriggerGraph) -> Result<Self, GraphError> {
        let mut nodes = Vec::with_capacity(Action::ALL.len());
        for action in Action::ALL {
            let id = graph.declare(format!("Select {action}"), TriggerSpec::ONE_SHOT)?;
            nodes.push((action, id));
        }
        Ok(Self { nodes })
    }

    /// Exclusion first, then per action: guard on the hotkey, record the
    /// action in `selection`, acknowledge it.
    pub fn wire<F>(&self, graph: &mut TriggerGraph, selection: RegisterId, hotkey: F) -> Result<(), InputError>
    where
        F: Fn(Action) -> Option<ObjectId>,
    {
        graph.mutually_exclusive(&self.triggers().collect::<Vec<_>>())?;
        for &(action, id) in &self.nodes {
            let object = hotkey(action).ok_or(InputError::MissingHotkey(action))?;
            graph.add_condition(id, Condition::ObjectSelected(object))?;
            graph.add_effect(id, Effect::SetRegister { register: selection, value: action.code() })?;
            graph.add_effect(id, Effect::script(ACKNOWLEDGE_INPUT, [action.code()]))?;
        }
        Ok(())
    }

    pub fn node(&self, action: Action) -> Option<TriggerId> {
        self.nodes.iter().find(|(a, _)| *a == action).map(|&(_, id)| id)
    }

    pub fn nodes(&self) -> &[(Action, TriggerId)] {
        &self.nodes
    }

    pub fn triggers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.nodes.iter().map(|&(_, id)| id)
    }

    pub fn activation_effects(&self) -> Vec<Effect> {
        self.triggers().map(Effect::Activate).collect()
    }

    pub fn deactivation_effects(&self) -> Vec<Effect> {
        self.triggers().map(Effect::Deactivate).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("no hotkey object for action '{0}'")]
    MissingHotkey(Action),
    #[error(transparent)]
    Graph(#[from] GraphError),
}
