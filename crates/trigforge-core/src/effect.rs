use serde::{Deserialize, Serialize};

use crate::id::{ObjectId, RegisterId, TriggerId, VisualId};
use crate::script::ScriptCall;

/// Direction of an activation edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Activate,
    Deactivate,
}

/// A mutation executed, in order, when a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    SetRegister { register: RegisterId, value: i32 },
    Activate(TriggerId),
    Deactivate(TriggerId),
    ReplaceObject { object: ObjectId, visual: VisualId },
    Script(ScriptCall),
}

impl Effect {
    pub fn script(function: &str, args: impl Into<Vec<i32>>) -> Self {
        Effect::Script(ScriptCall::new(function, args))
    }

    /// The trigger this effect toggles, if it is an edge.
    pub fn target(&self) -> Option<(EdgeKind, TriggerId)> {
        match *self {
            Effect::Activate(t) => Some((EdgeKind::Activate, t)),
            Effect::Deactivate(t) => Some((EdgeKind::Deactivate, t)),
            _ => None,
        }
    }

    pub fn as_script(&self) -> Option<&ScriptCall> {
        match self {
            Effect::Script(call) => Some(call),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_toggles_have_targets() {
        let t = TriggerId::default();
        assert_eq!(Effect::Activate(t).target(), Some((EdgeKind::Activate, t)));
        assert_eq!(Effect::Deactivate(t).target(), Some((EdgeKind::Deactivate, t)));
        assert_eq!(Effect::script("update", []).target(), None);
        assert_eq!(
            Effect::SetRegister { register: RegisterId(0), value: 1 }.target(),
            None
        );
    }
}
