use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Storage slot of a trigger inside one graph's arena.
    pub struct TriggerSlot;
}

/// Identifies a trigger (automaton node) in a [`crate::graph::TriggerGraph`].
///
/// Carries the tag of the graph that issued it, so a handle from one graph
/// never resolves in another even when the arena slots coincide. The default
/// value belongs to no graph.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TriggerId {
    pub(crate) slot: TriggerSlot,
    pub(crate) graph: u32,
}

/// Identifies a register in a [`crate::register::RegisterBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegisterId(pub u16);

impl RegisterId {
    /// Script calls carry registers as plain integer arguments.
    pub fn as_arg(self) -> i32 {
        i32::from(self.0)
    }

    /// Recover a register handle from a script argument.
    pub fn from_arg(arg: i32) -> Option<Self> {
        u16::try_from(arg).ok().map(Self)
    }
}

/// Identifies an external object (map prop) the substrate can mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Identifies the visual an object is replaced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VisualId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_arg_round_trips() {
        let r = RegisterId(17);
        assert_eq!(RegisterId::from_arg(r.as_arg()), Some(r));
    }

    #[test]
    fn register_from_negative_arg_is_none() {
        assert_eq!(RegisterId::from_arg(-1), None);
        assert_eq!(RegisterId::from_arg(70_000), None);
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ObjectId(3), VisualId(9));
        assert_eq!(map[&ObjectId(3)], VisualId(9));
    }
}
