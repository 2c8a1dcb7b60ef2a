//! Per-tick record of what the engine did.
//!
//! Only observable changes are recorded: toggling a flag that already has
//! the requested value produces no event.

use crate::fixed::Ticks;
use crate::id::{ObjectId, RegisterId, TriggerId, VisualId};
use crate::script::ScriptCall;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    Fired {
        trigger: TriggerId,
    },
    Enabled {
        by: TriggerId,
        trigger: TriggerId,
    },
    Disabled {
        by: TriggerId,
        trigger: TriggerId,
    },
    RegisterWritten {
        by: TriggerId,
        register: RegisterId,
        value: i32,
    },
    ObjectReplaced {
        by: TriggerId,
        object: ObjectId,
        visual: VisualId,
    },
    ScriptInvoked {
        by: TriggerId,
        call: ScriptCall,
    },
    /// Two triggers wrote the same register this tick without one having
    /// been activated (directly or transitively) by the other.
    WriteConflict {
        register: RegisterId,
        first: TriggerId,
        second: TriggerId,
    },
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: Ticks,
    /// Triggers that fired, in firing order.
    pub fired: Vec<TriggerId>,
    pub events: Vec<TickEvent>,
    /// Chance conditions evaluated.
    pub flips: usize,
    /// State hash after the tick.
    pub state_hash: u64,
}

impl TickReport {
    pub fn new(tick: Ticks) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub fn did_fire(&self, trigger: TriggerId) -> bool {
        self.fired.contains(&trigger)
    }

    pub fn script_calls(&self) -> impl Iterator<Item = &ScriptCall> + '_ {
        self.events.iter().filter_map(|e| match e {
            TickEvent::ScriptInvoked { call, .. } => Some(call),
            _ => None,
        })
    }

    pub fn replacements(&self) -> impl Iterator<Item = (ObjectId, VisualId)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            TickEvent::ObjectReplaced { object, visual, .. } => Some((object, visual)),
            _ => None,
        })
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &TickEvent> + '_ {
        self.events
            .iter()
            .filter(|e| matches!(e, TickEvent::WriteConflict { .. }))
    }

    /// No trigger fired.
    pub fn is_quiet(&self) -> bool {
        self.fired.is_empty()
    }

    /// Events other than the `Fired` markers: the tick's observable changes.
    pub fn changes(&self) -> impl Iterator<Item = &TickEvent> + '_ {
        self.events
            .iter()
            .filter(|e| !matches!(e, TickEvent::Fired { .. }))
    }
}
