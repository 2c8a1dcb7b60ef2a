//! Shared helpers for tests across the workspace.

use std::collections::{HashMap, HashSet};

use crate::chance::{CoinFlip, ScriptedFlips};
use crate::graph::TriggerGraph;
use crate::host::ScriptHost;
use crate::id::{ObjectId, RegisterId, TriggerId, VisualId};
use crate::register::RegisterBank;
use crate::script::{SWAP_SLOTS, ScriptCall};
use crate::trigger::TriggerSpec;

/// A host driven by a predicate table that records every call it receives.
///
/// Predicates are looked up by exact call first, then by function name;
/// anything unset is false. `swapSlots` calls swap the two registers.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    exact: HashMap<ScriptCall, bool>,
    by_function: HashMap<String, bool>,
    selected: HashSet<ObjectId>,
    pub invoked: Vec<ScriptCall>,
    pub replaced: Vec<(ObjectId, VisualId)>,
    pub visuals: HashMap<ObjectId, VisualId>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_call(&mut self, call: ScriptCall, value: bool) -> &mut Self {
        self.exact.insert(call, value);
        self
    }

    pub fn set_function(&mut self, function: &str, value: bool) -> &mut Self {
        self.by_function.insert(function.to_string(), value);
        self
    }

    pub fn clear_predicates(&mut self) {
        self.exact.clear();
        self.by_function.clear();
    }

    pub fn select(&mut self, object: ObjectId) {
        self.selected.insert(object);
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn calls_to<'a>(&'a self, function: &'a str) -> impl Iterator<Item = &'a ScriptCall> + 'a {
        self.invoked.iter().filter(move |c| c.is(function))
    }

    pub fn take_invoked(&mut self) -> Vec<ScriptCall> {
        std::mem::take(&mut self.invoked)
    }
}

impl ScriptHost for RecordingHost {
    fn evaluate(&mut self, call: &ScriptCall, _registers: &RegisterBank) -> bool {
        self.exact
            .get(call)
            .or_else(|| self.by_function.get(&call.function))
            .copied()
            .unwrap_or(false)
    }

    fn invoke(&mut self, call: &ScriptCall, registers: &mut RegisterBank) {
        if call.is(SWAP_SLOTS) {
            if let [a, b] = call.args[..] {
                if let (Some(a), Some(b)) = (RegisterId::from_arg(a), RegisterId::from_arg(b)) {
                    let _ = registers.swap(a, b);
                }
            }
        }
        self.invoked.push(call.clone());
    }

    fn is_selected(&mut self, object: ObjectId) -> bool {
        self.selected.contains(&object)
    }

    fn replace_object(&mut self, object: ObjectId, visual: VisualId) {
        self.replaced.push((object, visual));
        self.visuals.insert(object, visual);
    }
}

pub fn flips(outcomes: &[CoinFlip]) -> ScriptedFlips {
    ScriptedFlips::new(outcomes.iter().copied())
}

/// Every flip succeeds.
pub fn always_success(count: usize) -> ScriptedFlips {
    ScriptedFlips::new(std::iter::repeat_n(CoinFlip::Success, count))
}

pub fn one_shot(graph: &mut TriggerGraph, name: &str) -> TriggerId {
    graph
        .declare(name, TriggerSpec::ONE_SHOT)
        .unwrap_or_else(|e| panic!("declare {name}: {e}"))
}

pub fn armed(graph: &mut TriggerGraph, name: &str) -> TriggerId {
    graph
        .declare(name, TriggerSpec::ONE_SHOT.enabled())
        .unwrap_or_else(|e| panic!("declare {name}: {e}"))
}

pub fn looping(graph: &mut TriggerGraph, name: &str) -> TriggerId {
    graph
        .declare(name, TriggerSpec::LOOPING.enabled())
        .unwrap_or_else(|e| panic!("declare {name}: {e}"))
}
