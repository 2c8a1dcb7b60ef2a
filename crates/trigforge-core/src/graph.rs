use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

use slotmap::SlotMap;

use crate::condition::Condition;
use crate::effect::{EdgeKind, Effect};
use crate::id::{TriggerId, TriggerSlot};
use crate::trigger::{Objective, RearmMode, Trigger, TriggerKind, TriggerSpec};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Topology errors. All of them are raised at wiring time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("trigger {0:?} is not declared in this graph")]
    UnknownTrigger(TriggerId),
    #[error("trigger '{from}' references undeclared trigger {target:?}")]
    DanglingReference { from: String, target: TriggerId },
    #[error("a trigger named '{0}' is already declared")]
    DuplicateName(String),
}

/// One activation/deactivation relation between two triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: TriggerId,
    pub to: TriggerId,
    pub kind: EdgeKind,
}

// ---------------------------------------------------------------------------
// TriggerGraph
// ---------------------------------------------------------------------------

/// Append-only registry of triggers.
///
/// Declaration order is preserved and is the order the substrate evaluates
/// triggers in. There is no removal: handles stay valid for the lifetime of
/// the graph. The topology is not stored separately; it is the
/// [`Effect::Activate`]/[`Effect::Deactivate`] relation, exposed through
/// [`TriggerGraph::edges`].
///
/// Every graph carries a process-unique tag stamped into the handles it
/// issues. A clone keeps the tag, so handles stay valid across clones.
#[derive(Debug, Clone)]
pub struct TriggerGraph {
    tag: u32,
    triggers: SlotMap<TriggerSlot, Trigger>,
    order: Vec<TriggerId>,
    by_name: HashMap<String, TriggerId>,
}

// Tag 0 is reserved for `TriggerId::default()`.
static NEXT_GRAPH_TAG: AtomicU32 = AtomicU32::new(1);

impl Default for TriggerGraph {
    fn default() -> Self {
        Self {
            tag: NEXT_GRAPH_TAG.fetch_add(1, Ordering::Relaxed),
            triggers: SlotMap::with_key(),
            order: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl TriggerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The arena slot of `id`, if this graph issued it.
    fn slot(&self, id: TriggerId) -> Option<TriggerSlot> {
        (id.graph == self.tag && self.triggers.contains_key(id.slot)).then_some(id.slot)
    }

    fn resolve(&self, id: TriggerId) -> Option<&Trigger> {
        self.slot(id).and_then(|slot| self.triggers.get(slot))
    }

    fn resolve_mut(&mut self, id: TriggerId) -> Option<&mut Trigger> {
        let slot = self.slot(id)?;
        self.triggers.get_mut(slot)
    }

    // -----------------------------------------------------------------------
    // Declaration
    // -----------------------------------------------------------------------

    /// Declare a logic trigger with no conditions or effects yet.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        spec: TriggerSpec,
    ) -> Result<TriggerId, GraphError> {
        self.insert(name.into(), TriggerKind::Logic, spec.rearm, spec.enabled)
    }

    /// Declare a display-only objective trigger.
    pub fn declare_objective(
        &mut self,
        name: impl Into<String>,
        objective: Objective,
        enabled: bool,
    ) -> Result<TriggerId, GraphError> {
        self.insert(
            name.into(),
            TriggerKind::Objective(objective),
            RearmMode::OneShot,
            enabled,
        )
    }

    fn insert(
        &mut self,
        name: String,
        kind: TriggerKind,
        rearm: RearmMode,
        initially_enabled: bool,
    ) -> Result<TriggerId, GraphError> {
        if self.by_name.contains_key(&name) {
            return Err(GraphError::DuplicateName(name));
        }
        let index = self.order.len();
        let slot = self.triggers.insert(Trigger {
            name: name.clone(),
            kind,
            rearm,
            initially_enabled,
            index,
            conditions: Vec::new(),
            effects: Vec::new(),
        });
        let id = TriggerId {
            slot,
            graph: self.tag,
        };
        self.order.push(id);
        self.by_name.insert(name, id);
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Wiring
    // -----------------------------------------------------------------------

    pub fn add_condition(&mut self, id: TriggerId, condition: Condition) -> Result<(), GraphError> {
        self.resolve_mut(id)
            .ok_or(GraphError::UnknownTrigger(id))?
            .conditions
            .push(condition);
        Ok(())
    }

    /// Append an effect. Edge effects must target a declared trigger.
    pub fn add_effect(&mut self, id: TriggerId, effect: Effect) -> Result<(), GraphError> {
        if let Some((_, target)) = effect.target() {
            if !self.contains(target) {
                let from = self
                    .resolve(id)
                    .map(|t| t.name.clone())
                    .ok_or(GraphError::UnknownTrigger(id))?;
                return Err(GraphError::DanglingReference { from, target });
            }
        }
        self.resolve_mut(id)
            .ok_or(GraphError::UnknownTrigger(id))?
            .effects
            .push(effect);
        Ok(())
    }

    pub fn add_effects(
        &mut self,
        id: TriggerId,
        effects: impl IntoIterator<Item = Effect>,
    ) -> Result<(), GraphError> {
        for effect in effects {
            self.add_effect(id, effect)?;
        }
        Ok(())
    }

    /// `from` enables `to` when it fires.
    pub fn activate(&mut self, from: TriggerId, to: TriggerId) -> Result<(), GraphError> {
        self.add_effect(from, Effect::Activate(to))
    }

    /// `from` disables `to` when it fires.
    pub fn deactivate(&mut self, from: TriggerId, to: TriggerId) -> Result<(), GraphError> {
        self.add_effect(from, Effect::Deactivate(to))
    }

    /// Wire a mutual-exclusion group: for every ordered pair `(a, b)` with
    /// `a != b`, `a` deactivates `b`. Whichever member fires first leaves the
    /// rest disarmed.
    pub fn mutually_exclusive(&mut self, group: &[TriggerId]) -> Result<(), GraphError> {
        for &id in group {
            if !self.contains(id) {
                return Err(GraphError::UnknownTrigger(id));
            }
        }
        for &from in group {
            for &to in group {
                if from != to {
                    self.deactivate(from, to)?;
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.resolve(id)
    }

    pub fn trigger(&self, id: TriggerId) -> Result<&Trigger, GraphError> {
        self.resolve(id).ok_or(GraphError::UnknownTrigger(id))
    }

    pub fn conditions(&self, id: TriggerId) -> Result<&[Condition], GraphError> {
        self.trigger(id).map(Trigger::conditions)
    }

    pub fn effects(&self, id: TriggerId) -> Result<&[Effect], GraphError> {
        self.trigger(id).map(Trigger::effects)
    }

    pub fn contains(&self, id: TriggerId) -> bool {
        self.slot(id).is_some()
    }

    pub fn lookup(&self, name: &str) -> Option<TriggerId> {
        self.by_name.get(name).copied()
    }

    /// Name for logging; unknown handles render as `<unknown>`.
    pub fn name(&self, id: TriggerId) -> &str {
        self.resolve(id).map_or("<unknown>", |t| t.name.as_str())
    }

    /// All triggers in declaration order.
    pub fn order(&self) -> &[TriggerId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (TriggerId, &Trigger)> + '_ {
        self.order.iter().map(|&id| (id, &self.triggers[id.slot]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The activation/deactivation relation, in declaration then effect order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.iter().flat_map(|(from, trigger)| {
            trigger
                .effects
                .iter()
                .filter_map(move |e| e.target().map(|(kind, to)| Edge { from, to, kind }))
        })
    }

    /// Triggers `id` toggles with the given edge kind, deduplicated.
    pub fn successors(&self, id: TriggerId, kind: EdgeKind) -> Vec<TriggerId> {
        let mut out = Vec::new();
        if let Some(trigger) = self.resolve(id) {
            for (k, to) in trigger.effects.iter().filter_map(Effect::target) {
                if k == kind && !out.contains(&to) {
                    out.push(to);
                }
            }
        }
        out
    }

    /// Triggers that activate `id`.
    pub fn activators_of(&self, id: TriggerId) -> Vec<TriggerId> {
        let mut out = Vec::new();
        for edge in self.edges() {
            if edge.kind == EdgeKind::Activate && edge.to == id && !out.contains(&edge.from) {
                out.push(edge.from);
            }
        }
        out
    }

    /// Whether `from` has an edge of `kind` to `to`.
    pub fn has_edge(&self, from: TriggerId, to: TriggerId, kind: EdgeKind) -> bool {
        self.resolve(from).is_some_and(|t| {
            t.effects
                .iter()
                .filter_map(Effect::target)
                .any(|(k, target)| k == kind && target == to)
        })
    }

    /// Every trigger reachable from `roots` through activation edges,
    /// roots included.
    pub fn reachable_from(&self, roots: &[TriggerId]) -> HashSet<TriggerId> {
        let mut seen: HashSet<TriggerId> = HashSet::new();
        let mut queue: VecDeque<TriggerId> = VecDeque::new();
        for &root in roots {
            if self.contains(root) && seen.insert(root) {
                queue.push_back(root);
            }
        }
        while let Some(id) = queue.pop_front() {
            for next in self.successors(id, EdgeKind::Activate) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    /// Triggers enabled at declaration.
    pub fn initially_enabled(&self) -> Vec<TriggerId> {
        self.iter()
            .filter(|(_, t)| t.initially_enabled)
            .map(|(id, _)| id)
            .collect()
    }
}
