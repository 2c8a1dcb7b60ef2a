use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::chance::ChanceSource;
use crate::condition::Condition;
use crate::effect::Effect;
use crate::event::{TickEvent, TickReport};
use crate::fixed::Ticks;
use crate::graph::{GraphError, TriggerGraph};
use crate::hash::StateHash;
use crate::host::ScriptHost;
use crate::id::{RegisterId, TriggerId};
use crate::register::RegisterBank;
use crate::trigger::{Objective, RearmMode};

/// Reference interpreter for a frozen [`TriggerGraph`].
///
/// The graph is immutable once handed to the engine; runtime state is the
/// per-trigger enabled flag keyed by [`TriggerId`], the
/// register bank, and the tick counter.
#[derive(Debug, Clone)]
pub struct Engine {
    graph: TriggerGraph,
    state: RuntimeState,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeState {
    pub(crate) enabled: HashMap<TriggerId, bool>,
    pub(crate) registers: RegisterBank,
    pub(crate) tick: Ticks,
    pub(crate) last_state_hash: u64,
}

/// Activation provenance within one tick, used to order register writes.
#[derive(Debug, Default)]
struct Causality {
    /// Every trigger that activated the key this tick, in firing order.
    activated_by: HashMap<TriggerId, Vec<TriggerId>>,
    writers: HashMap<RegisterId, TriggerId>,
}

impl Causality {
    /// Whether `ancestor` activated `id` this tick, directly or transitively,
    /// through any of its activators.
    fn descends_from(&self, id: TriggerId, ancestor: TriggerId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            for &parent in self.activated_by.get(&current).into_iter().flatten() {
                if parent == ancestor {
                    return true;
                }
                stack.push(parent);
            }
        }
        false
    }
}

impl Engine {
    pub fn new(graph: TriggerGraph, registers: RegisterBank) -> Self {
        let mut enabled = HashMap::with_capacity(graph.len());
        for (id, trigger) in graph.iter() {
            enabled.insert(id, trigger.initially_enabled);
        }
        let mut engine = Self {
            graph,
            state: RuntimeState {
                enabled,
                registers,
                tick: 0,
                last_state_hash: 0,
            },
        };
        engine.state.last_state_hash = engine.compute_state_hash();
        engine
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn graph(&self) -> &TriggerGraph {
        &self.graph
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.state.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterBank {
        &mut self.state.registers
    }

    pub fn tick(&self) -> Ticks {
        self.state.tick
    }

    pub fn state_hash(&self) -> u64 {
        self.state.last_state_hash
    }

    pub fn is_enabled(&self, id: TriggerId) -> bool {
        self.state.enabled.get(&id).copied().unwrap_or(false)
    }

    pub fn enable(&mut self, id: TriggerId) -> Result<(), GraphError> {
        self.set_enabled(id, true)
    }

    pub fn disable(&mut self, id: TriggerId) -> Result<(), GraphError> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&mut self, id: TriggerId, value: bool) -> Result<(), GraphError> {
        let flag = self
            .state
            .enabled
            .get_mut(&id)
            .ok_or(GraphError::UnknownTrigger(id))?;
        *flag = value;
        Ok(())
    }

    /// Enabled triggers in declaration order.
    pub fn enabled_triggers(&self) -> Vec<TriggerId> {
        self.graph
            .order()
            .iter()
            .copied()
            .filter(|&id| self.is_enabled(id))
            .collect()
    }

    /// Enabled objectives sorted by display order.
    pub fn visible_objectives(&self) -> Vec<(TriggerId, &Objective)> {
        let mut out: Vec<_> = self
            .graph
            .iter()
            .filter(|&(id, _)| self.is_enabled(id))
            .filter_map(|(id, t)| t.objective().map(|o| (id, o)))
            .collect();
        out.sort_by_key(|(_, o)| o.order);
        out
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance one tick: visit every trigger once in declaration order.
    pub fn step<H, C>(&mut self, host: &mut H, chance: &mut C) -> TickReport
    where
        H: ScriptHost + ?Sized,
        C: ChanceSource + ?Sized,
    {
        let mut report = TickReport::new(self.state.tick);
        let mut causes = Causality::default();
        for &id in self.graph.order() {
            self.state
                .visit(&self.graph, id, false, host, chance, &mut causes, &mut report);
        }
        self.state.tick += 1;
        self.state.last_state_hash = self.compute_state_hash();
        report.state_hash = self.state.last_state_hash;
        debug!(
            tick = report.tick,
            fired = report.fired.len(),
            flips = report.flips,
            "trigger_tick"
        );
        report
    }

    /// Run `ticks` steps and return every report.
    pub fn run<H, C>(&mut self, ticks: u64, host: &mut H, chance: &mut C) -> Vec<TickReport>
    where
        H: ScriptHost + ?Sized,
        C: ChanceSource + ?Sized,
    {
        (0..ticks).map(|_| self.step(host, chance)).collect()
    }

    /// Fire one trigger out of band, ignoring its enabled flag but honoring
    /// its conditions and re-arm mode. The tick counter does not advance.
    pub fn fire_now<H, C>(
        &mut self,
        id: TriggerId,
        host: &mut H,
        chance: &mut C,
    ) -> Result<TickReport, GraphError>
    where
        H: ScriptHost + ?Sized,
        C: ChanceSource + ?Sized,
    {
        self.graph.trigger(id)?;
        let mut report = TickReport::new(self.state.tick);
        let mut causes = Causality::default();
        self.state
            .visit(&self.graph, id, true, host, chance, &mut causes, &mut report);
        self.state.last_state_hash = self.compute_state_hash();
        report.state_hash = self.state.last_state_hash;
        Ok(report)
    }

    pub(crate) fn state_mut(&mut self) -> &mut RuntimeState {
        &mut self.state
    }

    /// Hash of tick, enabled flags (declaration order) and register values.
    pub fn compute_state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.state.tick);
        for &id in self.graph.order() {
            hasher.write_bool(self.is_enabled(id));
        }
        for &value in self.state.registers.values() {
            hasher.write_i32(value);
        }
        hasher.finish()
    }
}

impl RuntimeState {
    #[allow(clippy::too_many_arguments)]
    fn visit<H, C>(
        &mut self,
        graph: &TriggerGraph,
        id: TriggerId,
        forced: bool,
        host: &mut H,
        chance: &mut C,
        causes: &mut Causality,
        report: &mut TickReport,
    ) where
        H: ScriptHost + ?Sized,
        C: ChanceSource + ?Sized,
    {
        let Some(trigger) = graph.get(id) else {
            return;
        };
        if trigger.is_objective() {
            return;
        }
        if !forced && !self.enabled.get(&id).copied().unwrap_or(false) {
            return;
        }

        for condition in trigger.conditions() {
            let holds = match condition {
                Condition::Chance(percent) => {
                    report.flips += 1;
                    chance.flip(*percent).is_success()
                }
                Condition::Script(call) => host.evaluate(call, &self.registers),
                Condition::ObjectSelected(object) => host.is_selected(*object),
                Condition::RegisterEquals { register, value } => {
                    self.registers.get(*register) == Some(*value)
                }
            };
            if !holds {
                return;
            }
        }

        if trigger.rearm == RearmMode::OneShot {
            if let Some(flag) = self.enabled.get_mut(&id) {
                *flag = false;
            }
        }
        trace!(trigger = %trigger.name, tick = report.tick, "trigger_fired");
        report.fired.push(id);
        report.events.push(TickEvent::Fired { trigger: id });

        for effect in trigger.effects() {
            match effect {
                Effect::SetRegister { register, value } => {
                    if let Some(&first) = causes.writers.get(register) {
                        if first != id && !causes.descends_from(id, first) {
                            warn!(
                                register = register.0,
                                first = %graph.name(first),
                                second = %trigger.name,
                                "unordered_register_write"
                            );
                            report.events.push(TickEvent::WriteConflict {
                                register: *register,
                                first,
                                second: id,
                            });
                        }
                    }
                    causes.writers.insert(*register, id);
                    match self.registers.set(*register, *value) {
                        Ok(()) => report.events.push(TickEvent::RegisterWritten {
                            by: id,
                            register: *register,
                            value: *value,
                        }),
                        Err(err) => warn!(trigger = %trigger.name, %err, "register_write_failed"),
                    }
                }
                Effect::Activate(target) => {
                    let activators = causes.activated_by.entry(*target).or_default();
                    if !activators.contains(&id) {
                        activators.push(id);
                    }
                    if let Some(flag) = self.enabled.get_mut(target) {
                        if !*flag {
                            *flag = true;
                            report.events.push(TickEvent::Enabled {
                                by: id,
                                trigger: *target,
                            });
                        }
                    }
                }
                Effect::Deactivate(target) => {
                    if let Some(flag) = self.enabled.get_mut(target) {
                        if *flag {
                            *flag = false;
                            report.events.push(TickEvent::Disabled {
                                by: id,
                                trigger: *target,
                            });
                        }
                    }
                }
                Effect::ReplaceObject { object, visual } => {
                    host.replace_object(*object, *visual);
                    report.events.push(TickEvent::ObjectReplaced {
                        by: id,
                        object: *object,
                        visual: *visual,
                    });
                }
                Effect::Script(call) => {
                    host.invoke(call, &mut self.registers);
                    report.events.push(TickEvent::ScriptInvoked {
                        by: id,
                        call: call.clone(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chance::{CoinFlip, ScriptedFlips};
    use crate::condition::Percent;
    use crate::host::IdleHost;
    use crate::id::{ObjectId, VisualId};
    use crate::script::ScriptCall;
    use crate::test_utils::*;

    fn no_flips() -> ScriptedFlips {
        ScriptedFlips::default()
    }

    // -----------------------------------------------------------------------
    // Firing rules
    // -----------------------------------------------------------------------

    #[test]
    fn one_shot_fires_once() {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let mut engine = Engine::new(g, RegisterBank::new());
        let first = engine.step(&mut IdleHost, &mut no_flips());
        assert_eq!(first.fired, vec![a]);
        assert!(!engine.is_enabled(a));
        assert!(engine.step(&mut IdleHost, &mut no_flips()).is_quiet());
    }

    #[test]
    fn looping_stays_armed() {
        let mut g = TriggerGraph::new();
        let a = looping(&mut g, "Loop");
        let mut engine = Engine::new(g, RegisterBank::new());
        for _ in 0..3 {
            assert!(engine.step(&mut IdleHost, &mut no_flips()).did_fire(a));
        }
        assert!(engine.is_enabled(a));
    }

    #[test]
    fn later_activation_fires_same_tick_earlier_fires_next() {
        let mut g = TriggerGraph::new();
        let early = one_shot(&mut g, "Early");
        let a = armed(&mut g, "A");
        let late = one_shot(&mut g, "Late");
        g.activate(a, late).unwrap();
        g.activate(a, early).unwrap();
        let mut engine = Engine::new(g, RegisterBank::new());

        let t0 = engine.step(&mut IdleHost, &mut no_flips());
        assert_eq!(t0.fired, vec![a, late]);
        let t1 = engine.step(&mut IdleHost, &mut no_flips());
        assert_eq!(t1.fired, vec![early]);
    }

    #[test]
    fn one_shot_can_rearm_itself() {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        g.activate(a, a).unwrap();
        let mut engine = Engine::new(g, RegisterBank::new());
        engine.step(&mut IdleHost, &mut no_flips());
        assert!(engine.is_enabled(a));
    }

    #[test]
    fn conditions_short_circuit_before_chance() {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        g.add_condition(a, Condition::script("ready", [])).unwrap();
        g.add_condition(a, Condition::Chance(Percent::HUNDRED)).unwrap();
        let mut engine = Engine::new(g, RegisterBank::new());
        let mut flips = ScriptedFlips::new([CoinFlip::Success]);

        let report = engine.step(&mut RecordingHost::new(), &mut flips);
        assert!(report.is_quiet());
        assert_eq!(report.flips, 0);
        assert_eq!(flips.remaining(), 1);
        // Idle, not an error: still armed.
        assert!(engine.is_enabled(a));

        let mut host = RecordingHost::new();
        host.set_function("ready", true);
        assert!(engine.step(&mut host, &mut flips).did_fire(a));
        assert_eq!(flips.consumed(), 1);
    }

    #[test]
    fn register_condition_reads_bank() {
        let mut bank = RegisterBank::new();
        let r = bank.declare("Selection", 0).unwrap();
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        g.add_condition(a, Condition::RegisterEquals { register: r, value: 3 }).unwrap();
        let mut engine = Engine::new(g, bank);
        assert!(engine.step(&mut IdleHost, &mut no_flips()).is_quiet());
        engine.registers_mut().set(r, 3).unwrap();
        assert!(engine.step(&mut IdleHost, &mut no_flips()).did_fire(a));
    }

    #[test]
    fn effects_reach_host_in_order() {
        let mut bank = RegisterBank::new();
        let score = bank.declare("Score", 0).unwrap();
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        g.add_effect(a, Effect::SetRegister { register: score, value: 10 }).unwrap();
        g.add_effect(a, Effect::ReplaceObject { object: ObjectId(4), visual: VisualId(2) })
            .unwrap();
        g.add_effect(a, Effect::script("update", [])).unwrap();
        let mut engine = Engine::new(g, bank);
        let mut host = RecordingHost::new();
        let report = engine.step(&mut host, &mut no_flips());

        assert_eq!(engine.registers().get(score), Some(10));
        assert_eq!(host.replaced, vec![(ObjectId(4), VisualId(2))]);
        assert_eq!(host.invoked, vec![ScriptCall::nullary("update")]);
        assert_eq!(report.changes().count(), 3);
    }

    // -----------------------------------------------------------------------
    // Single-writer tracking
    // -----------------------------------------------------------------------

    #[test]
    fn causally_ordered_writes_are_allowed() {
        let mut bank = RegisterBank::new();
        let sel = bank.declare("Selection", 0).unwrap();
        let mut g = TriggerGraph::new();
        let clear = looping(&mut g, "Clear");
        let capture = one_shot(&mut g, "Capture");
        g.add_effect(clear, Effect::SetRegister { register: sel, value: 0 }).unwrap();
        g.activate(clear, capture).unwrap();
        g.add_effect(capture, Effect::SetRegister { register: sel, value: 2 }).unwrap();
        let mut engine = Engine::new(g, bank);
        let report = engine.step(&mut IdleHost, &mut no_flips());
        assert_eq!(report.conflicts().count(), 0);
        assert_eq!(engine.registers().get(sel), Some(2));
    }

    #[test]
    fn any_activator_orders_a_later_write() {
        let mut bank = RegisterBank::new();
        let r = bank.declare("Selection", 0).unwrap();
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let b = armed(&mut g, "B");
        let t = one_shot(&mut g, "T");
        g.activate(a, t).unwrap();
        g.add_effect(b, Effect::SetRegister { register: r, value: 1 }).unwrap();
        g.activate(b, t).unwrap();
        g.add_effect(t, Effect::SetRegister { register: r, value: 2 }).unwrap();
        let mut engine = Engine::new(g, bank);
        let report = engine.step(&mut IdleHost, &mut no_flips());
        assert!(report.did_fire(t));
        assert_eq!(report.conflicts().count(), 0);
        assert_eq!(engine.registers().get(r), Some(2));
    }

    #[test]
    fn unordered_writes_are_reported() {
        let mut bank = RegisterBank::new();
        let sel = bank.declare("Selection", 0).unwrap();
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let b = armed(&mut g, "B");
        g.add_effect(a, Effect::SetRegister { register: sel, value: 1 }).unwrap();
        g.add_effect(b, Effect::SetRegister { register: sel, value: 2 }).unwrap();
        let mut engine = Engine::new(g, bank);
        let report = engine.step(&mut IdleHost, &mut no_flips());
        assert_eq!(
            report.conflicts().collect::<Vec<_>>(),
            vec![&TickEvent::WriteConflict { register: sel, first: a, second: b }]
        );
    }

    // -----------------------------------------------------------------------
    // Out-of-band firing and objectives
    // -----------------------------------------------------------------------

    #[test]
    fn fire_now_twice_second_is_noop() {
        let mut g = TriggerGraph::new();
        let x = armed(&mut g, "X");
        let y = armed(&mut g, "Y");
        let cleanup = one_shot(&mut g, "Cleanup");
        g.deactivate(cleanup, x).unwrap();
        g.deactivate(cleanup, y).unwrap();
        let mut engine = Engine::new(g, RegisterBank::new());

        let first = engine.fire_now(cleanup, &mut IdleHost, &mut no_flips()).unwrap();
        assert_eq!(first.changes().count(), 2);
        let hash = engine.state_hash();
        let second = engine.fire_now(cleanup, &mut IdleHost, &mut no_flips()).unwrap();
        assert_eq!(second.changes().count(), 0);
        assert_eq!(engine.state_hash(), hash);
    }

    #[test]
    fn fire_now_unknown_trigger_fails() {
        let mut engine = Engine::new(TriggerGraph::new(), RegisterBank::new());
        let ghost = TriggerId::default();
        assert_eq!(
            engine.fire_now(ghost, &mut IdleHost, &mut no_flips()).unwrap_err(),
            GraphError::UnknownTrigger(ghost)
        );
    }

    #[test]
    fn objectives_never_fire_but_toggle() {
        let mut g = TriggerGraph::new();
        let late = g
            .declare_objective("Late", Objective { description: "b".into(), order: 100 }, true)
            .unwrap();
        let early = g
            .declare_objective("Early", Objective { description: "a".into(), order: 0 }, false)
            .unwrap();
        let show = armed(&mut g, "Show");
        g.activate(show, early).unwrap();
        let mut engine = Engine::new(g, RegisterBank::new());
        let report = engine.step(&mut IdleHost, &mut no_flips());
        assert_eq!(report.fired, vec![show]);
        let visible: Vec<_> = engine.visible_objectives().into_iter().map(|(id, _)| id).collect();
        assert_eq!(visible, vec![early, late]);
    }

    #[test]
    fn state_hash_tracks_flags() {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let mut e1 = Engine::new(g.clone(), RegisterBank::new());
        let e2 = Engine::new(g, RegisterBank::new());
        assert_eq!(e1.state_hash(), e2.state_hash());
        e1.disable(a).unwrap();
        assert_ne!(e1.compute_state_hash(), e2.compute_state_hash());
    }
}
