//! Structural checks over a trigger graph and determinism checks over
//! engine runs.
//!
//! Mutual exclusion is guaranteed by construction; these checks verify that
//! the construction was actually done, so a compile pass can assert it
//! before handing the graph to a substrate.

use crate::condition::Condition;
use crate::effect::{EdgeKind, Effect};
use crate::engine::Engine;
use crate::graph::TriggerGraph;
use crate::host::ScriptHost;
use crate::id::{RegisterId, TriggerId};
use crate::register::RegisterBank;
use crate::rng::SimRng;

// ---------------------------------------------------------------------------
// Structural issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("trigger {from:?} does not deactivate its exclusive peer {to:?}")]
    MissingExclusion { from: TriggerId, to: TriggerId },
    #[error("{0} members of an exclusive group start enabled")]
    MultipleInitiallyEnabled(usize),
    #[error("trigger {0:?} can never be enabled")]
    Unreachable(TriggerId),
    #[error("trigger {0:?} is not declared")]
    Unknown(TriggerId),
    #[error("trigger {trigger:?} uses undeclared register {register:?}")]
    UndeclaredRegister { trigger: TriggerId, register: RegisterId },
}

/// Verify that `group` is wired as a mutual-exclusion group and that at
/// most one member starts enabled.
pub fn check_exclusive_group(graph: &TriggerGraph, group: &[TriggerId]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for &id in group {
        if !graph.contains(id) {
            issues.push(ValidationIssue::Unknown(id));
        }
    }
    if !issues.is_empty() {
        return issues;
    }
    for &from in group {
        for &to in group {
            if from != to && !graph.has_edge(from, to, EdgeKind::Deactivate) {
                issues.push(ValidationIssue::MissingExclusion { from, to });
            }
        }
    }
    let armed = group
        .iter()
        .filter(|&&id| graph.get(id).is_some_and(|t| t.initially_enabled))
        .count();
    if armed > 1 {
        issues.push(ValidationIssue::MultipleInitiallyEnabled(armed));
    }
    issues
}

/// Logic triggers that start disabled and that no trigger reachable from
/// the initially enabled set ever activates.
pub fn unreachable_triggers(graph: &TriggerGraph) -> Vec<TriggerId> {
    let reach = graph.reachable_from(&graph.initially_enabled());
    graph
        .iter()
        .filter(|(id, t)| !t.is_objective() && !reach.contains(id))
        .map(|(id, _)| id)
        .collect()
}

/// Register reads and writes that name a register `bank` never declared,
/// in declaration then condition-before-effect order.
pub fn undeclared_registers(graph: &TriggerGraph, bank: &RegisterBank) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (trigger, t) in graph.iter() {
        let reads = t.conditions().iter().filter_map(|c| match c {
            Condition::RegisterEquals { register, .. } => Some(*register),
            _ => None,
        });
        let writes = t.effects().iter().filter_map(|e| match e {
            Effect::SetRegister { register, .. } => Some(*register),
            _ => None,
        });
        for register in reads.chain(writes) {
            if bank.get(register).is_none() {
                issues.push(ValidationIssue::UndeclaredRegister { trigger, register });
            }
        }
    }
    issues
}

// ---------------------------------------------------------------------------
// Engine comparison
// ---------------------------------------------------------------------------

/// Differences between two engines running the same graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineDiff {
    pub tick_matches: bool,
    pub enabled_mismatches: Vec<TriggerId>,
    pub register_mismatches: Vec<RegisterId>,
}

impl EngineDiff {
    pub fn is_identical(&self) -> bool {
        self.tick_matches && self.enabled_mismatches.is_empty() && self.register_mismatches.is_empty()
    }
}

/// Compare flags and registers. Triggers are matched by declaration index.
pub fn diff_engines(a: &Engine, b: &Engine) -> EngineDiff {
    let enabled_mismatches = a
        .graph()
        .order()
        .iter()
        .zip(b.graph().order())
        .filter(|&(&ia, &ib)| a.is_enabled(ia) != b.is_enabled(ib))
        .map(|(&ia, _)| ia)
        .collect();
    let register_mismatches = a
        .registers()
        .ids()
        .filter(|&r| a.registers().get(r) != b.registers().get(r))
        .collect();
    EngineDiff {
        tick_matches: a.tick() == b.tick(),
        enabled_mismatches,
        register_mismatches,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("runs diverged at tick {tick}: 0x{hash_a:016X} vs 0x{hash_b:016X}")]
pub struct Divergence {
    pub tick: u64,
    pub hash_a: u64,
    pub hash_b: u64,
}

/// Run two independently built engines with the same seed for `ticks` ticks
/// and compare state hashes after every tick.
pub fn validate_determinism<H, F>(build: F, seed: u64, ticks: u64) -> Result<(), Divergence>
where
    H: ScriptHost,
    F: Fn() -> (Engine, H),
{
    let (mut a, mut host_a) = build();
    let (mut b, mut host_b) = build();
    let mut rng_a = SimRng::new(seed);
    let mut rng_b = SimRng::new(seed);
    for _ in 0..ticks {
        let ra = a.step(&mut host_a, &mut rng_a);
        let rb = b.step(&mut host_b, &mut rng_b);
        if ra.state_hash != rb.state_hash {
            return Err(Divergence {
                tick: ra.tick,
                hash_a: ra.state_hash,
                hash_b: rb.state_hash,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Condition, Percent};
    use crate::register::RegisterBank;
    use crate::test_utils::*;

    #[test]
    fn wired_group_passes() {
        let mut g = TriggerGraph::new();
        let ids = [armed(&mut g, "A"), one_shot(&mut g, "B"), one_shot(&mut g, "C")];
        g.mutually_exclusive(&ids).unwrap();
        assert!(check_exclusive_group(&g, &ids).is_empty());
    }

    #[test]
    fn missing_edges_and_double_arming_are_reported() {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let b = armed(&mut g, "B");
        g.deactivate(a, b).unwrap();
        let issues = check_exclusive_group(&g, &[a, b]);
        assert_eq!(
            issues,
            vec![
                ValidationIssue::MissingExclusion { from: b, to: a },
                ValidationIssue::MultipleInitiallyEnabled(2),
            ]
        );
    }

    #[test]
    fn orphan_trigger_is_unreachable() {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let b = one_shot(&mut g, "B");
        let orphan = one_shot(&mut g, "Orphan");
        g.activate(a, b).unwrap();
        assert_eq!(unreachable_triggers(&g), vec![orphan]);
    }

    #[test]
    fn registers_outside_the_bank_are_reported() {
        let mut bank = RegisterBank::new();
        let score = bank.declare("Score", 0).unwrap();
        let stray = RegisterId(7);
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let b = one_shot(&mut g, "B");
        g.add_condition(a, Condition::RegisterEquals { register: score, value: 0 }).unwrap();
        g.add_effect(a, Effect::SetRegister { register: score, value: 1 }).unwrap();
        g.add_condition(b, Condition::RegisterEquals { register: stray, value: 0 }).unwrap();
        g.add_effect(b, Effect::SetRegister { register: stray, value: 1 }).unwrap();
        assert_eq!(
            undeclared_registers(&g, &bank),
            vec![
                ValidationIssue::UndeclaredRegister { trigger: b, register: stray },
                ValidationIssue::UndeclaredRegister { trigger: b, register: stray },
            ]
        );
        assert_eq!(undeclared_registers(&g, &RegisterBank::new()).len(), 4);
    }

    #[test]
    fn chance_graph_is_deterministic_per_seed() {
        let build = || {
            let mut g = TriggerGraph::new();
            let a = looping(&mut g, "Coin");
            let mut bank = RegisterBank::new();
            let heads = bank.declare("Heads", 0).unwrap();
            g.add_condition(a, Condition::Chance(Percent::new(50).unwrap())).unwrap();
            g.add_effect(a, crate::effect::Effect::SetRegister { register: heads, value: 1 })
                .unwrap();
            (Engine::new(g, bank), RecordingHost::new())
        };
        assert!(validate_determinism(build, 99, 50).is_ok());
    }

    #[test]
    fn diff_reports_flag_mismatch() {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let mut x = Engine::new(g.clone(), RegisterBank::new());
        let y = Engine::new(g, RegisterBank::new());
        assert!(diff_engines(&x, &y).is_identical());
        x.disable(a).unwrap();
        assert_eq!(diff_engines(&x, &y).enabled_mismatches, vec![a]);
    }
}
