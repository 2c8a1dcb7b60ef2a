//! The n=6 decision tree driven through the engine by fixed flip streams.

use trigforge_chance::TreeBuilder;
use trigforge_core::chance::CoinFlip::{Failure as F, Success as S};
use trigforge_core::chance::{CoinFlip, ScriptedFlips};
use trigforge_core::effect::Effect;
use trigforge_core::engine::Engine;
use trigforge_core::graph::TriggerGraph;
use trigforge_core::host::IdleHost;
use trigforge_core::register::RegisterBank;
use trigforge_core::trigger::TriggerSpec;

/// Runs one tick and returns (leaf, flips consumed, triggers fired).
fn resolve(flips: &[CoinFlip]) -> (Option<i32>, usize, usize) {
    let mut graph = TriggerGraph::new();
    let mut bank = RegisterBank::new();
    let out = bank.declare("Out", -1).unwrap();
    let start = graph.declare("Start", TriggerSpec::ONE_SHOT.enabled()).unwrap();
    let tree = TreeBuilder::new().build(&mut graph, 6).unwrap();
    graph.add_effects(start, tree.activation_effects()).unwrap();
    tree.wire(&mut graph, |v| vec![Effect::SetRegister { register: out, value: v as i32 }])
        .unwrap();

    let mut engine = Engine::new(graph, bank);
    let mut source = ScriptedFlips::new(flips.iter().copied());
    let report = engine.step(&mut IdleHost, &mut source);
    (engine.registers().get(out), source.consumed(), report.fired.len())
}

#[test]
fn success_failure_success_lands_on_one() {
    // [0,7) S-> [0,3) F-> [1,3) S-> [1,2)
    let (leaf, used, fired) = resolve(&[S, F, S, S, F]);
    assert_eq!(leaf, Some(1));
    assert_eq!(used, 3);
    // Start plus one node per level.
    assert_eq!(fired, 4);
}

#[test]
fn failure_success_failure_lands_on_four() {
    // [0,7) F-> [3,7) S-> [3,5) F-> [4,5)
    let (leaf, used, _) = resolve(&[F, S, F]);
    assert_eq!(leaf, Some(4));
    assert_eq!(used, 3);
}

#[test]
fn exhausted_stream_takes_the_failure_spine() {
    // Failure everywhere ends on the last leaf.
    let (leaf, _, _) = resolve(&[]);
    assert_eq!(leaf, Some(6));
}
