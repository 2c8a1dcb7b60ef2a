//! Fisher–Yates shuffles composed from decision trees.
//!
//! A sequence of length `k` lives in `k` registers. The chain holds one tree
//! per suffix length `k, k-1, …, 2`; the tree at position `i` picks an
//! offset in `[0, k-1-i]` and its leaf swaps slot `i` with slot
//! `i + offset` before arming the next tree. Offset zero emits no swap.

use trigforge_core::effect::Effect;
use trigforge_core::graph::TriggerGraph;
use trigforge_core::id::{RegisterId, TriggerId};
use trigforge_core::register::{RegisterBank, RegisterError};
use trigforge_core::script::{SWAP_SLOTS, ScriptCall};

use crate::tree::{ChanceError, DecisionTree, TreeBuilder};

/// A fixed-length run of registers holding a permutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceBuffer {
    name: String,
    slots: Vec<RegisterId>,
}

impl SequenceBuffer {
    /// Declare `len` registers named `"{name} {i}"`, slot `i` starting at `i`.
    pub fn declare(bank: &mut RegisterBank, name: &str, len: usize) -> Result<Self, RegisterError> {
        let mut slots = Vec::with_capacity(len);
        for i in 0..len {
            let initial = i32::try_from(i).map_err(|_| RegisterError::Full)?;
            slots.push(bank.declare(format!("{name} {i}"), initial)?);
        }
        Ok(Self {
            name: name.to_string(),
            slots,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[RegisterId] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current contents, read from `bank`.
    pub fn values(&self, bank: &RegisterBank) -> Vec<i32> {
        self.slots.iter().filter_map(|&r| bank.get(r)).collect()
    }

    /// The external call swapping slots `i` and `j`.
    pub fn swap_call(&self, i: usize, j: usize) -> Option<ScriptCall> {
        let (a, b) = (self.slots.get(i)?, self.slots.get(j)?);
        Some(ScriptCall::new(SWAP_SLOTS, [a.as_arg(), b.as_arg()]))
    }
}

/// A chain of decision trees shuffling one [`SequenceBuffer`].
#[derive(Debug, Clone)]
pub struct ShuffleChain {
    buffer: SequenceBuffer,
    trees: Vec<DecisionTree>,
}

impl ShuffleChain {
    /// Declare one tree per suffix length, longest first.
    pub fn declare(
        builder: &mut TreeBuilder,
        graph: &mut TriggerGraph,
        buffer: SequenceBuffer,
    ) -> Result<Self, ChanceError> {
        let mut trees = Vec::new();
        for len in (2..=buffer.len()).rev() {
            let bound = u32::try_from(len - 1).map_err(|_| ChanceError::InvalidBound { bound: u32::MAX })?;
            trees.push(builder.build(graph, bound)?);
        }
        Ok(Self { buffer, trees })
    }

    pub fn buffer(&self) -> &SequenceBuffer {
        &self.buffer
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn triggers(&self) -> Vec<TriggerId> {
        self.trees.iter().flat_map(DecisionTree::triggers).collect()
    }

    /// Effects that start the shuffle. A buffer too short to need any tree
    /// goes straight to `on_complete`.
    pub fn start_effects(&self, on_complete: &[Effect]) -> Vec<Effect> {
        match self.trees.first() {
            Some(tree) => tree.activation_effects(),
            None => on_complete.to_vec(),
        }
    }

    /// Wire swaps and the tree-to-tree hand-off; the last tree's leaves run
    /// `on_complete`.
    pub fn wire(&self, graph: &mut TriggerGraph, on_complete: &[Effect]) -> Result<(), ChanceError> {
        for (position, tree) in self.trees.iter().enumerate() {
            let next = match self.trees.get(position + 1) {
                Some(next) => next.activation_effects(),
                None => on_complete.to_vec(),
            };
            tree.wire(graph, |offset| {
                let mut effects = Vec::with_capacity(next.len() + 1);
                if offset != 0 {
                    if let Some(call) = self.buffer.swap_call(position, position + offset as usize) {
                        effects.push(Effect::Script(call));
                    }
                }
                effects.extend(next.iter().cloned());
                effects
            })?;
        }
        Ok(())
    }
}
