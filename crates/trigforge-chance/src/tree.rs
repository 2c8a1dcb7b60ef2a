use trigforge_core::chance::CoinFlip;
use trigforge_core::condition::{Condition, Percent, PercentError};
use trigforge_core::effect::Effect;
use trigforge_core::fixed::{Fixed64, ratio};
use trigforge_core::graph::{GraphError, TriggerGraph};
use trigforge_core::id::TriggerId;
use trigforge_core::trigger::TriggerSpec;
use tracing::debug;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChanceError {
    #[error("decision tree bound must be at least 1, got {bound}")]
    InvalidBound { bound: u32 },
    #[error(transparent)]
    Percent(#[from] PercentError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

// ---------------------------------------------------------------------------
// Tree structure
// ---------------------------------------------------------------------------

/// An internal split over the half-open range `[left, right)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChanceSplit {
    pub range: (u32, u32),
    /// Probability of taking the lower half.
    pub percent: Percent,
    pub success: TriggerId,
    pub failure: TriggerId,
    /// Lower half, taken on success.
    pub lower: Box<ChanceNode>,
    /// Upper half, taken on failure.
    pub upper: Box<ChanceNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChanceNode {
    Leaf(u32),
    Split(ChanceSplit),
}

impl ChanceNode {
    /// Effects that start resolving this subtree, or `leaf` for a leaf.
    fn entry_effects<F>(&self, leaf: &mut F) -> Vec<Effect>
    where
        F: FnMut(u32) -> Vec<Effect>,
    {
        match self {
            ChanceNode::Leaf(value) => leaf(*value),
            ChanceNode::Split(split) => vec![
                Effect::Activate(split.success),
                Effect::Activate(split.failure),
            ],
        }
    }
}

/// Success percentage of a split with `num_left` of `total` values on the
/// success side, rounded half up to a whole percent.
pub fn percent_for(num_left: u32, total: u32) -> Result<Percent, PercentError> {
    let (num_left, total) = (i64::from(num_left), i64::from(total.max(1)));
    let rounded = (200 * num_left + total) / (2 * total);
    Percent::new(i32::try_from(rounded).unwrap_or(i32::MAX))
}

/// A declared decision tree selecting a value in `[0, bound]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionTree {
    bound: u32,
    root: ChanceSplit,
}

impl DecisionTree {
    pub fn bound(&self) -> u32 {
        self.bound
    }

    pub fn root(&self) -> &ChanceSplit {
        &self.root
    }

    /// Effects that arm the tree's root split.
    pub fn activation_effects(&self) -> Vec<Effect> {
        vec![
            Effect::Activate(self.root.success),
            Effect::Activate(self.root.failure),
        ]
    }

    /// Every split, in declaration (preorder) order.
    pub fn splits(&self) -> Vec<&ChanceSplit> {
        fn walk<'a>(split: &'a ChanceSplit, out: &mut Vec<&'a ChanceSplit>) {
            out.push(split);
            for child in [&*split.lower, &*split.upper] {
                if let ChanceNode::Split(s) = child {
                    walk(s, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.root, &mut out);
        out
    }

    /// All trigger handles owned by the tree.
    pub fn triggers(&self) -> Vec<TriggerId> {
        self.splits()
            .into_iter()
            .flat_map(|s| [s.success, s.failure])
            .collect()
    }

    /// Root-to-leaf paths as coin-flip sequences, lowest leaf first.
    pub fn paths(&self) -> Vec<(Vec<CoinFlip>, u32)> {
        fn walk(node: &ChanceNode, prefix: &mut Vec<CoinFlip>, out: &mut Vec<(Vec<CoinFlip>, u32)>) {
            match node {
                ChanceNode::Leaf(v) => out.push((prefix.clone(), *v)),
                ChanceNode::Split(s) => {
                    prefix.push(CoinFlip::Success);
                    walk(&s.lower, prefix, out);
                    prefix.pop();
                    prefix.push(CoinFlip::Failure);
                    walk(&s.upper, prefix, out);
                    prefix.pop();
                }
            }
        }
        let mut out = Vec::new();
        walk(&ChanceNode::Split(self.root.clone()), &mut Vec::new(), &mut out);
        out
    }

    /// Leaf values, in order.
    pub fn leaves(&self) -> Vec<u32> {
        self.paths().into_iter().map(|(_, v)| v).collect()
    }

    /// Walk the tree drawing one flip per split. Returns the leaf and the
    /// number of flips consumed.
    pub fn sample<F>(&self, mut flip: F) -> (u32, usize)
    where
        F: FnMut(Percent) -> CoinFlip,
    {
        let mut split = &self.root;
        let mut used = 0;
        loop {
            used += 1;
            let next = if flip(split.percent).is_success() {
                &split.lower
            } else {
                &split.upper
            };
            match &**next {
                ChanceNode::Leaf(v) => return (*v, used),
                ChanceNode::Split(s) => split = s,
            }
        }
    }

    /// Exact probability of each leaf under the rounded percentages.
    pub fn leaf_probabilities(&self) -> Vec<(u32, Fixed64)> {
        fn walk(node: &ChanceNode, p: Fixed64, out: &mut Vec<(u32, Fixed64)>) {
            match node {
                ChanceNode::Leaf(v) => out.push((*v, p)),
                ChanceNode::Split(s) => {
                    let lower = p * s.percent.probability();
                    walk(&s.lower, lower, out);
                    walk(&s.upper, p - lower, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&ChanceNode::Split(self.root.clone()), Fixed64::from_num(1), &mut out);
        out
    }

    /// Largest absolute deviation of any leaf from `1 / (bound + 1)`.
    pub fn max_bias(&self) -> Fixed64 {
        let uniform = ratio(1, self.bound + 1).unwrap_or(Fixed64::ZERO);
        self.leaf_probabilities()
            .into_iter()
            .map(|(_, p)| (p - uniform).abs())
            .max()
            .unwrap_or(Fixed64::ZERO)
    }

    /// Attach conditions and effects to every split.
    ///
    /// `success` is guarded by the split's chance and deactivates `failure`;
    /// `failure` is unguarded and deactivates `success`. Since `success` is
    /// declared first, exactly one of the pair fires. Each then arms its
    /// child split, or runs `leaf(value)` at a leaf. Children are declared
    /// after their parents, so an armed tree resolves within one tick.
    pub fn wire<F>(&self, graph: &mut TriggerGraph, mut leaf: F) -> Result<(), ChanceError>
    where
        F: FnMut(u32) -> Vec<Effect>,
    {
        for split in self.splits() {
            graph.add_condition(split.success, Condition::Chance(split.percent))?;
            graph.deactivate(split.success, split.failure)?;
            graph.add_effects(split.success, split.lower.entry_effects(&mut leaf))?;
            graph.deactivate(split.failure, split.success)?;
            graph.add_effects(split.failure, split.upper.entry_effects(&mut leaf))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Declares decision trees into a graph.
///
/// Trigger names are made unique by a counter owned by the builder, so one
/// builder can declare many trees into the same graph.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    prefix: String,
    next_id: u32,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix` to every trigger name.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next_id: 0,
        }
    }

    fn fresh_name(&mut self, bound: u32, role: &str) -> String {
        let id = self.next_id;
        self.next_id += 1;
        if self.prefix.is_empty() {
            format!("Generate 0--{bound} #{id} {role}")
        } else {
            format!("{} Generate 0--{bound} #{id} {role}", self.prefix)
        }
    }

    /// Declare the triggers of a tree selecting uniformly from `[0, bound]`.
    /// Nothing is wired yet; see [`DecisionTree::wire`].
    pub fn build(&mut self, graph: &mut TriggerGraph, bound: u32) -> Result<DecisionTree, ChanceError> {
        if bound < 1 {
            return Err(ChanceError::InvalidBound { bound });
        }
        let right = bound.checked_add(1).ok_or(ChanceError::InvalidBound { bound })?;
        let root = self.declare_range(graph, bound, 0, right)?;
        let tree = DecisionTree { bound, root };
        debug!(
            bound,
            splits = tree.splits().len(),
            root_percent = tree.root.percent.get(),
            "decision_tree_declared"
        );
        Ok(tree)
    }

    fn declare_range(
        &mut self,
        graph: &mut TriggerGraph,
        bound: u32,
        left: u32,
        right: u32,
    ) -> Result<ChanceSplit, ChanceError> {
        let total = right - left;
        let mid = left + total / 2;
        let num_left = mid - left;
        let percent = percent_for(num_left, total)?;
        let success = graph.declare(self.fresh_name(bound, "success"), TriggerSpec::ONE_SHOT)?;
        let failure = graph.declare(self.fresh_name(bound, "failure"), TriggerSpec::ONE_SHOT)?;
        let lower = if num_left == 1 {
            ChanceNode::Leaf(left)
        } else {
            ChanceNode::Split(self.declare_range(graph, bound, left, mid)?)
        };
        let upper = if right - mid == 1 {
            ChanceNode::Leaf(mid)
        } else {
            ChanceNode::Split(self.declare_range(graph, bound, mid, right)?)
        };
        Ok(ChanceSplit {
            range: (left, right),
            percent,
            success,
            failure,
            lower: Box::new(lower),
            upper: Box::new(upper),
        })
    }
}
