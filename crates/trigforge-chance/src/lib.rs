//! Uniform random selection compiled to biased binary splits.
//!
//! The substrate's only source of randomness is a single weighted condition,
//! "chance with probability p" with an integer percentage `p`. Picking a
//! uniform integer in `[0, n]` is therefore expressed as a balanced binary
//! tree of such splits: each internal node is a pair of one-shot triggers,
//! `success` (guarded by the chance) and `failure` (unguarded, evaluated
//! after `success` and excluded by it).
//!
//! # Rounding bias
//!
//! Split percentages are `round(100 * num_left / total)` to the nearest
//! integer, so the result is exactly uniform only when `n + 1` is a power of
//! two. For `n = 6` the root split is 43% against an exact 3/7 = 42.857%.
//! The bias is bounded and left uncorrected; [`DecisionTree::leaf_probabilities`]
//! reports the exact distribution the rounded tree produces.

pub mod shuffle;
pub mod tree;

pub use shuffle::{SequenceBuffer, ShuffleChain};
pub use tree::{ChanceError, ChanceNode, ChanceSplit, DecisionTree, TreeBuilder, percent_for};
