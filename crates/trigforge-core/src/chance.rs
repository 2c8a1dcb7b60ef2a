use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::condition::Percent;
use crate::rng::SimRng;

/// Outcome of a single biased coin flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoinFlip {
    Success,
    Failure,
}

impl CoinFlip {
    pub fn is_success(self) -> bool {
        self == CoinFlip::Success
    }
}

impl From<bool> for CoinFlip {
    fn from(success: bool) -> Self {
        if success { CoinFlip::Success } else { CoinFlip::Failure }
    }
}

/// Supplies outcomes for `Chance` conditions, one per evaluated condition.
pub trait ChanceSource {
    fn flip(&mut self, percent: Percent) -> CoinFlip;
}

impl ChanceSource for SimRng {
    fn flip(&mut self, percent: Percent) -> CoinFlip {
        self.chance(percent.probability()).into()
    }
}

/// A fixed sequence of outcomes, ignoring the requested percentage.
///
/// Once the sequence is exhausted every flip fails.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFlips {
    queue: VecDeque<CoinFlip>,
    consumed: usize,
}

impl ScriptedFlips {
    pub fn new(flips: impl IntoIterator<Item = CoinFlip>) -> Self {
        Self {
            queue: flips.into_iter().collect(),
            consumed: 0,
        }
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl ChanceSource for ScriptedFlips {
    fn flip(&mut self, _percent: Percent) -> CoinFlip {
        self.consumed += 1;
        self.queue.pop_front().unwrap_or(CoinFlip::Failure)
    }
}
