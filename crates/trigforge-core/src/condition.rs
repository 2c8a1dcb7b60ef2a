use serde::{Deserialize, Serialize};

use crate::fixed::Fixed64;
use crate::id::{ObjectId, RegisterId};
use crate::script::ScriptCall;

/// Errors constructing a [`Percent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PercentError {
    #[error("chance percentage {value} is outside [0, 100]")]
    OutOfRange { value: i32 },
}

/// An integer success percentage in `[0, 100]`.
///
/// The substrate only accepts whole percentages; anything else is rejected
/// rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const HUNDRED: Percent = Percent(100);

    pub fn new(value: i32) -> Result<Self, PercentError> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(PercentError::OutOfRange { value }),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Probability of success in Q32.32.
    ///
    /// Percentages above 50 are derived from their complement, so a
    /// percentage and its complement always sum to exactly one.
    pub fn probability(self) -> Fixed64 {
        if self.0 > 50 {
            Fixed64::ONE - self.complement().probability()
        } else {
            Fixed64::from_num(self.0) / Fixed64::from_num(100)
        }
    }

    /// Probability of failure, `1 - probability()`.
    pub fn failure_probability(self) -> Fixed64 {
        Fixed64::ONE - self.probability()
    }

    pub fn complement(self) -> Percent {
        Percent(100 - self.0)
    }
}

/// A side-effect-free predicate gating a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Holds with the given probability; consumes one coin flip when evaluated.
    Chance(Percent),
    /// External boolean call.
    Script(ScriptCall),
    /// The player currently has this object selected.
    ObjectSelected(ObjectId),
    /// A register holds exactly this value.
    RegisterEquals { register: RegisterId, value: i32 },
}

impl Condition {
    pub fn script(function: &str, args: impl Into<Vec<i32>>) -> Self {
        Condition::Script(ScriptCall::new(function, args))
    }
}
