//! Opaque call-by-name contract with the external scripting engine.
//!
//! Conditions and effects never see the scripting body, only a function
//! name and a small fixed list of integer arguments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Swaps the values of two registers. Arguments: `[register_a, register_b]`.
pub const SWAP_SLOTS: &str = "swapSlots";

/// A call into the external scripting engine.
///
/// Used as a boolean predicate by [`crate::condition::Condition::Script`] and
/// as a void call by [`crate::effect::Effect::Script`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptCall {
    pub function: String,
    pub args: Vec<i32>,
}

impl ScriptCall {
    pub fn new(function: impl Into<String>, args: impl Into<Vec<i32>>) -> Self {
        Self {
            function: function.into(),
            args: args.into(),
        }
    }

    /// A call with no arguments.
    pub fn nullary(function: impl Into<String>) -> Self {
        Self::new(function, Vec::new())
    }

    pub fn is(&self, function: &str) -> bool {
        self.function == function
    }
}

impl fmt::Display for ScriptCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{arg}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_call_syntax() {
        assert_eq!(ScriptCall::new(SWAP_SLOTS, [4, 6]).to_string(), "swapSlots(4, 6)");
        assert_eq!(ScriptCall::nullary("update").to_string(), "update()");
    }

    #[test]
    fn calls_compare_by_name_and_args() {
        let a = ScriptCall::new("isNextPiece", [0, 3]);
        assert_eq!(a, ScriptCall::new("isNextPiece", vec![0, 3]));
        assert_ne!(a, ScriptCall::new("isNextPiece", [1, 3]));
        assert!(a.is("isNextPiece"));
    }
}
