use crate::id::{ObjectId, VisualId};
use crate::register::RegisterBank;
use crate::script::ScriptCall;

/// The external world a trigger graph runs against: the scripting engine,
/// player selection, and the map objects render effects replace.
pub trait ScriptHost {
    /// Evaluate an external boolean predicate.
    fn evaluate(&mut self, call: &ScriptCall, registers: &RegisterBank) -> bool;

    /// Run an external void call. The call may read and write registers.
    fn invoke(&mut self, call: &ScriptCall, registers: &mut RegisterBank);

    /// Whether the player currently has `object` selected.
    fn is_selected(&mut self, object: ObjectId) -> bool;

    /// Replace `object`'s visual.
    fn replace_object(&mut self, object: ObjectId, visual: VisualId);
}

/// A host in which no predicate holds and every call is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleHost;

impl ScriptHost for IdleHost {
    fn evaluate(&mut self, _call: &ScriptCall, _registers: &RegisterBank) -> bool {
        false
    }

    fn invoke(&mut self, _call: &ScriptCall, _registers: &mut RegisterBank) {}

    fn is_selected(&mut self, _object: ObjectId) -> bool {
        false
    }

    fn replace_object(&mut self, _object: ObjectId, _visual: VisualId) {}
}
