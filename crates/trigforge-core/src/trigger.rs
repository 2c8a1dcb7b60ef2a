use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::effect::Effect;

/// Whether a trigger stays armed after firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RearmMode {
    /// Disabled on firing; must be re-enabled by another trigger's effect.
    OneShot,
    /// Stays enabled and fires every tick its conditions hold.
    Looping,
}

/// Declaration-time parameters of a logic trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSpec {
    pub rearm: RearmMode,
    pub enabled: bool,
}

impl TriggerSpec {
    pub const ONE_SHOT: TriggerSpec = TriggerSpec {
        rearm: RearmMode::OneShot,
        enabled: false,
    };
    pub const LOOPING: TriggerSpec = TriggerSpec {
        rearm: RearmMode::Looping,
        enabled: false,
    };

    /// Start enabled.
    pub const fn enabled(self) -> Self {
        TriggerSpec {
            enabled: true,
            ..self
        }
    }
}

/// Text shown to the player while an objective trigger is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub description: String,
    /// Display order; lower is shown first.
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    Logic,
    /// Display-only; never fires. Its enabled flag is its visibility.
    Objective(Objective),
}

/// A declared trigger: identity, conditions, effects, re-arm mode.
#[derive(Debug, Clone)]
pub struct Trigger {
    pub name: String,
    pub kind: TriggerKind,
    pub rearm: RearmMode,
    pub initially_enabled: bool,
    pub(crate) index: usize,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) effects: Vec<Effect>,
}

impl Trigger {
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Position in declaration (evaluation) order.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_objective(&self) -> bool {
        matches!(self.kind, TriggerKind::Objective(_))
    }

    pub fn objective(&self) -> Option<&Objective> {
        match &self.kind {
            TriggerKind::Objective(o) => Some(o),
            TriggerKind::Logic => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specs_start_disabled_unless_asked() {
        assert!(!TriggerSpec::ONE_SHOT.enabled);
        assert!(TriggerSpec::ONE_SHOT.enabled().enabled);
        assert_eq!(TriggerSpec::LOOPING.enabled().rearm, RearmMode::Looping);
    }
}
