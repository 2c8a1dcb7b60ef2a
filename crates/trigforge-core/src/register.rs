use serde::{Deserialize, Serialize};

use crate::effect::Effect;
use crate::id::RegisterId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterError {
    #[error("register {0:?} is not declared")]
    Unknown(RegisterId),
    #[error("a register named '{0}' is already declared")]
    DuplicateName(String),
    #[error("register bank is full")]
    Full,
}

/// Declaration of one register: its name and the value game-start assigns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDecl {
    pub name: String,
    pub initial: i32,
}

/// The shared integer registers.
///
/// Passed explicitly into effect evaluation; there is no ambient register
/// state. The initial-value table is the only persistent state and can be
/// re-established by replaying [`RegisterBank::reset_effects`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterBank {
    decls: Vec<RegisterDecl>,
    values: Vec<i32>,
}

impl RegisterBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>, initial: i32) -> Result<RegisterId, RegisterError> {
        let name = name.into();
        if self.decls.iter().any(|d| d.name == name) {
            return Err(RegisterError::DuplicateName(name));
        }
        let id = u16::try_from(self.decls.len()).map_err(|_| RegisterError::Full)?;
        self.decls.push(RegisterDecl { name, initial });
        self.values.push(initial);
        Ok(RegisterId(id))
    }

    pub fn get(&self, id: RegisterId) -> Option<i32> {
        self.values.get(usize::from(id.0)).copied()
    }

    pub fn set(&mut self, id: RegisterId, value: i32) -> Result<(), RegisterError> {
        let slot = self
            .values
            .get_mut(usize::from(id.0))
            .ok_or(RegisterError::Unknown(id))?;
        *slot = value;
        Ok(())
    }

    pub fn swap(&mut self, a: RegisterId, b: RegisterId) -> Result<(), RegisterError> {
        let (ia, ib) = (usize::from(a.0), usize::from(b.0));
        if ia >= self.values.len() {
            return Err(RegisterError::Unknown(a));
        }
        if ib >= self.values.len() {
            return Err(RegisterError::Unknown(b));
        }
        self.values.swap(ia, ib);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<RegisterId> {
        self.decls
            .iter()
            .position(|d| d.name == name)
            .and_then(|i| u16::try_from(i).ok())
            .map(RegisterId)
    }

    pub fn name(&self, id: RegisterId) -> Option<&str> {
        self.decls.get(usize::from(id.0)).map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = RegisterId> + '_ {
        (0..self.decls.len()).map(|i| RegisterId(i as u16))
    }

    /// Current values in declaration order.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn decls(&self) -> &[RegisterDecl] {
        &self.decls
    }

    /// Overwrite every value at once; used when restoring snapshots.
    pub(crate) fn load_values(&mut self, values: &[i32]) -> bool {
        if values.len() != self.values.len() {
            return false;
        }
        self.values.copy_from_slice(values);
        true
    }

    pub fn reset_to_initial(&mut self) {
        for (value, decl) in self.values.iter_mut().zip(&self.decls) {
            *value = decl.initial;
        }
    }

    /// One `SetRegister` per register restoring its initial value.
    pub fn reset_effects(&self) -> Vec<Effect> {
        self.ids()
            .zip(&self.decls)
            .map(|(register, decl)| Effect::SetRegister {
                register,
                value: decl.initial,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> (RegisterBank, RegisterId, RegisterId) {
        let mut bank = RegisterBank::new();
        let score = bank.declare("Score", 0).unwrap();
        let level = bank.declare("Level", 1).unwrap();
        (bank, score, level)
    }

    #[test]
    fn declare_assigns_sequential_ids() {
        let (bank, score, level) = bank();
        assert_eq!(score, RegisterId(0));
        assert_eq!(level, RegisterId(1));
        assert_eq!(bank.get(level), Some(1));
        assert_eq!(bank.lookup("Level"), Some(level));
        assert_eq!(bank.name(score), Some("Score"));
    }

    #[test]
    fn duplicate_register_rejected() {
        let (mut bank, _, _) = bank();
        assert_eq!(
            bank.declare("Score", 5),
            Err(RegisterError::DuplicateName("Score".into()))
        );
    }

    #[test]
    fn unknown_register_writes_fail() {
        let (mut bank, score, _) = bank();
        assert_eq!(bank.set(RegisterId(9), 1), Err(RegisterError::Unknown(RegisterId(9))));
        assert!(bank.swap(score, RegisterId(9)).is_err());
        assert_eq!(bank.get(RegisterId(9)), None);
    }

    #[test]
    fn reset_restores_initial_values() {
        let (mut bank, score, level) = bank();
        bank.set(score, 400).unwrap();
        bank.swap(score, level).unwrap();
        assert_eq!(bank.values(), &[1, 400]);
        bank.reset_to_initial();
        assert_eq!(bank.values(), &[0, 1]);
    }

    #[test]
    fn reset_effects_cover_every_register() {
        let (bank, score, level) = bank();
        assert_eq!(
            bank.reset_effects(),
            vec![
                Effect::SetRegister { register: score, value: 0 },
                Effect::SetRegister { register: level, value: 1 },
            ]
        );
    }
}
