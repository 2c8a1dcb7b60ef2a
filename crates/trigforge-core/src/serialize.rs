//! Runtime snapshots via `bitcode` with a versioned header.
//!
//! Only runtime state is captured (tick, enabled flags in declaration
//! order, register values). The trigger graph itself is compiled, not
//! loaded, so a snapshot is restored onto an engine built from the same
//! graph.

use serde::{Deserialize, Serialize};

use crate::engine::Engine;

/// Magic number identifying a trigger engine snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x7F6E_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("snapshot has {found} triggers but the engine graph has {expected}")]
    TriggerCountMismatch { expected: usize, found: usize },
    #[error("snapshot has {found} registers but the engine bank has {expected}")]
    RegisterCountMismatch { expected: usize, found: usize },
}

/// Header prepended to every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EngineSnapshot {
    header: SnapshotHeader,
    enabled: Vec<bool>,
    registers: Vec<i32>,
    last_state_hash: u64,
}

impl Engine {
    /// Serialize the runtime state.
    pub fn snapshot(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = EngineSnapshot {
            header: SnapshotHeader::new(self.tick()),
            enabled: self
                .graph()
                .order()
                .iter()
                .map(|&id| self.is_enabled(id))
                .collect(),
            registers: self.registers().values().to_vec(),
            last_state_hash: self.state_hash(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Restore runtime state captured by [`Engine::snapshot`].
    ///
    /// Validation happens before any state is touched.
    pub fn restore(&mut self, data: &[u8]) -> Result<(), DeserializeError> {
        let snapshot: EngineSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        let expected = self.graph().len();
        if snapshot.enabled.len() != expected {
            return Err(DeserializeError::TriggerCountMismatch {
                expected,
                found: snapshot.enabled.len(),
            });
        }
        let expected = self.registers().len();
        if snapshot.registers.len() != expected {
            return Err(DeserializeError::RegisterCountMismatch {
                expected,
                found: snapshot.registers.len(),
            });
        }

        let order = self.graph().order().to_vec();
        let state = self.state_mut();
        for (id, flag) in order.into_iter().zip(snapshot.enabled) {
            state.enabled.insert(id, flag);
        }
        state.registers.load_values(&snapshot.registers);
        state.tick = snapshot.header.tick;
        state.last_state_hash = snapshot.last_state_hash;
        Ok(())
    }
}

/// Decode just the header, e.g. to check the version before restoring.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: EngineSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chance::ScriptedFlips;
    use crate::graph::TriggerGraph;
    use crate::host::IdleHost;
    use crate::register::RegisterBank;
    use crate::test_utils::*;

    fn engine() -> Engine {
        let mut g = TriggerGraph::new();
        let a = armed(&mut g, "A");
        let b = one_shot(&mut g, "B");
        g.activate(a, b).unwrap();
        let mut bank = RegisterBank::new();
        bank.declare("Score", 7).unwrap();
        Engine::new(g, bank)
    }

    #[test]
    fn restore_reproduces_state() {
        let mut e = engine();
        e.step(&mut IdleHost, &mut ScriptedFlips::default());
        let bytes = e.snapshot().unwrap();

        let mut fresh = engine();
        fresh.restore(&bytes).unwrap();
        assert_eq!(fresh.tick(), 1);
        assert_eq!(fresh.state_hash(), e.state_hash());
        assert_eq!(fresh.compute_state_hash(), e.compute_state_hash());
        assert_eq!(read_snapshot_header(&bytes).unwrap().tick, 1);
    }

    #[test]
    fn restore_rejects_other_graph() {
        let bytes = engine().snapshot().unwrap();
        let mut other = Engine::new(TriggerGraph::new(), RegisterBank::new());
        assert!(matches!(
            other.restore(&bytes),
            Err(DeserializeError::TriggerCountMismatch { expected: 0, found: 2 })
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            engine().restore(&[1, 2, 3]),
            Err(DeserializeError::Decode(_))
        ));
    }

    #[test]
    fn header_validation() {
        assert!(SnapshotHeader::new(0).validate().is_ok());
        let mut bad = SnapshotHeader::new(0);
        bad.magic = 0;
        assert!(matches!(bad.validate(), Err(DeserializeError::InvalidMagic(0))));
        let mut future = SnapshotHeader::new(0);
        future.version = FORMAT_VERSION + 1;
        assert!(matches!(future.validate(), Err(DeserializeError::FutureVersion(_))));
    }
}
