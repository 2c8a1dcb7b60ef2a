/// Deterministic FNV-1a hash of engine state, compared across runs to
/// detect divergence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write(&[v as u8]);
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_input_same_hash() {
        let mut a = StateHash::new();
        a.write_u64(42);
        a.write_bool(true);
        let mut b = StateHash::new();
        b.write_u64(42);
        b.write_bool(true);
        assert_eq!(a.finish(), b.finish());
    }

    #[test]
    fn flag_order_matters() {
        let mut a = StateHash::new();
        a.write_bool(true);
        a.write_bool(false);
        let mut b = StateHash::new();
        b.write_bool(false);
        b.write_bool(true);
        assert_ne!(a.finish(), b.finish());
    }
}
