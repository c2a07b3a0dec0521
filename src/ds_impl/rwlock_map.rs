use parking_lot::RwLock;
use std::collections::HashMap;

use super::concurrent_map::ConcurrentMap;

/// A `HashMap` behind a reader/writer lock. Loads share the lock, stores own it.
#[derive(Debug, Default)]
pub struct RwLockMap {
    inner: RwLock<HashMap<u64, u64>>,
}

impl RwLockMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConcurrentMap for RwLockMap {
    fn new() -> Self {
        Self::new()
    }

    #[inline(always)]
    fn load(&self, key: u64) -> Option<u64> {
        self.inner.read().get(&key).copied()
    }

    #[inline(always)]
    fn store(&self, key: u64, value: u64) {
        self.inner.write().insert(key, value);
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}
