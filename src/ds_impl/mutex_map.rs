use parking_lot::Mutex;
use std::collections::HashMap;

use super::concurrent_map::ConcurrentMap;

/// A `HashMap` behind one exclusive lock, taken by reads and writes alike.
#[derive(Debug, Default)]
pub struct MutexMap {
    inner: Mutex<HashMap<u64, u64>>,
}

impl MutexMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConcurrentMap for MutexMap {
    fn new() -> Self {
        Self::new()
    }

    #[inline(always)]
    fn load(&self, key: u64) -> Option<u64> {
        self.inner.lock().get(&key).copied()
    }

    #[inline(always)]
    fn store(&self, key: u64, value: u64) {
        self.inner.lock().insert(key, value);
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}
