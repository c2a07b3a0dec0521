use dashmap::DashMap;

use super::concurrent_map::ConcurrentMap;

/// Striped map: keys hash into independently locked shards, so readers of one
/// shard never wait on a writer in another.
#[derive(Debug, Default)]
pub struct ShardedMap {
    inner: DashMap<u64, u64>,
}

impl ShardedMap {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }
}

impl ConcurrentMap for ShardedMap {
    fn new() -> Self {
        Self::new()
    }

    #[inline(always)]
    fn load(&self, key: u64) -> Option<u64> {
        self.inner.get(&key).map(|v| *v)
    }

    #[inline(always)]
    fn store(&self, key: u64, value: u64) {
        self.inner.insert(key, value);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
