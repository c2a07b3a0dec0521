/// A `u64 -> u64` map that synchronizes itself.
///
/// A `store` that happens-before a `load` of the same key is always visible to it.
/// A `load` racing with a `store` observes either the previous or the new value.
pub trait ConcurrentMap: Send + Sync {
    fn new() -> Self
    where
        Self: Sized;
    fn load(&self, key: u64) -> Option<u64>;
    fn store(&self, key: u64, value: u64);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(value, present)`, with `(0, false)` for a missing key.
    fn load_or_default(&self, key: u64) -> (u64, bool) {
        match self.load(key) {
            Some(value) => (value, true),
            None => (0, false),
        }
    }
}
