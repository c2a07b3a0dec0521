use super::rng::Prng;
use crate::error::{check_bias, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyValuePair {
    pub key: u64,
    pub value: u64,
}

/// Stateful source of keys and values for one worker.
///
/// Reads either hit a key from the generator's own history or, with probability
/// `miss_read_bias`%, a fresh random key. Writes either replay a remembered pair or,
/// with probability `new_writes_bias`%, a fresh one. A replayed pair gets a fresh value
/// with probability `overwrite_bias`%. Every written pair is appended to the history,
/// which only ever grows.
#[derive(Debug)]
pub struct WorkloadGenerator {
    data: Prng,
    miss: Prng,
    storage: Vec<KeyValuePair>,
    miss_read_bias: u64,
    new_writes_bias: u64,
    overwrite_bias: u64,
}

impl WorkloadGenerator {
    pub fn new(
        data: Prng,
        miss: Prng,
        miss_read_bias: u64,
        new_writes_bias: u64,
        storage: Vec<KeyValuePair>,
    ) -> Result<Self> {
        check_bias("miss_read_bias", miss_read_bias)?;
        check_bias("new_writes_bias", new_writes_bias)?;
        Ok(Self {
            data,
            miss,
            storage,
            miss_read_bias,
            new_writes_bias,
            overwrite_bias: 0,
        })
    }

    pub fn with_overwrite_bias(mut self, overwrite_bias: u64) -> Result<Self> {
        check_bias("overwrite_bias", overwrite_bias)?;
        self.overwrite_bias = overwrite_bias;
        Ok(self)
    }

    /// Generator producing only fresh random pairs. Used for prefilling.
    pub fn random_inserts(data: Prng, miss: Prng) -> Self {
        Self {
            data,
            miss,
            storage: Vec::new(),
            miss_read_bias: 100,
            new_writes_bias: 100,
            overwrite_bias: 0,
        }
    }

    /// Without overwrites every key keeps the value it was first written with, so a
    /// hit read can be checked against the history.
    pub fn values_are_stable(&self) -> bool {
        self.overwrite_bias == 0
    }

    fn bernoulli(&mut self, bias: u64) -> bool {
        (self.miss.intn(100) as u64) < bias
    }

    fn pick(&mut self) -> Option<KeyValuePair> {
        if self.storage.is_empty() {
            return None;
        }
        let ix = self.data.intn(self.storage.len());
        Some(self.storage[ix])
    }

    pub fn get_index(&mut self) -> u64 {
        self.get_index_and_expected().0
    }

    /// Like `get_index`, plus the value remembered for the key when it came from the
    /// history.
    pub fn get_index_and_expected(&mut self) -> (u64, Option<u64>) {
        if self.bernoulli(self.miss_read_bias) {
            (self.data.uint64(), None)
        } else {
            match self.pick() {
                Some(kv) => (kv.key, Some(kv.value)),
                None => (0, None),
            }
        }
    }

    pub fn get_index_and_value(&mut self) -> (u64, u64) {
        let pair = if self.bernoulli(self.new_writes_bias) {
            KeyValuePair {
                key: self.data.uint64(),
                value: self.data.uint64(),
            }
        } else {
            let mut pair = self.pick().unwrap_or_default();
            if self.overwrite_bias > 0 && self.bernoulli(self.overwrite_bias) {
                pair.value = self.data.uint64();
            }
            pair
        };
        self.storage.push(pair);
        (pair.key, pair.value)
    }

    pub fn storage(&self) -> &[KeyValuePair] {
        &self.storage
    }

    pub fn into_storage(self) -> Vec<KeyValuePair> {
        self.storage
    }
}
