use super::generator::WorkloadGenerator;
use super::rng::Prng;
use crate::ds_impl::ConcurrentMap;
use crate::error::{check_bias, BenchError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub loads: u64,
    pub hits: u64,
    pub stores: u64,
}

impl OpCounts {
    pub fn total(&self) -> u64 {
        self.loads + self.stores
    }

    pub fn merge(&mut self, other: OpCounts) {
        self.loads += other.loads;
        self.hits += other.hits;
        self.stores += other.stores;
    }
}

/// Picks read or write for each operation and forwards it to the map.
///
/// While the generator's values are stable, every read of a remembered key must
/// return the remembered value.
#[derive(Debug)]
pub struct Scenario {
    op_rng: Prng,
}

impl Scenario {
    pub fn new(op_rng: Prng) -> Self {
        Self { op_rng }
    }

    pub fn run<M: ConcurrentMap + ?Sized>(
        &mut self,
        map: &M,
        read_bias: u64,
        count: u64,
        generator: &mut WorkloadGenerator,
    ) -> Result<OpCounts> {
        check_bias("read_bias", read_bias)?;

        let verify = generator.values_are_stable();
        let mut counts = OpCounts::default();
        for _ in 0..count {
            if (self.op_rng.intn(100) as u64) < read_bias {
                counts.loads += 1;
                let (key, expected) = generator.get_index_and_expected();
                let found = map.load(key);
                if found.is_some() {
                    counts.hits += 1;
                }
                match expected {
                    Some(expected) if verify && found != Some(expected) => {
                        return Err(BenchError::InvalidContent {
                            key,
                            expected,
                            found,
                        });
                    }
                    _ => {}
                }
            } else {
                let (key, value) = generator.get_index_and_value();
                map.store(key, value);
                counts.stores += 1;
            }
        }
        Ok(counts)
    }
}
