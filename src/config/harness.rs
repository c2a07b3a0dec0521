use std::fmt;

use crate::error::{check_bias, BenchError, Result};

pub const INITIAL_ELEMS_COUNT: usize = 100_000;
pub const NUMBER_OF_WORKERS: usize = 512;
pub const NUMBER_OF_MAP_OPERATIONS: u64 = 3_000;
pub const READ_HEAVY_BIAS: u64 = 90;
pub const WRITE_HEAVY_BIAS: u64 = 10;
pub const MISS_READS_BIAS: u64 = 10;
pub const NEW_WRITES_BIAS: u64 = 90;
pub const OVERWRITES_BIAS: u64 = 0;

/// Parameters of one measured run. Fixed for the run's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Distinct keys stored before the workers start.
    pub initial_elements: usize,
    pub workers: usize,
    pub ops_per_worker: u64,
    /// Percent of operations that are loads.
    pub read_bias: u64,
    /// Percent of loads aimed at a fresh random key.
    pub miss_read_bias: u64,
    /// Percent of stores inserting a fresh pair instead of replaying a known one.
    pub new_writes_bias: u64,
    /// Percent of replayed stores that write a fresh value for the known key. Hit
    /// reads are only checked against stored values while this is 0.
    pub overwrite_bias: u64,
    /// Master seed for every PRNG of a run. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::read_heavy()
    }
}

impl HarnessConfig {
    pub fn read_heavy() -> Self {
        Self {
            initial_elements: INITIAL_ELEMS_COUNT,
            workers: NUMBER_OF_WORKERS,
            ops_per_worker: NUMBER_OF_MAP_OPERATIONS,
            read_bias: READ_HEAVY_BIAS,
            miss_read_bias: MISS_READS_BIAS,
            new_writes_bias: NEW_WRITES_BIAS,
            overwrite_bias: OVERWRITES_BIAS,
            seed: None,
        }
    }

    pub fn write_heavy() -> Self {
        Self {
            read_bias: WRITE_HEAVY_BIAS,
            ..Self::read_heavy()
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_bias("read_bias", self.read_bias)?;
        check_bias("miss_read_bias", self.miss_read_bias)?;
        check_bias("new_writes_bias", self.new_writes_bias)?;
        check_bias("overwrite_bias", self.overwrite_bias)?;
        if self.workers == 0 {
            return Err(BenchError::Config("workers should be at least 1".into()));
        }
        Ok(())
    }

    pub fn total_ops(&self) -> u64 {
        self.ops_per_worker * self.workers as u64
    }
}

impl fmt::Display for HarnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} workers x {} ops, p{}, g{}, m{}, x{}, r{}",
            self.workers,
            self.ops_per_worker,
            self.initial_elements,
            self.read_bias,
            self.miss_read_bias,
            self.new_writes_bias,
            self.overwrite_bias,
        )?;
        if let Some(seed) = self.seed {
            write!(f, ", seed {seed}")?;
        }
        Ok(())
    }
}
