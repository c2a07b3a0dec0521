//! Multi-worker load/store run against a shared map.
//!
//! One iteration prefills the map, lets every worker build its generator, parks the
//! workers behind a [`StartSignal`], releases them all at once and waits for every
//! worker to finish its operations. Only the part between the release and the last
//! worker finishing is timed.

pub mod signal;
pub mod timing;

use crossbeam_utils::sync::WaitGroup;
use crossbeam_utils::thread::scope;
use scopeguard::defer;
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::config::harness::HarnessConfig;
use crate::ds_impl::ConcurrentMap;
use crate::error::{BenchError, Result};
use crate::workload::{KeyValuePair, OpCounts, Prng, Scenario, WorkloadGenerator};

pub use self::signal::StartSignal;
pub use self::timing::{Stopwatch, TimingGate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    Idle,
    Populating,
    Ready,
    Running,
    Done,
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarnessState::Idle => "idle",
            HarnessState::Populating => "populating",
            HarnessState::Ready => "ready",
            HarnessState::Running => "running",
            HarnessState::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Wall time from releasing the workers until the last one finished.
    pub elapsed: Duration,
    pub ops: OpCounts,
    /// Distinct keys stored during prefill.
    pub prefilled: usize,
    /// Map size once every worker is done.
    pub final_len: usize,
}

/// Where each iteration's PRNG seeds come from.
#[derive(Debug)]
enum SeedSource {
    Clock,
    /// Every seed is drawn from one master generator, so a fixed master seed
    /// reproduces the whole iteration's workload.
    Fixed(Prng),
}

impl SeedSource {
    fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => SeedSource::Fixed(Prng::new(seed)),
            None => SeedSource::Clock,
        }
    }

    fn next(&mut self, offset: u64) -> Prng {
        match self {
            SeedSource::Clock => Prng::from_clock(offset),
            SeedSource::Fixed(master) => Prng::new(master.uint64()),
        }
    }
}

/// Per-worker PRNGs, drawn before any worker is spawned.
struct WorkerSeeds {
    data: Prng,
    miss: Prng,
    op: Prng,
}

pub struct Harness {
    config: HarnessConfig,
    state: HarnessState,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: HarnessState::Idle,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    fn transition(&mut self, next: HarnessState) {
        debug!(from = %self.state, to = %next, "harness state");
        self.state = next;
    }

    /// Runs one measured iteration. `gate` is paused for everything but the timed part
    /// and left paused on return.
    pub fn run<M, T>(&mut self, map: &M, gate: &mut T) -> Result<RunReport>
    where
        M: ConcurrentMap + ?Sized,
        T: TimingGate + ?Sized,
    {
        gate.pause_timing();
        let result = self.run_inner(map, gate);
        gate.pause_timing();
        self.transition(HarnessState::Idle);
        result
    }

    fn run_inner<M, T>(&mut self, map: &M, gate: &mut T) -> Result<RunReport>
    where
        M: ConcurrentMap + ?Sized,
        T: TimingGate + ?Sized,
    {
        let config = self.config;
        self.transition(HarnessState::Populating);

        let mut seeds = SeedSource::new(config.seed);
        let mut init = WorkloadGenerator::random_inserts(seeds.next(1), seeds.next(2));
        let prefilled = prefill(map, config.initial_elements, &mut init);
        debug!(
            prefilled,
            generated = init.storage().len(),
            "prefilled"
        );
        self.transition(HarnessState::Ready);

        let snapshot = snapshot(init.storage(), config.ops_per_worker)?;
        let worker_seeds: Vec<_> = (0..config.workers as u64)
            .map(|w| {
                let offset = 3 * (w + 1);
                WorkerSeeds {
                    data: seeds.next(offset),
                    miss: seeds.next(offset + 1),
                    op: seeds.next(offset + 2),
                }
            })
            .collect();
        let signal = &StartSignal::new();
        let ready = WaitGroup::new();
        let done = WaitGroup::new();

        let (elapsed, joined) = scope(|s| {
            // Workers must never stay parked if this closure bails out early.
            defer! { signal.release(); }

            let snapshot = &snapshot;
            let handles: Vec<_> = worker_seeds
                .into_iter()
                .enumerate()
                .map(|(w, seeds)| {
                    let ready = ready.clone();
                    let done = done.clone();
                    s.spawn(move |_| -> Result<OpCounts> {
                        let _done = done;
                        let storage = self::snapshot(snapshot, config.ops_per_worker)?;
                        let mut generator = WorkloadGenerator::new(
                            seeds.data,
                            seeds.miss,
                            config.miss_read_bias,
                            config.new_writes_bias,
                            storage,
                        )?
                        .with_overwrite_bias(config.overwrite_bias)?;
                        let mut scenario = Scenario::new(seeds.op);

                        drop(ready);
                        signal.wait();
                        let counts = scenario.run(
                            map,
                            config.read_bias,
                            config.ops_per_worker,
                            &mut generator,
                        )?;
                        trace!(worker = w, ?counts, "worker finished");
                        Ok(counts)
                    })
                })
                .collect();

            // Setup stays outside the timed window.
            ready.wait();
            self.transition(HarnessState::Running);
            gate.resume_timing();
            let start = Instant::now();
            signal.release();
            done.wait();
            let elapsed = start.elapsed();
            gate.pause_timing();
            self.transition(HarnessState::Done);

            let joined: Vec<_> = handles.into_iter().map(|h| h.join()).collect();
            (elapsed, joined)
        })
        .map_err(|_| BenchError::BackendPanic)?;

        let mut ops = OpCounts::default();
        for worker in joined {
            ops.merge(worker.map_err(|_| BenchError::BackendPanic)??);
        }

        Ok(RunReport {
            elapsed,
            ops,
            prefilled,
            final_len: map.len(),
        })
    }
}

/// Convenience wrapper for a single run with a fresh [`Harness`].
pub fn run_iteration<M, T>(map: &M, config: &HarnessConfig, gate: &mut T) -> Result<RunReport>
where
    M: ConcurrentMap + ?Sized,
    T: TimingGate + ?Sized,
{
    Harness::new(*config)?.run(map, gate)
}

/// Stores pairs from `generator` until `target` distinct keys went in. Returns the
/// distinct count.
pub fn prefill<M: ConcurrentMap + ?Sized>(
    map: &M,
    target: usize,
    generator: &mut WorkloadGenerator,
) -> usize {
    let mut keys = HashSet::with_capacity(target);
    while keys.len() < target {
        let (key, value) = generator.get_index_and_value();
        map.store(key, value);
        keys.insert(key);
    }
    keys.len()
}

/// Copies `storage` into a buffer with room for `ops` more pairs.
pub fn snapshot(storage: &[KeyValuePair], ops: u64) -> Result<Vec<KeyValuePair>> {
    let wanted = usize::try_from(ops)
        .ok()
        .and_then(|ops| storage.len().checked_add(ops))
        .ok_or_else(|| {
            BenchError::Setup(format!(
                "worker storage: {} pairs plus {ops} ops overflows",
                storage.len()
            ))
        })?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(wanted)
        .map_err(|e| BenchError::Setup(format!("worker storage: {e}")))?;
    buffer.extend_from_slice(storage);
    Ok(buffer)
}
