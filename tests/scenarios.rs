//! End-to-end runs of the harness against every backend.
//!
//! The full-size runs take a while; run them with `cargo test --release -- --ignored`.

use parking_lot::Mutex;
use std::collections::HashMap;

use cmap_benchmark::config::harness::HarnessConfig;
use cmap_benchmark::ds_impl::{ConcurrentMap, MutexMap, RwLockMap, ShardedMap};
use cmap_benchmark::harness::{run_iteration, RunReport, Stopwatch};
use cmap_benchmark::workload::{KeyValuePair, Prng, Scenario, WorkloadGenerator};

/// Wraps a backend and remembers every store that went through it.
struct Recording<M> {
    inner: M,
    stores: Mutex<Vec<KeyValuePair>>,
}

impl<M: ConcurrentMap> ConcurrentMap for Recording<M> {
    fn new() -> Self {
        Self {
            inner: M::new(),
            stores: Mutex::new(Vec::new()),
        }
    }

    fn load(&self, key: u64) -> Option<u64> {
        self.inner.load(key)
    }

    fn store(&self, key: u64, value: u64) {
        self.inner.store(key, value);
        self.stores.lock().push(KeyValuePair { key, value });
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<M> Recording<M> {
    /// Every `step`-th recorded key must load a value that some store wrote for it.
    fn assert_sampled_keys_hold_stored_values(&self, step: usize)
    where
        M: ConcurrentMap,
    {
        let stores = self.stores.lock();
        let mut written: HashMap<u64, Vec<u64>> = HashMap::new();
        for kv in stores.iter() {
            written.entry(kv.key).or_default().push(kv.value);
        }
        for kv in stores.iter().step_by(step) {
            let loaded = self
                .inner
                .load(kv.key)
                .unwrap_or_else(|| panic!("key {:#x} was stored but is missing", kv.key));
            assert!(
                written[&kv.key].contains(&loaded),
                "key {:#x} holds {loaded:#x}, which was never stored for it",
                kv.key
            );
        }
    }
}

fn run<M: ConcurrentMap>(map: &M, config: HarnessConfig) -> RunReport {
    run_iteration(map, &config, &mut Stopwatch::started()).unwrap()
}

#[test]
fn read_only_run_does_not_mutate() {
    let config = HarnessConfig {
        initial_elements: 5,
        workers: 2,
        ops_per_worker: 10,
        read_bias: 100,
        miss_read_bias: 0,
        new_writes_bias: 0,
        overwrite_bias: 0,
        seed: None,
    };
    let map = Recording::<MutexMap>::new();
    let report = run(&map, config);

    assert_eq!(report.prefilled, 5);
    assert_eq!(report.final_len, 5);
    assert_eq!(report.ops.stores, 0);
    assert_eq!(report.ops.loads, 20);
    assert_eq!(report.ops.hits, 20);

    let prefill = map.stores.lock();
    for kv in prefill.iter() {
        assert!(map.load(kv.key).is_some());
    }
}

#[test]
fn insert_only_run_keeps_every_store_readable() {
    let config = HarnessConfig {
        initial_elements: 0,
        workers: 4,
        ops_per_worker: 25,
        read_bias: 0,
        miss_read_bias: 10,
        new_writes_bias: 100,
        overwrite_bias: 0,
        seed: None,
    };
    let map = Recording::<ShardedMap>::new();
    let report = run(&map, config);

    assert_eq!(report.prefilled, 0);
    assert_eq!(report.ops.stores, 100);
    assert!(report.final_len <= 100);

    let stores = map.stores.lock();
    assert_eq!(stores.len(), 100);
    let mut writes_per_key: HashMap<u64, Vec<u64>> = HashMap::new();
    for kv in stores.iter() {
        writes_per_key.entry(kv.key).or_default().push(kv.value);
    }
    assert_eq!(writes_per_key.len(), report.final_len);
    for (key, values) in writes_per_key {
        let loaded = map.load(key).expect("stored key must be readable");
        assert!(values.contains(&loaded));
    }
}

#[test]
fn write_only_growth_is_bounded() {
    let config = HarnessConfig {
        initial_elements: 100,
        workers: 8,
        ops_per_worker: 50,
        read_bias: 0,
        miss_read_bias: 10,
        new_writes_bias: 50,
        overwrite_bias: 0,
        seed: None,
    };
    for report in [
        run(&ShardedMap::new(), config),
        run(&MutexMap::new(), config),
        run(&RwLockMap::new(), config),
    ] {
        assert_eq!(report.ops.stores, 400);
        assert!(report.final_len >= 100);
        assert!(report.final_len <= 100 + 400);
    }
}

#[test]
fn repeated_runs_share_the_map() {
    let config = HarnessConfig {
        initial_elements: 50,
        workers: 4,
        ops_per_worker: 20,
        read_bias: 50,
        miss_read_bias: 10,
        new_writes_bias: 90,
        overwrite_bias: 0,
        seed: None,
    };
    let map = RwLockMap::new();
    let first = run(&map, config);
    let second = run(&map, config);
    assert!(second.final_len >= first.final_len);
}

#[test]
fn concurrent_runs_keep_stored_values() {
    fn check<M: ConcurrentMap>() {
        let config = HarnessConfig {
            initial_elements: 2_000,
            workers: 32,
            ops_per_worker: 500,
            read_bias: 50,
            miss_read_bias: 10,
            new_writes_bias: 50,
            overwrite_bias: 0,
            seed: None,
        };
        let map = Recording::<M>::new();
        let report = run(&map, config);
        assert_eq!(report.ops.total(), 32 * 500);
        map.assert_sampled_keys_hold_stored_values(7);
    }
    check::<ShardedMap>();
    check::<MutexMap>();
    check::<RwLockMap>();
}

#[test]
fn concurrent_overwrites_keep_stored_values() {
    let config = HarnessConfig {
        initial_elements: 500,
        workers: 16,
        ops_per_worker: 400,
        read_bias: 30,
        miss_read_bias: 0,
        new_writes_bias: 0,
        overwrite_bias: 100,
        seed: None,
    };
    let map = Recording::<ShardedMap>::new();
    let report = run(&map, config);
    assert_eq!(report.final_len, 500);
    map.assert_sampled_keys_hold_stored_values(1);
}

#[test]
fn fixed_seed_reproduces_every_store() {
    let config = HarnessConfig {
        initial_elements: 100,
        workers: 1,
        ops_per_worker: 300,
        read_bias: 40,
        miss_read_bias: 10,
        new_writes_bias: 60,
        overwrite_bias: 20,
        seed: Some(2024),
    };
    let (a, b) = (Recording::<MutexMap>::new(), Recording::<MutexMap>::new());
    let report_a = run(&a, config);
    let report_b = run(&b, config);
    assert_eq!(report_a.ops, report_b.ops);
    assert_eq!(*a.stores.lock(), *b.stores.lock());

    let other = Recording::<MutexMap>::new();
    run(
        &other,
        HarnessConfig {
            seed: Some(2025),
            ..config
        },
    );
    assert_ne!(*a.stores.lock(), *other.stores.lock());
}

#[test]
fn identical_seeds_drive_identical_runs() {
    fn drive(map: &MutexMap) -> Vec<KeyValuePair> {
        let storage = vec![
            KeyValuePair { key: 1, value: 10 },
            KeyValuePair { key: 2, value: 20 },
        ];
        for kv in &storage {
            map.store(kv.key, kv.value);
        }
        let mut generator =
            WorkloadGenerator::new(Prng::new(77), Prng::new(78), 20, 60, storage).unwrap();
        let counts = Scenario::new(Prng::new(79))
            .run(map, 40, 1000, &mut generator)
            .unwrap();
        assert_eq!(counts.total(), 1000);
        generator.into_storage()
    }

    let (a, b) = (MutexMap::new(), MutexMap::new());
    let storage_a = drive(&a);
    let storage_b = drive(&b);
    assert_eq!(storage_a, storage_b);
    assert_eq!(a.len(), b.len());
    for kv in &storage_a {
        assert_eq!(a.load(kv.key), b.load(kv.key));
    }
}

#[test]
fn rejects_bias_over_100() {
    let config = HarnessConfig {
        new_writes_bias: 150,
        ..HarnessConfig::read_heavy()
    };
    let map = ShardedMap::new();
    assert!(run_iteration(&map, &config, &mut Stopwatch::started()).is_err());
    assert!(map.is_empty());
}

#[test]
#[ignore]
fn read_heavy_full_size() {
    let map = Recording::<RwLockMap>::new();
    let report = run(&map, HarnessConfig::read_heavy());
    assert_eq!(report.prefilled, 100_000);
    assert_eq!(report.ops.total(), 512 * 3000);
    assert!(report.final_len >= 100_000);
    map.assert_sampled_keys_hold_stored_values(101);
}

#[test]
#[ignore]
fn write_heavy_full_size() {
    let map = Recording::<ShardedMap>::new();
    let report = run(&map, HarnessConfig::write_heavy());
    assert!(report.final_len >= 100_000);
    assert!(report.final_len <= 100_000 + report.ops.stores as usize);
    map.assert_sampled_keys_hold_stored_values(101);
}

#[test]
#[ignore]
fn mutex_is_slower_than_rwlock_when_reading() {
    let balanced = HarnessConfig {
        read_bias: 50,
        ..HarnessConfig::read_heavy()
    };
    let report = run(&MutexMap::new(), balanced);
    assert_eq!(report.ops.total(), 512 * 3000);
    assert!(report.final_len >= 100_000);

    let mutex = run(&MutexMap::new(), HarnessConfig::read_heavy());
    let rwlock = run(&RwLockMap::new(), HarnessConfig::read_heavy());
    assert!(mutex.elapsed > rwlock.elapsed);
}
