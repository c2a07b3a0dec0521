use std::cmp::max;
use std::process::exit;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cmap_benchmark::config::map::{setup, BenchWriter, Config, Perf, DS};
use cmap_benchmark::ds_impl::{ConcurrentMap, MutexMap, RwLockMap, ShardedMap};
use cmap_benchmark::harness::{Harness, Stopwatch};
use cmap_benchmark::workload::OpCounts;
use cmap_benchmark::Result;

#[cfg(target_os = "linux")]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let result = setup("cmap-benchmark").and_then(|parsed| match parsed {
        Some((config, output)) => bench(&config, output),
        None => Ok(()),
    });
    if let Err(e) = result {
        eprintln!("error: {e}");
        exit(1);
    }
}

fn bench(config: &Config, output: BenchWriter) -> Result<()> {
    println!("{}", config);
    let perf = match config.ds {
        DS::Sharded => bench_map::<ShardedMap>(config)?,
        DS::Mutex => bench_map::<MutexMap>(config)?,
        DS::RwLock => bench_map::<RwLockMap>(config)?,
    };
    output.write_record(config, &perf)?;
    println!("{}", perf);
    Ok(())
}

/// Runs every iteration against one map, as consecutive runner iterations would.
fn bench_map<M: ConcurrentMap>(config: &Config) -> Result<Perf> {
    let map = M::new();
    let mut harness = Harness::new(config.harness)?;

    let mut measured = Duration::ZERO;
    let mut ops = OpCounts::default();
    let mut peak_mem = 0;
    for iteration in 0..config.iterations {
        let mut stopwatch = Stopwatch::started();
        let report = harness.run(&map, &mut stopwatch)?;
        measured += stopwatch.finish();
        ops.merge(report.ops);
        if let Some(sampler) = &config.mem_sampler {
            peak_mem = max(peak_mem, sampler.sample());
        }
        info!(
            iteration,
            elapsed = ?report.elapsed,
            prefilled = report.prefilled,
            len = report.final_len,
            "iteration done"
        );
    }
    println!("end");

    let secs = measured.as_secs_f64();
    Ok(Perf {
        ops_per_sec: if secs > 0.0 {
            (ops.total() as f64 / secs) as u64
        } else {
            0
        },
        avg_elapsed: measured / config.iterations as u32,
        hit_ratio: if ops.loads > 0 {
            ops.hits as f64 / ops.loads as f64
        } else {
            0.0
        },
        peak_mem,
    })
}
