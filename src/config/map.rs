use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use csv::Writer;
use std::fmt;
use std::fs::{create_dir_all, File, OpenOptions};
use std::path::Path;
use std::time::Duration;

use super::harness::HarnessConfig;
use crate::error::{BenchError, Result};
use crate::MemSampler;

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy)]
pub enum DS {
    /// Sharded concurrent map.
    Sharded,
    /// `HashMap` behind a mutex.
    Mutex,
    /// `HashMap` behind a reader/writer lock.
    #[value(name = "rwlock")]
    RwLock,
}

impl DS {
    pub fn name(&self) -> String {
        self.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| format!("{self:?}"))
    }
}

pub struct Config {
    pub ds: DS,
    pub harness: HarnessConfig,
    pub iterations: u64,
    pub mem_sampler: Option<MemSampler>,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}, {} iterations",
            self.ds.name(),
            self.harness,
            self.iterations
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct Perf {
    pub ops_per_sec: u64,
    pub avg_elapsed: Duration,
    pub hit_ratio: f64,
    pub peak_mem: usize,
}

impl fmt::Display for Perf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ops/s: {}, avg run: {:?}, read hits: {:.1}%, peak mem: {}",
            self.ops_per_sec,
            self.avg_elapsed,
            self.hit_ratio * 100.0,
            readable_bytes(self.peak_mem),
        )
    }
}

fn readable_bytes(num: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    for (i, unit) in UNITS.iter().enumerate() {
        if num / 2usize.pow(i as u32 * 10) < 1000 {
            return format!("{:.3} {}", num as f64 / 2f64.powf(i as f64 * 10.0), unit);
        }
    }
    format!(
        "{:.3} GiB",
        num as f64 / 2f64.powf((UNITS.len() - 1) as f64 * 10.0)
    )
}

const HEADER: [&str; 13] = [
    "ds",
    "workers",
    "ops_per_worker",
    "initial_elements",
    "read_bias",
    "miss_read_bias",
    "new_writes_bias",
    "overwrite_bias",
    "seed",
    "iterations",
    "throughput",
    "avg_elapsed_ns",
    "peak_mem",
];

pub struct BenchWriter {
    output: Option<Writer<File>>,
}

impl BenchWriter {
    /// Appends to `path`, writing the header first if the file is new.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_dir_all(dir)?;
        }
        let output = match OpenOptions::new().read(true).append(true).open(path) {
            Ok(f) => csv::Writer::from_writer(f),
            Err(_) => {
                let f = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(path)?;
                let mut output = csv::Writer::from_writer(f);
                output.write_record(HEADER)?;
                output.flush()?;
                output
            }
        };
        Ok(Self {
            output: Some(output),
        })
    }

    pub fn disabled() -> Self {
        Self { output: None }
    }

    pub fn write_record(self, config: &Config, perf: &Perf) -> Result<()> {
        if let Some(mut output) = self.output {
            let h = &config.harness;
            output.write_record(&[
                config.ds.name(),
                h.workers.to_string(),
                h.ops_per_worker.to_string(),
                h.initial_elements.to_string(),
                h.read_bias.to_string(),
                h.miss_read_bias.to_string(),
                h.new_writes_bias.to_string(),
                h.overwrite_bias.to_string(),
                h.seed.map(|s| s.to_string()).unwrap_or_default(),
                config.iterations.to_string(),
                perf.ops_per_sec.to_string(),
                perf.avg_elapsed.as_nanos().to_string(),
                perf.peak_mem.to_string(),
            ])?;
            output.flush()?;
        }
        Ok(())
    }
}

pub fn command(name: &'static str) -> Command {
    Command::new(name)
        .arg(
            Arg::new("data structure")
                .short('d')
                .value_parser(value_parser!(DS))
                .required(true)
                .ignore_case(true)
                .help("Map backend under test"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .value_parser(value_parser!(usize))
                .help("Number of concurrent workers")
                .default_value("512"),
        )
        .arg(
            Arg::new("prefill")
                .short('p')
                .value_parser(value_parser!(usize))
                .help("Distinct keys stored before the workers start")
                .default_value("100000"),
        )
        .arg(
            Arg::new("ops")
                .short('n')
                .value_parser(value_parser!(u64))
                .help("Operations performed by each worker")
                .default_value("3000"),
        )
        .arg(
            Arg::new("read bias")
                .short('g')
                .value_parser(value_parser!(u64).range(0..=100))
                .help("Percent of operations that are loads")
                .default_value("90"),
        )
        .arg(
            Arg::new("miss read bias")
                .short('m')
                .value_parser(value_parser!(u64).range(0..=100))
                .help("Percent of loads that target a fresh random key")
                .default_value("10"),
        )
        .arg(
            Arg::new("new writes bias")
                .short('x')
                .value_parser(value_parser!(u64).range(0..=100))
                .help("Percent of stores that insert a fresh pair instead of overwriting")
                .default_value("90"),
        )
        .arg(
            Arg::new("overwrite bias")
                .short('r')
                .value_parser(value_parser!(u64).range(0..=100))
                .help("Percent of replayed stores that write a fresh value; disables read checks")
                .default_value("0"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .value_parser(value_parser!(u64))
                .help("Fixed master seed for every PRNG. Seeds from the clock if omitted."),
        )
        .arg(
            Arg::new("iterations")
                .short('i')
                .value_parser(value_parser!(u64).range(1..))
                .help("Measured runs; the map is shared across them")
                .default_value("5"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .help("Output CSV filename. Appends the data if the file already exists."),
        )
        .arg(
            Arg::new("dry run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Check whether the arguments are parsable, without running a benchmark"),
        )
}

fn required<T: Clone + Send + Sync + 'static>(m: &clap::ArgMatches, id: &str) -> Result<T> {
    m.get_one::<T>(id)
        .cloned()
        .ok_or_else(|| BenchError::Config(format!("missing argument `{id}`")))
}

/// Parses the command line. Returns `None` for `--dry-run`.
pub fn setup(name: &'static str) -> Result<Option<(Config, BenchWriter)>> {
    let m = command(name).get_matches();

    let harness = HarnessConfig {
        initial_elements: required(&m, "prefill")?,
        workers: required(&m, "workers")?,
        ops_per_worker: required(&m, "ops")?,
        read_bias: required(&m, "read bias")?,
        miss_read_bias: required(&m, "miss read bias")?,
        new_writes_bias: required(&m, "new writes bias")?,
        overwrite_bias: required(&m, "overwrite bias")?,
        seed: m.get_one::<u64>("seed").copied(),
    };
    harness.validate()?;

    let mem_sampler = MemSampler::new();
    let config = Config {
        ds: required(&m, "data structure")?,
        harness,
        iterations: required(&m, "iterations")?,
        mem_sampler,
    };

    if m.get_flag("dry run") {
        return Ok(None);
    }

    let output = match m.get_one::<String>("output") {
        Some(path) => BenchWriter::open(Path::new(path))?,
        None => BenchWriter::disabled(),
    };
    Ok(Some((config, output)))
}
