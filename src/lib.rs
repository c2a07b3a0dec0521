#[macro_use]
extern crate cfg_if;

pub mod config;
pub mod ds_impl;
pub mod error;
pub mod harness;
pub mod workload;

pub use error::{BenchError, Result};

cfg_if! {
    if #[cfg(target_os = "linux")] {
        /// Reads jemalloc's `stats.allocated`.
        pub struct MemSampler {
            epoch_mib: tikv_jemalloc_ctl::epoch_mib,
            allocated_mib: tikv_jemalloc_ctl::stats::allocated_mib,
        }
        impl MemSampler {
            pub fn new() -> Option<Self> {
                Some(MemSampler {
                    epoch_mib: tikv_jemalloc_ctl::epoch::mib().ok()?,
                    allocated_mib: tikv_jemalloc_ctl::stats::allocated::mib().ok()?,
                })
            }
            pub fn sample(&self) -> usize {
                if self.epoch_mib.advance().is_err() {
                    return 0;
                }
                self.allocated_mib.read().unwrap_or(0)
            }
        }
    } else {
        pub struct MemSampler {}
        impl MemSampler {
            pub fn new() -> Option<Self> {
                tracing::info!("memory sampling is supported only on linux");
                Some(MemSampler {})
            }
            pub fn sample(&self) -> usize {
                0
            }
        }
    }
}
