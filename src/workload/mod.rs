pub mod generator;
pub mod rng;
pub mod scenario;

pub use generator::{KeyValuePair, WorkloadGenerator};
pub use rng::Prng;
pub use scenario::{OpCounts, Scenario};
