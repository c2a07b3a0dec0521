use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

/// Everything that can abort a benchmark iteration.
///
/// There is no local recovery: any of these marks the current run as failed.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A worker (and therefore a map backend) panicked while running.
    #[error("backend panicked during the measured run")]
    BackendPanic,

    /// A hit read returned something other than the value the worker stored.
    #[error("invalid content of the tested map: key {key:#x} expected {expected:#x}, found {found:?}")]
    InvalidContent {
        key: u64,
        expected: u64,
        found: Option<u64>,
    },

    #[error("setup failed: {0}")]
    Setup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Rejects percentages outside `[0, 100]`.
pub(crate) fn check_bias(name: &str, bias: u64) -> Result<()> {
    if bias > 100 {
        return Err(BenchError::Config(format!(
            "{name} should be no bigger than 100, got {bias}"
        )));
    }
    Ok(())
}
