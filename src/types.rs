/// Core types and error taxonomy for corepin operations
use serde::Serialize;
use thiserror::Error;

/// Custom error types for corepin
///
/// Single-target operations (limit query, signal delivery, core lookup)
/// propagate one of these immediately with the underlying OS error text
/// preserved. Per-process failures inside a bulk sweep are never surfaced
/// here; they are counted in [`SweepReport`].
#[derive(Error, Debug)]
pub enum ProcCtlError {
    #[error("process table scan failed: {0}")]
    Scan(String),

    #[error("cannot isolate: host has a single online core")]
    InsufficientCores,

    #[error("refusing to apply an empty cpu mask")]
    EmptyMask,

    #[error("limit query error: {0}")]
    Limit(String),

    #[error("signal delivery error: {0}")]
    Signal(String),

    #[error("affinity error: {0}")]
    Affinity(String),

    #[error("process error: {0}")]
    Process(String),
}

impl From<nix::errno::Errno> for ProcCtlError {
    fn from(err: nix::errno::Errno) -> Self {
        ProcCtlError::Process(err.to_string())
    }
}

/// Result type alias for corepin operations
pub type Result<T> = std::result::Result<T, ProcCtlError>;

/// Outcome of one bulk affinity sweep over the live process table.
///
/// `attempted == updated + failed` always holds. A nonzero `failed` count is
/// expected on a live host: processes exit mid-sweep (ESRCH), kernel threads
/// reject re-affinity (EINVAL), and other users' processes are off-limits
/// without CAP_SYS_NICE (EPERM). None of these abort the sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Processes the sweep tried to re-affine
    pub attempted: usize,
    /// Processes whose mask was updated
    pub updated: usize,
    /// Processes that could not be updated
    pub failed: usize,
}
