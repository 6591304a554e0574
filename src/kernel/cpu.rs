//! Current-core lookup.
//!
//! For the calling process this uses `sched_getcpu(3)`, the portable
//! kernel-provided form of the per-architecture `getcpu` raw call (vDSO on
//! the common targets, so usually no syscall at all). For any other process
//! the scheduler's answer is read from the last-scheduled-CPU field of
//! `/proc/<pid>/stat`.
use crate::kernel::procfs;
use crate::types::{ProcCtlError, Result};
use nix::errno::Errno;
use nix::unistd::{getpid, Pid};

/// Core the given process is currently (or was most recently) running on.
/// Pid 0 targets the caller.
pub fn current_core(pid: Pid) -> Result<usize> {
    if pid.as_raw() == 0 || pid == getpid() {
        // SAFETY: sched_getcpu takes no arguments and touches no memory.
        let core = unsafe { libc::sched_getcpu() };
        if core < 0 {
            return Err(ProcCtlError::Process(format!(
                "sched_getcpu failed: {}",
                Errno::last()
            )));
        }
        return Ok(core as usize);
    }
    Ok(procfs::stat(pid)?.processor)
}
