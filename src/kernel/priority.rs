//! Scheduling-priority (nice) queries and updates.
use crate::types::{ProcCtlError, Result};
use nix::errno::Errno;
use nix::unistd::Pid;

/// Current nice level of a process. Pid 0 targets the caller.
///
/// `getpriority` can legitimately return -1, so errno is cleared first and
/// consulted afterwards to tell the value from a failure.
pub fn nice(pid: Pid) -> Result<i32> {
    Errno::clear();
    // SAFETY: getpriority takes two integer arguments and touches no memory.
    let level =
        unsafe { libc::getpriority(libc::PRIO_PROCESS as _, pid.as_raw() as libc::id_t) };
    if level == -1 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error().unwrap_or(0) != 0 {
            return Err(ProcCtlError::Process(format!(
                "getpriority({}) failed: {}",
                pid, err
            )));
        }
    }
    Ok(level)
}

/// Set the nice level of a process. Lowering below 0 needs CAP_SYS_NICE.
pub fn set_nice(pid: Pid, level: i32) -> Result<()> {
    // SAFETY: setpriority takes three integer arguments and touches no memory.
    let rc =
        unsafe { libc::setpriority(libc::PRIO_PROCESS as _, pid.as_raw() as libc::id_t, level) };
    if rc < 0 {
        return Err(ProcCtlError::Process(format!(
            "setpriority({}, {}) failed: {}",
            pid,
            level,
            Errno::last()
        )));
    }
    Ok(())
}
