//! Per-thread signal delivery via the raw `tgkill(2)` syscall.
//!
//! `tgkill` is distinct from whole-process signaling: it addresses one
//! thread inside a thread group, and the tgid check keeps the signal from
//! landing on a recycled thread id in some other process. libc carries the
//! per-architecture syscall number, so no numeric table lives here.
use crate::types::{ProcCtlError, Result};
use nix::errno::Errno;
use nix::unistd::Pid;

/// Send `signal` to thread `tid` of thread group `tgid`.
///
/// Single-shot: no retry state is kept. Signal 0 performs the kernel's
/// existence and permission checks without delivering anything.
pub fn tgkill(tgid: Pid, tid: Pid, signal: i32) -> Result<()> {
    // SAFETY: tgkill takes three integer arguments and touches no memory.
    let rc = unsafe {
        libc::syscall(
            libc::SYS_tgkill,
            tgid.as_raw() as libc::c_long,
            tid.as_raw() as libc::c_long,
            signal as libc::c_long,
        )
    };
    if rc < 0 {
        return Err(ProcCtlError::Signal(format!(
            "tgkill({}, {}, {}) failed: {}",
            tgid,
            tid,
            signal,
            Errno::last()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::procfs;
    use nix::unistd::getpid;

    #[test]
    fn signal_zero_probe_to_self_succeeds() {
        let tgid = getpid();
        let tids = procfs::tids(tgid).unwrap();
        assert!(tids.contains(&tgid), "main thread id should equal the pid");
        assert!(tgkill(tgid, tgid, 0).is_ok());
    }

    #[test]
    fn invalid_tid_reports_os_error() {
        // tid 0 is rejected by the kernel before any delivery
        let err = tgkill(getpid(), Pid::from_raw(0), 0).unwrap_err();
        assert!(matches!(err, ProcCtlError::Signal(_)));
        assert!(!err.to_string().is_empty());
    }
}
