//! Flat call surface for language bindings.
//!
//! Raw-integer parameters, the original call names, and one error type whose
//! `Display` carries the OS error text: exactly what an interpreter binding
//! layer needs to marshal. The typed equivalents live in [`crate::kernel`]
//! and [`crate::isolation`]; everything here is a thin adapter over them.
use crate::isolation;
use crate::kernel::{affinity, cpu, limits, priority, signal};
use crate::kernel::limits::ResourceKind;
use crate::types::{ProcCtlError, Result};
use nix::unistd::Pid;

fn kind(resource: i32) -> Result<ResourceKind> {
    ResourceKind::from_raw(resource)
        .ok_or_else(|| ProcCtlError::Limit(format!("unknown resource kind {}", resource)))
}

/// Soft (currently enforced) limit of `resource` for `pid` (0 = caller).
pub fn curlimit(pid: i32, resource: i32) -> Result<u64> {
    limits::current_limit(Pid::from_raw(pid), kind(resource)?)
}

/// Hard (maximum raisable) limit of `resource` for `pid` (0 = caller).
pub fn maxlimit(pid: i32, resource: i32) -> Result<u64> {
    limits::maximum_limit(Pid::from_raw(pid), kind(resource)?)
}

/// Isolate `pid` on core 0 and evacuate every other process.
pub fn isoproc(pid: i32) -> Result<()> {
    isolation::isolate(Pid::from_raw(pid)).map(|_| ())
}

/// Restore full-mask affinity to every process on the host.
pub fn relproc(pid: i32) -> Result<()> {
    isolation::release(Pid::from_raw(pid)).map(|_| ())
}

/// Number of cores in `pid`'s current affinity mask.
pub fn procaff(pid: i32) -> Result<i32> {
    affinity::affinity_count(Pid::from_raw(pid)).map(|count| count as i32)
}

/// Core `pid` is currently running on.
pub fn getcpu(pid: i32) -> Result<i32> {
    cpu::current_core(Pid::from_raw(pid)).map(|core| core as i32)
}

/// Send `sig` to thread `tid` of thread group `tgid`.
pub fn tkill(tgid: i32, tid: i32, sig: i32) -> Result<()> {
    signal::tgkill(Pid::from_raw(tgid), Pid::from_raw(tid), sig)
}

/// Current nice level of `pid` (0 = caller).
pub fn nice(pid: i32) -> Result<i32> {
    priority::nice(Pid::from_raw(pid))
}

/// Set the nice level of `pid`.
pub fn setnice(pid: i32, level: i32) -> Result<()> {
    priority::set_nice(Pid::from_raw(pid), level)
}

/// Stable named constants mirroring the host kernel's own numbering.
pub mod consts {
    pub const RLIMIT_AS: i32 = libc::RLIMIT_AS as i32;
    pub const RLIMIT_CORE: i32 = libc::RLIMIT_CORE as i32;
    pub const RLIMIT_CPU: i32 = libc::RLIMIT_CPU as i32;
    pub const RLIMIT_DATA: i32 = libc::RLIMIT_DATA as i32;
    pub const RLIMIT_FSIZE: i32 = libc::RLIMIT_FSIZE as i32;
    pub const RLIMIT_LOCKS: i32 = libc::RLIMIT_LOCKS as i32;
    pub const RLIMIT_MEMLOCK: i32 = libc::RLIMIT_MEMLOCK as i32;
    pub const RLIMIT_MSGQUEUE: i32 = libc::RLIMIT_MSGQUEUE as i32;
    pub const RLIMIT_NICE: i32 = libc::RLIMIT_NICE as i32;
    pub const RLIMIT_NOFILE: i32 = libc::RLIMIT_NOFILE as i32;
    pub const RLIMIT_NPROC: i32 = libc::RLIMIT_NPROC as i32;
    pub const RLIMIT_RSS: i32 = libc::RLIMIT_RSS as i32;
    pub const RLIMIT_RTTIME: i32 = libc::RLIMIT_RTTIME as i32;
    pub const RLIMIT_SIGPENDING: i32 = libc::RLIMIT_SIGPENDING as i32;
    pub const RLIMIT_STACK: i32 = libc::RLIMIT_STACK as i32;

    pub const SIGHUP: i32 = libc::SIGHUP;
    pub const SIGINT: i32 = libc::SIGINT;
    pub const SIGQUIT: i32 = libc::SIGQUIT;
    pub const SIGABRT: i32 = libc::SIGABRT;
    pub const SIGKILL: i32 = libc::SIGKILL;
    pub const SIGTERM: i32 = libc::SIGTERM;
    pub const SIGSTOP: i32 = libc::SIGSTOP;
}
