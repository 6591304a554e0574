//! Resource-limit introspection for arbitrary processes via `prlimit(2)`.
use crate::types::{ProcCtlError, Result};
use nix::errno::Errno;
use nix::unistd::Pid;
use serde::Serialize;

/// One resource-limit kind, 1:1 with the kernel's `RLIMIT_*` enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    AddressSpace,
    CoreSize,
    CpuTime,
    DataSize,
    FileSize,
    Locks,
    LockedMemory,
    MessageQueue,
    Nice,
    OpenFiles,
    ProcessCount,
    ResidentSet,
    RealtimeTime,
    PendingSignals,
    Stack,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 15] = [
        ResourceKind::AddressSpace,
        ResourceKind::CoreSize,
        ResourceKind::CpuTime,
        ResourceKind::DataSize,
        ResourceKind::FileSize,
        ResourceKind::Locks,
        ResourceKind::LockedMemory,
        ResourceKind::MessageQueue,
        ResourceKind::Nice,
        ResourceKind::OpenFiles,
        ResourceKind::ProcessCount,
        ResourceKind::ResidentSet,
        ResourceKind::RealtimeTime,
        ResourceKind::PendingSignals,
        ResourceKind::Stack,
    ];

    /// The kernel's numeric value for this kind.
    pub fn as_raw(self) -> i32 {
        (match self {
            ResourceKind::AddressSpace => libc::RLIMIT_AS,
            ResourceKind::CoreSize => libc::RLIMIT_CORE,
            ResourceKind::CpuTime => libc::RLIMIT_CPU,
            ResourceKind::DataSize => libc::RLIMIT_DATA,
            ResourceKind::FileSize => libc::RLIMIT_FSIZE,
            ResourceKind::Locks => libc::RLIMIT_LOCKS,
            ResourceKind::LockedMemory => libc::RLIMIT_MEMLOCK,
            ResourceKind::MessageQueue => libc::RLIMIT_MSGQUEUE,
            ResourceKind::Nice => libc::RLIMIT_NICE,
            ResourceKind::OpenFiles => libc::RLIMIT_NOFILE,
            ResourceKind::ProcessCount => libc::RLIMIT_NPROC,
            ResourceKind::ResidentSet => libc::RLIMIT_RSS,
            ResourceKind::RealtimeTime => libc::RLIMIT_RTTIME,
            ResourceKind::PendingSignals => libc::RLIMIT_SIGPENDING,
            ResourceKind::Stack => libc::RLIMIT_STACK,
        }) as i32
    }

    /// Map a raw kernel value back to a kind.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_raw() == raw)
    }

    /// The kernel's `RLIMIT_*` constant name.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::AddressSpace => "RLIMIT_AS",
            ResourceKind::CoreSize => "RLIMIT_CORE",
            ResourceKind::CpuTime => "RLIMIT_CPU",
            ResourceKind::DataSize => "RLIMIT_DATA",
            ResourceKind::FileSize => "RLIMIT_FSIZE",
            ResourceKind::Locks => "RLIMIT_LOCKS",
            ResourceKind::LockedMemory => "RLIMIT_MEMLOCK",
            ResourceKind::MessageQueue => "RLIMIT_MSGQUEUE",
            ResourceKind::Nice => "RLIMIT_NICE",
            ResourceKind::OpenFiles => "RLIMIT_NOFILE",
            ResourceKind::ProcessCount => "RLIMIT_NPROC",
            ResourceKind::ResidentSet => "RLIMIT_RSS",
            ResourceKind::RealtimeTime => "RLIMIT_RTTIME",
            ResourceKind::PendingSignals => "RLIMIT_SIGPENDING",
            ResourceKind::Stack => "RLIMIT_STACK",
        }
    }
}

/// Soft and hard limit for one (process, kind) pair.
///
/// `current <= maximum` is kernel-enforced; this crate assumes it and does
/// not re-validate.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct LimitPair {
    pub current: u64,
    pub maximum: u64,
}

/// Read both limits for one kind of one process. Pid 0 targets the caller.
pub fn query(pid: Pid, kind: ResourceKind) -> Result<LimitPair> {
    let mut rl = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: a null new-limit pointer makes prlimit read-only; rl is a
    // valid out pointer for the duration of the call.
    let rc = unsafe {
        libc::prlimit(
            pid.as_raw(),
            kind.as_raw() as _,
            std::ptr::null(),
            &mut rl,
        )
    };
    if rc < 0 {
        return Err(ProcCtlError::Limit(format!(
            "prlimit({}, {}) failed: {}",
            pid,
            kind.name(),
            Errno::last()
        )));
    }
    Ok(LimitPair {
        current: rl.rlim_cur,
        maximum: rl.rlim_max,
    })
}

/// Soft (currently enforced) limit.
pub fn current_limit(pid: Pid, kind: ResourceKind) -> Result<u64> {
    Ok(query(pid, kind)?.current)
}

/// Hard (maximum raisable) limit.
pub fn maximum_limit(pid: Pid, kind: ResourceKind) -> Result<u64> {
    Ok(query(pid, kind)?.maximum)
}
