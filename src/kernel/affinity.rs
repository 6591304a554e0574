//! CPU-affinity mask construction and application.
//!
//! Masks are `nix::sched::CpuSet` values. The one invariant enforced here:
//! an empty mask is rejected before any kernel call, since applying it would
//! leave the target unschedulable (the kernel reports EINVAL, but by then
//! the caller intent was already wrong).
use crate::types::{ProcCtlError, Result};
use nix::sched::{sched_getaffinity, sched_setaffinity, CpuSet};
use nix::unistd::Pid;

/// Number of cores currently online.
///
/// Read fresh on every call, never cached: container throttling and CPU
/// hot-plug can change it between calls. `std::thread::available_parallelism`
/// is not usable here because it honors the calling process's own affinity
/// mask, which a prior isolation may have narrowed to one core.
pub fn online_cores() -> Result<usize> {
    // SAFETY: sysconf takes no pointers and has no side effects.
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n < 1 {
        return Err(ProcCtlError::Affinity(format!(
            "cannot determine online core count: {}",
            nix::errno::Errno::last()
        )));
    }
    Ok(n as usize)
}

/// Mask containing exactly one core.
pub fn single(core: usize) -> Result<CpuSet> {
    range(core, core + 1)
}

/// Mask containing cores `first..end`.
pub fn range(first: usize, end: usize) -> Result<CpuSet> {
    let mut set = CpuSet::new();
    for core in first..end {
        set.set(core)?;
    }
    Ok(set)
}

/// Mask covering every online core, per a fresh core-count read.
pub fn full() -> Result<CpuSet> {
    range(0, online_cores()?)
}

/// Number of cores present in a mask.
pub fn cardinality(set: &CpuSet) -> usize {
    (0..CpuSet::count())
        .filter(|&core| set.is_set(core).unwrap_or(false))
        .count()
}

/// Apply an affinity mask to one process. Pid 0 targets the caller.
pub fn set_affinity(pid: Pid, set: &CpuSet) -> Result<()> {
    if cardinality(set) == 0 {
        return Err(ProcCtlError::EmptyMask);
    }
    sched_setaffinity(pid, set).map_err(|e| {
        ProcCtlError::Affinity(format!("sched_setaffinity({}) failed: {}", pid, e))
    })
}

/// Read a process's current affinity mask.
pub fn get_affinity(pid: Pid) -> Result<CpuSet> {
    sched_getaffinity(pid).map_err(|e| {
        ProcCtlError::Affinity(format!("sched_getaffinity({}) failed: {}", pid, e))
    })
}

/// Cardinality of a process's current affinity mask.
///
/// A count of 1 on a multi-core host means the process is pinned; callers
/// use this to detect an already-isolated target.
pub fn affinity_count(pid: Pid) -> Result<usize> {
    Ok(cardinality(&get_affinity(pid)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_core_mask() {
        let mask = single(0).unwrap();
        assert_eq!(cardinality(&mask), 1);
        assert!(mask.is_set(0).unwrap());
    }

    #[test]
    fn range_mask_excludes_core_zero() {
        let mask = range(1, 4).unwrap();
        assert_eq!(cardinality(&mask), 3);
        assert!(!mask.is_set(0).unwrap());
        assert!(mask.is_set(1).unwrap());
        assert!(mask.is_set(3).unwrap());
    }

    #[test]
    fn empty_range_is_empty() {
        let mask = range(1, 1).unwrap();
        assert_eq!(cardinality(&mask), 0);
    }

    #[test]
    fn empty_mask_rejected_before_syscall() {
        let empty = CpuSet::new();
        let err = set_affinity(Pid::from_raw(0), &empty).unwrap_err();
        assert!(matches!(err, ProcCtlError::EmptyMask));
    }

    #[test]
    fn oversized_core_index_is_an_error() {
        assert!(range(0, CpuSet::count() + 1).is_err());
    }

    #[test]
    fn online_cores_positive() {
        assert!(online_cores().unwrap() >= 1);
    }
}
