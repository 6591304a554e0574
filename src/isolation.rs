//! CPU isolation engine: pin one process to core 0 and evacuate every other
//! process on the host, or restore full-mask affinity to everyone.
//!
//! The sweep is enumerate-then-mutate over a live process table, so it is
//! inherently racy against concurrent fork/exit: a process that appears in
//! the snapshot but exits before its turn yields one counted failure, and a
//! process forked mid-sweep keeps its inherited mask until the next sweep.
//! That drift is accepted by contract; there is no kernel-level transaction
//! to fight for. Concurrent `isolate`/`release` calls from different callers
//! race last-writer-wins; serializing them is the caller's obligation.
use crate::kernel::{affinity, procfs};
use crate::types::{ProcCtlError, Result, SweepReport};
use log::{debug, info};
use nix::sched::CpuSet;
use nix::unistd::Pid;

/// Apply `mask` to every live process except `exclude`.
///
/// Per-process failures are counted and logged, never propagated: one
/// uncooperative or vanished process must not keep the rest of the host
/// from being re-affined. Fails only if the process table itself cannot
/// be scanned.
pub fn sweep(mask: &CpuSet, exclude: Option<Pid>) -> Result<SweepReport> {
    if affinity::cardinality(mask) == 0 {
        return Err(ProcCtlError::EmptyMask);
    }

    // Fix the pid set at a point in time before mutating anything; pids that
    // exit after the snapshot surface as counted per-item failures.
    let snapshot: Vec<Pid> = procfs::pids()?.collect();

    let mut report = SweepReport::default();
    for pid in snapshot {
        if Some(pid) == exclude {
            continue;
        }
        report.attempted += 1;
        match affinity::set_affinity(pid, mask) {
            Ok(()) => report.updated += 1,
            Err(err) => {
                report.failed += 1;
                debug!("sweep: pid {} skipped: {}", pid, err);
            }
        }
    }
    Ok(report)
}

/// Pin `target` exclusively to core 0 and push every other process onto the
/// remaining cores.
///
/// The core count is read fresh; a single-core host fails with
/// `InsufficientCores` before any mutation, since there is no "rest of the
/// host" to evacuate. The target's own pin is applied *before* the sweep
/// starts, so the sweep itself can contend with the target on core 0 for at
/// most one scheduling quantum. Idempotent: re-isolating an isolated target
/// converges to the same state.
pub fn isolate(target: Pid) -> Result<SweepReport> {
    let cores = affinity::online_cores()?;
    if cores <= 1 {
        return Err(ProcCtlError::InsufficientCores);
    }

    affinity::set_affinity(target, &affinity::single(0)?)?;
    let report = sweep(&affinity::range(1, cores)?, Some(target))?;
    info!(
        "isolated pid {} on core 0; evacuated {}/{} processes ({} failed)",
        target, report.updated, report.attempted, report.failed
    );
    Ok(report)
}

/// Restore full-mask affinity to every process on the host.
///
/// `target` is accepted for symmetry with [`isolate`] but is not treated
/// specially: release is host-wide, because leaving some processes pinned
/// after a partial release is worse than restoring a few that were never
/// isolated. Calling it twice yields the same observable state as once.
pub fn release(target: Pid) -> Result<SweepReport> {
    let report = sweep(&affinity::full()?, None)?;
    info!(
        "release for pid {}: restored {}/{} processes ({} failed)",
        target, report.updated, report.attempted, report.failed
    );
    Ok(report)
}
