//! Integration tests against the live kernel.
//!
//! These run unprivileged: operations that touch other users' processes are
//! expected to record per-item failures rather than succeed, and the
//! assertions are written around that. Everything that mutates affinity is
//! kept inside one test function so the steps cannot interleave.

use corepin::kernel::{affinity, cpu, limits, procfs, signal};
use corepin::types::ProcCtlError;
use corepin::{api, isolation};
use nix::unistd::Pid;
use std::process::{Child, Command};

fn own_pid() -> Pid {
    Pid::from_raw(std::process::id() as i32)
}

#[test]
fn enumerator_sees_this_process() {
    let me = own_pid();
    let found = procfs::pids().unwrap().any(|pid| pid == me);
    assert!(found, "pid {} missing from the process table", me);
}

#[test]
fn enumerator_yields_positive_pids() {
    for pid in procfs::pids().unwrap().take(64) {
        assert!(pid.as_raw() > 0, "bogus pid {}", pid);
    }
}

#[test]
fn stat_snapshot_of_self() {
    let stat = procfs::stat(own_pid()).unwrap();
    assert_eq!(stat.pid, own_pid().as_raw());
    assert!(!stat.comm.is_empty());
    assert!(stat.ppid > 0);
    assert!(stat.num_threads >= 1);
    assert!(stat.processor < affinity::online_cores().unwrap());
    assert!(procfs::is_alive(own_pid()));
}

#[test]
fn thread_listing_contains_main_thread() {
    let tids = procfs::tids(own_pid()).unwrap();
    assert!(tids.contains(&own_pid()));
}

#[test]
fn limits_soft_within_hard_for_every_kind() {
    for kind in limits::ResourceKind::ALL {
        let cur = limits::current_limit(own_pid(), kind).unwrap();
        let max = limits::maximum_limit(own_pid(), kind).unwrap();
        assert!(cur <= max, "{}: {} > {}", kind.name(), cur, max);
    }
}

#[test]
fn limit_query_on_dead_process_keeps_os_text() {
    // Find a pid that is certainly not alive: the maximum pid namespace
    // value is far below i32::MAX on any stock kernel.
    let err = limits::current_limit(Pid::from_raw(i32::MAX - 1), limits::ResourceKind::CpuTime)
        .unwrap_err();
    assert!(matches!(err, ProcCtlError::Limit(_)));
    assert!(!err.to_string().is_empty());
}

#[test]
fn signal_probe_round_trip() {
    let me = own_pid();
    let tids = procfs::tids(me).unwrap();
    assert!(!tids.is_empty());
    signal::tgkill(me, tids[0], 0).unwrap();

    let err = signal::tgkill(me, Pid::from_raw(0), 0).unwrap_err();
    assert!(matches!(err, ProcCtlError::Signal(_)));
    assert!(!err.to_string().is_empty());
}

#[test]
fn current_core_is_consistent_with_stat() {
    let cores = affinity::online_cores().unwrap();
    assert!(cpu::current_core(Pid::from_raw(0)).unwrap() < cores);
    // the stat-based path for a pid other than our own; init is always there
    assert!(cpu::current_core(Pid::from_raw(1)).unwrap() < cores);
}

#[test]
fn api_surface_round_trip() {
    let pid = std::process::id() as i32;
    let cur = api::curlimit(pid, api::consts::RLIMIT_NOFILE).unwrap();
    let max = api::maxlimit(pid, api::consts::RLIMIT_NOFILE).unwrap();
    assert!(cur <= max);
    assert!(api::procaff(0).unwrap() >= 1);
    let core = api::getcpu(0).unwrap();
    assert!(core >= 0);
    assert!(api::nice(0).is_ok());
}

struct ChildGuard(Child);

impl Drop for ChildGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// The full lifecycle, sequenced in one test so concurrent test threads
/// cannot observe each other's affinity churn:
/// self round-trip, full-mask sweep, isolate, release.
#[test]
fn sweep_isolate_release_lifecycle() {
    let me = own_pid();
    let cores = affinity::online_cores().unwrap();

    // Round-trip: re-applying our own mask is a no-op.
    let original = affinity::get_affinity(me).unwrap();
    let original_count = affinity::cardinality(&original);
    assert!(original_count >= 1);
    affinity::set_affinity(me, &original).unwrap();
    assert_eq!(affinity::affinity_count(me).unwrap(), original_count);

    // A full-mask sweep completes despite per-item failures (other users'
    // processes, kernel threads) and accounts for every attempt.
    let report = isolation::sweep(&affinity::full().unwrap(), None).unwrap();
    assert!(report.attempted > 0);
    assert_eq!(report.attempted, report.updated + report.failed);
    assert!(report.updated > 0, "at least our own processes must sweep");

    // The kernel intersects applied masks with any cpuset restriction, so
    // the effective full-mask cardinality is what later steps converge to.
    let full_count = affinity::affinity_count(me).unwrap();
    assert!(full_count >= 1);

    if cores <= 1 {
        // Isolation is meaningless here and must refuse before mutating.
        let before = affinity::affinity_count(me).unwrap();
        let err = isolation::isolate(me).unwrap_err();
        assert!(matches!(err, ProcCtlError::InsufficientCores));
        assert_eq!(affinity::affinity_count(me).unwrap(), before);
        return;
    }

    let child = ChildGuard(
        Command::new("/bin/sleep")
            .arg("60")
            .spawn()
            .expect("spawn sleep child"),
    );
    let target = Pid::from_raw(child.0.id() as i32);

    // Isolate: target pinned to core 0, everyone else evacuated. A cpuset
    // that forbids core 0 makes isolation impossible by construction; bail
    // out rather than fail on an environment this crate cannot change.
    let report = match isolation::isolate(target) {
        Ok(report) => report,
        Err(ProcCtlError::Affinity(msg)) => {
            println!("isolate unavailable in this environment: {}", msg);
            return;
        }
        Err(other) => panic!("unexpected isolate failure: {}", other),
    };
    assert_eq!(report.attempted, report.updated + report.failed);
    assert_eq!(affinity::affinity_count(target).unwrap(), 1);
    let target_mask = affinity::get_affinity(target).unwrap();
    assert!(target_mask.is_set(0).unwrap());

    // We were swept off core 0 along with the rest of the host (observable
    // exactly when no cpuset narrows what the sweep may apply to us).
    if full_count == cores {
        let our_mask = affinity::get_affinity(me).unwrap();
        assert!(!our_mask.is_set(0).unwrap());
        assert_eq!(affinity::cardinality(&our_mask), cores - 1);
    }

    // Isolate is idempotent with respect to the target's final state.
    isolation::isolate(target).unwrap();
    assert_eq!(affinity::affinity_count(target).unwrap(), 1);

    // Release restores the full mask to everyone, the target included.
    isolation::release(target).unwrap();
    assert_eq!(affinity::affinity_count(target).unwrap(), full_count);
    assert_eq!(affinity::affinity_count(me).unwrap(), full_count);

    // Releasing twice converges to the same observable state.
    isolation::release(target).unwrap();
    assert_eq!(affinity::affinity_count(me).unwrap(), full_count);
}
