//! Process-table enumeration and per-process stat snapshots from `/proc`.
use crate::types::{ProcCtlError, Result};
use nix::unistd::Pid;
use serde::Serialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Lazy snapshot of the live process table.
///
/// Yields every `/proc` entry whose entire name is a decimal number, in
/// directory order. The iterator is finite and non-restartable; entries that
/// vanish between listing and inspection are simply not yielded. Kernel
/// threads are included: whether they accept re-affinity is the kernel's
/// call, not the enumerator's.
#[derive(Debug)]
pub struct PidIter {
    entries: fs::ReadDir,
}

impl Iterator for PidIter {
    type Item = Pid;

    fn next(&mut self) -> Option<Pid> {
        while let Some(entry) = self.entries.next() {
            let Ok(entry) = entry else { continue };
            if let Some(pid) = parse_pid_name(&entry.file_name()) {
                return Some(pid);
            }
        }
        None
    }
}

/// List all currently live process ids.
///
/// Fails only if the process-table root itself cannot be opened (permission
/// or namespace failure); individual unreadable entries are skipped.
pub fn pids() -> Result<PidIter> {
    scan("/proc")
}

fn scan(root: impl AsRef<Path>) -> Result<PidIter> {
    let root = root.as_ref();
    let entries = fs::read_dir(root)
        .map_err(|e| ProcCtlError::Scan(format!("cannot open {}: {}", root.display(), e)))?;
    Ok(PidIter { entries })
}

/// List the thread ids of one thread group via `/proc/<pid>/task`.
pub fn tids(pid: Pid) -> Result<Vec<Pid>> {
    let task_dir = proc_path(pid, "task");
    let entries = fs::read_dir(&task_dir)
        .map_err(|e| ProcCtlError::Process(format!("no process {}: {}", pid, e)))?;
    Ok(entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| parse_pid_name(&entry.file_name()))
        .collect())
}

/// Whether `/proc/<pid>` currently exists. Racy by nature; a `true` answer
/// is stale the moment it is returned.
pub fn is_alive(pid: Pid) -> bool {
    proc_path(pid, "").exists()
}

/// Point-in-time snapshot of the scheduler-relevant `/proc/<pid>/stat` fields.
#[derive(Clone, Debug, Serialize)]
pub struct ProcStat {
    pub pid: i32,
    /// Command name, without the surrounding parentheses
    pub comm: String,
    /// Single-letter run state (R, S, D, Z, T, ...)
    pub state: char,
    pub ppid: i32,
    pub num_threads: i64,
    /// Core the task last ran on
    pub processor: usize,
}

/// Read and parse `/proc/<pid>/stat` for the given process.
pub fn stat(pid: Pid) -> Result<ProcStat> {
    let path = proc_path(pid, "stat");
    let raw = fs::read_to_string(&path)
        .map_err(|e| ProcCtlError::Process(format!("no process {}: {}", pid, e)))?;
    parse_stat(&raw)
}

// stat field numbers, 1-based as in proc(5). Everything after comm is
// offset by these minus three because comm itself may contain spaces and
// parentheses and must be split off first.
const STAT_FIELD_STATE: usize = 3;
const STAT_FIELD_PPID: usize = 4;
const STAT_FIELD_NUM_THREADS: usize = 20;
const STAT_FIELD_PROCESSOR: usize = 39;

fn parse_stat(raw: &str) -> Result<ProcStat> {
    let malformed = || ProcCtlError::Process(format!("malformed stat data: {:?}", raw.trim_end()));

    // comm is delimited by the first '(' and the *last* ')'
    let open = raw.find('(').ok_or_else(malformed)?;
    let close = raw.rfind(')').ok_or_else(malformed)?;
    if close < open {
        return Err(malformed());
    }

    let pid = raw[..open].trim().parse::<i32>().map_err(|_| malformed())?;
    let comm = raw[open + 1..close].to_string();
    let rest: Vec<&str> = raw[close + 1..].split_whitespace().collect();

    let field = |n: usize| rest.get(n - STAT_FIELD_STATE).copied().ok_or_else(malformed);

    Ok(ProcStat {
        pid,
        comm,
        state: field(STAT_FIELD_STATE)?.chars().next().ok_or_else(malformed)?,
        ppid: field(STAT_FIELD_PPID)?.parse().map_err(|_| malformed())?,
        num_threads: field(STAT_FIELD_NUM_THREADS)?.parse().map_err(|_| malformed())?,
        processor: field(STAT_FIELD_PROCESSOR)?.parse().map_err(|_| malformed())?,
    })
}

fn proc_path(pid: Pid, leaf: &str) -> PathBuf {
    let mut path = PathBuf::from("/proc");
    path.push(pid.to_string());
    if !leaf.is_empty() {
        path.push(leaf);
    }
    path
}

/// Accept only names that are entirely decimal digits; partial numeric
/// prefixes ("12abc") and signs ("+7") are not process ids.
fn parse_pid_name(name: &OsStr) -> Option<Pid> {
    let name = name.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<i32>().ok().map(Pid::from_raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pid_name(s: &str) -> Option<i32> {
        parse_pid_name(OsStr::new(s)).map(|p| p.as_raw())
    }

    #[test]
    fn pid_name_filtering() {
        assert_eq!(pid_name("1"), Some(1));
        assert_eq!(pid_name("42"), Some(42));
        assert_eq!(pid_name("007"), Some(7));
        assert_eq!(pid_name("self"), None);
        assert_eq!(pid_name("12abc"), None);
        assert_eq!(pid_name("12x"), None);
        assert_eq!(pid_name("+7"), None);
        assert_eq!(pid_name("-3"), None);
        assert_eq!(pid_name(""), None);
        // larger than any possible pid; must not wrap into a bogus id
        assert_eq!(pid_name("99999999999999999999"), None);
    }

    #[test]
    fn scan_yields_only_numeric_entries() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1", "42", "self", "12x", "7"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }

        let found: HashSet<i32> = scan(dir.path()).unwrap().map(|p| p.as_raw()).collect();
        let expected: HashSet<i32> = [1, 42, 7].into_iter().collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn scan_missing_root_is_an_error() {
        let err = scan("/proc-does-not-exist").unwrap_err();
        assert!(matches!(err, ProcCtlError::Scan(_)));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn stat_parse_plain() {
        let raw = "1234 (sleep) S 1 1234 1234 0 -1 4194304 100 0 0 0 \
                   0 0 0 0 20 0 1 0 12345 4096 100 18446744073709551615 \
                   0 0 0 0 0 0 0 0 0 0 0 0 17 3 0 0 0 0 0 0 0 0 0 0 0 0 0\n";
        let stat = parse_stat(raw).unwrap();
        assert_eq!(stat.pid, 1234);
        assert_eq!(stat.comm, "sleep");
        assert_eq!(stat.state, 'S');
        assert_eq!(stat.ppid, 1);
        assert_eq!(stat.num_threads, 1);
        assert_eq!(stat.processor, 3);
    }

    #[test]
    fn stat_parse_comm_with_spaces_and_parens() {
        let raw = "99 (tmux: server) (1)) R 1 99 99 0 -1 4194304 100 0 0 0 \
                   0 0 0 0 20 0 4 0 12345 4096 100 18446744073709551615 \
                   0 0 0 0 0 0 0 0 0 0 0 0 17 7 0 0 0 0 0 0 0 0 0 0 0 0 0\n";
        let stat = parse_stat(raw).unwrap();
        assert_eq!(stat.comm, "tmux: server) (1)");
        assert_eq!(stat.state, 'R');
        assert_eq!(stat.num_threads, 4);
        assert_eq!(stat.processor, 7);
    }

    #[test]
    fn stat_parse_rejects_garbage() {
        assert!(parse_stat("").is_err());
        assert!(parse_stat("1234 sleep S 1").is_err());
        assert!(parse_stat("1234 (short) S 1").is_err());
    }
}
