use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::kernel::limits::{self, ResourceKind};
use crate::kernel::{affinity, cpu, priority, procfs, signal};
use crate::isolation;
use nix::unistd::Pid;

#[derive(Parser)]
#[command(author, version, about = "Host-level process control: CPU isolation, resource limits, per-thread signals", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List live process ids from the process table
    Pids,
    /// Show the stat snapshot of a process
    Stat {
        /// Target process id
        #[arg(long)]
        pid: i32,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Pin a process to core 0 and evacuate every other process
    Isolate {
        /// Process to isolate
        #[arg(long)]
        pid: i32,
        /// Emit the sweep report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Restore full-mask affinity to every process on the host
    Release {
        /// Previously isolated process (informational; release is host-wide)
        #[arg(long)]
        pid: i32,
        /// Emit the sweep report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the number of cores in a process's affinity mask
    Affinity {
        /// Target process id (0 = this process)
        #[arg(long)]
        pid: i32,
    },
    /// Print the core a process is currently running on
    Cpu {
        /// Target process id (0 = this process)
        #[arg(long)]
        pid: i32,
    },
    /// Print soft and hard resource limits of a process
    Limits {
        /// Target process id (0 = this process)
        #[arg(long)]
        pid: i32,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Send a signal to one thread of a thread group
    Tkill {
        /// Thread group (process) id
        #[arg(long)]
        tgid: i32,
        /// Thread id inside the group
        #[arg(long)]
        tid: i32,
        /// Signal number
        #[arg(long)]
        signal: i32,
    },
    /// Show or change the nice level of a process
    Nice {
        /// Target process id (0 = this process)
        #[arg(long)]
        pid: i32,
        /// New nice level; omit to only read
        #[arg(long)]
        set: Option<i32>,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Pids => {
            for pid in procfs::pids()? {
                println!("{}", pid);
            }
        }
        Commands::Stat { pid, json } => {
            let stat = procfs::stat(Pid::from_raw(pid))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stat)?);
            } else {
                println!(
                    "pid {} ({}) state {} ppid {} threads {} core {}",
                    stat.pid, stat.comm, stat.state, stat.ppid, stat.num_threads, stat.processor
                );
            }
        }
        Commands::Isolate { pid, json } => {
            let report = isolation::isolate(Pid::from_raw(pid))?;
            print_report(&report, json)?;
        }
        Commands::Release { pid, json } => {
            let report = isolation::release(Pid::from_raw(pid))?;
            print_report(&report, json)?;
        }
        Commands::Affinity { pid } => {
            println!("{}", affinity::affinity_count(Pid::from_raw(pid))?);
        }
        Commands::Cpu { pid } => {
            println!("{}", cpu::current_core(Pid::from_raw(pid))?);
        }
        Commands::Limits { pid, json } => {
            print_limits(Pid::from_raw(pid), json)?;
        }
        Commands::Tkill { tgid, tid, signal: sig } => {
            signal::tgkill(Pid::from_raw(tgid), Pid::from_raw(tid), sig)?;
        }
        Commands::Nice { pid, set } => {
            let pid = Pid::from_raw(pid);
            if let Some(level) = set {
                priority::set_nice(pid, level)?;
            }
            println!("{}", priority::nice(pid)?);
        }
    }
    Ok(())
}

fn print_report(report: &crate::types::SweepReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!(
            "re-affined {}/{} processes ({} failed)",
            report.updated, report.attempted, report.failed
        );
    }
    Ok(())
}

fn print_limits(pid: Pid, json: bool) -> Result<()> {
    if json {
        let mut table = serde_json::Map::new();
        for kind in ResourceKind::ALL {
            let pair = limits::query(pid, kind)?;
            table.insert(kind.name().to_string(), serde_json::to_value(pair)?);
        }
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    for kind in ResourceKind::ALL {
        let pair = limits::query(pid, kind)?;
        println!(
            "{:<18} {:>20} {:>20}",
            kind.name(),
            fmt_limit(pair.current),
            fmt_limit(pair.maximum)
        );
    }
    Ok(())
}

fn fmt_limit(value: u64) -> String {
    if value == libc::RLIM_INFINITY {
        "unlimited".to_string()
    } else {
        value.to_string()
    }
}
