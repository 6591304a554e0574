//! corepin: host-level process control primitives with kernel-enforced effects
//!
//! # Architecture
//!
//! This crate is organized by Linux kernel primitive families:
//!
//! ## Kernel Primitives ([`kernel`])
//! - [`kernel::procfs`]: process-table enumeration and stat snapshots
//! - [`kernel::affinity`]: CPU-set construction and `sched_{set,get}affinity`
//! - [`kernel::limits`]: resource-limit introspection via `prlimit(2)`
//! - [`kernel::signal`]: per-thread signal delivery via `tgkill(2)`
//! - [`kernel::cpu`]: current-core lookup
//! - [`kernel::priority`]: nice-level queries and updates
//!
//! ## Orchestration ([`isolation`])
//! - [`isolation::isolate`] / [`isolation::release`]: pin one process to a
//!   dedicated core and evacuate the rest of the host, or undo it host-wide
//! - [`isolation::sweep`]: the best-effort bulk re-affinity pass underneath
//!
//! ## Binding Surface ([`api`])
//! - Flat raw-integer functions (`curlimit`, `isoproc`, `tkill`, ...) and
//!   the exported `RLIMIT_*` / signal constant tables for language bindings
//!
//! # Design Principles
//!
//! 1. **Mechanism, not policy** - deciding when and why to isolate belongs
//!    to the caller; this crate only performs the operation
//! 2. **Kernel as truth** - nothing is cached between calls; core counts,
//!    process lists, and masks are re-read from the kernel every time
//! 3. **Failure isolation in bulk paths** - one vanished or privileged
//!    process never aborts a sweep; single-target operations fail fast with
//!    the OS error text intact

pub mod api;
pub mod cli;
pub mod isolation;
pub mod kernel;
pub mod types;

pub use types::{ProcCtlError, Result, SweepReport};
