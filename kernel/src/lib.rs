//! Signal masking and delivery core for a preemptible, interrupt-driven kernel.
//!
//! The crate owns the per-thread signal state (blocked mask, pending queue),
//! the two scoped guards that make multi-step updates atomic (interrupt
//! critical sections and the scheduler lock), and the `sigprocmask` family of
//! entry points built on them.
//!
//! Outside of `cfg(test)` the crate is `no_std` and only needs `alloc` for
//! structures sized once at thread creation.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arch_impl;
pub mod config;
pub mod logger;
pub mod signal;
pub mod spinlock;
pub mod syscall;
pub mod task;

pub use signal::{SigHow, SigInfo, SigSet};
pub use task::scheduler::Scheduler;
pub use task::thread::{Thread, ThreadConfig};
