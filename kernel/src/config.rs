//! Build-time configuration of the signal subsystem.
//!
//! Per-thread values can be overridden through
//! [`ThreadConfig`](crate::task::thread::ThreadConfig) when a thread is
//! created; everything here is the default.

use crate::signal::SigSet;

/// Pending-record slots reserved for every thread unless overridden.
///
/// Standard signals coalesce, so 31 slots always cover them; the rest are
/// available for queued realtime occurrences.
pub const DEFAULT_PENDING_CAPACITY: usize = 48;

/// Upper bound on a thread's pending-record pool. Slot indices are `u16`.
pub const MAX_PENDING_CAPACITY: usize = u16::MAX as usize;

/// Blocked mask a new thread starts with.
pub const DEFAULT_BLOCKED_MASK: SigSet = SigSet::empty();

/// Name given to the idle thread created with the scheduler.
pub const IDLE_THREAD_NAME: &str = "idle";
