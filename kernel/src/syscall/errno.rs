//! POSIX errno values
//!
//! Error codes stored in a thread's errno cell by the POSIX-facing entry
//! points.

/// No such process
pub const ESRCH: i32 = 3;

/// Resource temporarily unavailable
pub const EAGAIN: i32 = 11;

/// Invalid argument
pub const EINVAL: i32 = 22;
