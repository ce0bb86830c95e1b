//! POSIX-facing entry points.
//!
//! Functions here follow the C convention: `OK` on success, `ERROR` on
//! failure with the reason left in the calling thread's errno cell. The
//! kernel-internal primitives they wrap return `Result` instead.

pub mod errno;
pub mod signal;

/// Success return value
pub const OK: i32 = 0;

/// Failure return value; see the calling thread's errno
pub const ERROR: i32 = -1;
