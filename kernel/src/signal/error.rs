//! Error kinds reported by the signal subsystem.

use core::fmt;

use crate::syscall::errno::{EAGAIN, EINVAL, ESRCH};

/// Failure of the mask update primitive.
///
/// There is exactly one way for `procmask` to fail: a combination mode
/// outside [`SigHow`](super::SigHow).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskError {
    InvalidArgument,
}

impl MaskError {
    /// POSIX errno value for this error.
    pub const fn errno(self) -> i32 {
        match self {
            MaskError::InvalidArgument => EINVAL,
        }
    }
}

impl fmt::Display for MaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskError::InvalidArgument => f.write_str("invalid signal mask operation"),
        }
    }
}

/// Failure of the posting and signal-set paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    /// Signal number outside 1..=NSIG
    InvalidArgument,
    /// Every pending-record slot of the target thread is in use
    Again,
    /// No live thread with the requested id
    NoSuchThread,
}

impl SignalError {
    /// POSIX errno value for this error.
    pub const fn errno(self) -> i32 {
        match self {
            SignalError::InvalidArgument => EINVAL,
            SignalError::Again => EAGAIN,
            SignalError::NoSuchThread => ESRCH,
        }
    }
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::InvalidArgument => f.write_str("invalid signal number"),
            SignalError::Again => f.write_str("pending signal queue is full"),
            SignalError::NoSuchThread => f.write_str("no such thread"),
        }
    }
}
