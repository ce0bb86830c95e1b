//! Signal-related data structures

use super::constants::*;
use super::error::{MaskError, SignalError};
use super::pending::PendingQueue;
use super::sigset::SigSet;

/// Signals that no mask may ever contain.
pub const UNBLOCKABLE: SigSet = SigSet::from_bits(UNCATCHABLE_SIGNALS);

/// How a `procmask` request combines with the current mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SigHow {
    /// New mask is the union of the current mask and the set
    Block = SIG_BLOCK,
    /// New mask is the current mask minus the set
    Unblock = SIG_UNBLOCK,
    /// New mask is the set
    SetMask = SIG_SETMASK,
}

impl SigHow {
    /// Combine `set` with `current` according to this mode.
    #[inline]
    pub const fn combine(self, current: SigSet, set: SigSet) -> SigSet {
        match self {
            SigHow::Block => current.union(set),
            SigHow::Unblock => current.intersect_complement(set),
            SigHow::SetMask => current.replace(set),
        }
    }
}

impl TryFrom<i32> for SigHow {
    type Error = MaskError;

    fn try_from(how: i32) -> Result<Self, MaskError> {
        match how {
            SIG_BLOCK => Ok(SigHow::Block),
            SIG_UNBLOCK => Ok(SigHow::Unblock),
            SIG_SETMASK => Ok(SigHow::SetMask),
            _ => Err(MaskError::InvalidArgument),
        }
    }
}

/// Who raised a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigCode {
    /// `kill` from another thread
    User,
    /// `sigqueue`, carries a value
    Queue,
    /// Raised by the kernel or an interrupt handler
    Kernel,
    /// Timer expiry
    Timer,
}

/// One occurrence of a signal, as queued while blocked and handed to the
/// delivery collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigInfo {
    pub signo: u32,
    pub code: SigCode,
    /// Sending thread, `None` for kernel or interrupt originators
    pub sender: Option<u64>,
    /// `sigqueue` payload
    pub value: u64,
}

impl SigInfo {
    pub(crate) const EMPTY: SigInfo = SigInfo::new(0, SigCode::Kernel);

    pub const fn new(signo: u32, code: SigCode) -> Self {
        SigInfo {
            signo,
            code,
            sender: None,
            value: 0,
        }
    }

    pub const fn with_sender(mut self, tid: u64) -> Self {
        self.sender = Some(tid);
        self
    }

    pub const fn with_value(mut self, value: u64) -> Self {
        self.value = value;
        self
    }
}

/// What happened to a posted signal that could not be delivered right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// A new record was linked
    Queued,
    /// A standard signal already pending; the occurrence merged into it
    Coalesced,
}

/// Per-thread signal state
///
/// Lives inside the thread's `SpinLockIrq`, so every method here runs with
/// interrupts masked and must stay O(1).
pub struct SignalState {
    /// Blocked signals (sigprocmask). Written only by the owning thread.
    blocked: SigSet,
    /// Queued occurrences; also the pending bitmap
    queue: PendingQueue,
}

impl SignalState {
    pub fn new(initial_mask: SigSet, pending_capacity: usize) -> Self {
        SignalState {
            blocked: initial_mask - UNBLOCKABLE,
            queue: PendingQueue::new(pending_capacity),
        }
    }

    #[inline]
    pub fn blocked(&self) -> SigSet {
        self.blocked
    }

    #[inline]
    pub fn pending(&self) -> SigSet {
        self.queue.pending()
    }

    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    /// Pending signals that are not blocked.
    #[inline]
    pub fn deliverable(&self) -> SigSet {
        self.pending() - self.blocked
    }

    /// Check if any signals are pending and not blocked
    #[inline]
    pub fn has_deliverable_signals(&self) -> bool {
        !self.deliverable().is_empty()
    }

    /// Get the next deliverable signal (lowest number first)
    pub fn next_deliverable_signal(&self) -> Option<u32> {
        self.deliverable().first()
    }

    #[inline]
    pub fn is_blocked(&self, sig: u32) -> bool {
        self.blocked.contains(sig)
    }

    #[inline]
    pub fn is_pending(&self, sig: u32) -> bool {
        self.pending().contains(sig)
    }

    /// Install the mask `how` produces from `set`. SIGKILL and SIGSTOP are
    /// silently kept out of the result.
    pub(crate) fn apply_mask(&mut self, how: SigHow, set: SigSet) {
        match how {
            SigHow::Block => self.block_signals(set),
            SigHow::Unblock => self.unblock_signals(set),
            SigHow::SetMask => self.set_blocked(set),
        }
    }

    /// Block additional signals
    fn block_signals(&mut self, set: SigSet) {
        self.blocked = SigHow::Block.combine(self.blocked, set) - UNBLOCKABLE;
    }

    /// Unblock signals
    fn unblock_signals(&mut self, set: SigSet) {
        self.blocked = SigHow::Unblock.combine(self.blocked, set);
    }

    /// Set the blocked signal mask
    fn set_blocked(&mut self, set: SigSet) {
        self.blocked = SigHow::SetMask.combine(self.blocked, set) - UNBLOCKABLE;
    }

    /// Record an occurrence that arrived while its signal is blocked.
    ///
    /// Standard signals coalesce: while one is pending, later occurrences
    /// are dropped and the first record is kept. Realtime signals queue one
    /// record per occurrence until the pool runs out.
    pub(crate) fn enqueue(&mut self, info: SigInfo) -> Result<Enqueued, SignalError> {
        if !is_realtime(info.signo) && self.is_pending(info.signo) {
            return Ok(Enqueued::Coalesced);
        }
        self.queue.push(info)?;
        Ok(Enqueued::Queued)
    }

    /// Remove the oldest record for `sig` if the signal is not blocked.
    ///
    /// A blocked signal is never handed out, whatever is queued for it.
    pub(crate) fn take_unblocked(&mut self, sig: u32) -> Option<SigInfo> {
        if self.is_blocked(sig) {
            return None;
        }
        self.queue.pop(sig)
    }
}
