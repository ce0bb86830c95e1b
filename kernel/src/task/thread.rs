//! Thread control blocks.
//!
//! Only the parts of a TCB the signal subsystem touches live here: the
//! identity, the scheduler-lock depth, the signal state and the errno cell.
//! Threads are shared as `Arc<Thread>` handles handed out by the scheduler.

use alloc::string::String;
use core::sync::atomic::{AtomicI32, AtomicU32, AtomicU64, Ordering};

use crate::config::{DEFAULT_BLOCKED_MASK, DEFAULT_PENDING_CAPACITY};
use crate::signal::{SigSet, SignalState};
use crate::spinlock::SpinLockIrq;

/// Global thread ID counter
static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1); // 0 is reserved for the idle thread

/// Allocate a new thread ID
pub fn allocate_thread_id() -> u64 {
    NEXT_THREAD_ID.fetch_add(1, Ordering::SeqCst)
}

/// Creation parameters for a thread.
#[derive(Debug, Clone)]
pub struct ThreadConfig {
    pub name: String,
    /// Pending-record slots reserved for this thread
    pub pending_capacity: usize,
    /// Blocked mask the thread starts with
    pub initial_mask: SigSet,
}

impl ThreadConfig {
    pub fn new(name: &str) -> Self {
        ThreadConfig {
            name: String::from(name),
            pending_capacity: DEFAULT_PENDING_CAPACITY,
            initial_mask: DEFAULT_BLOCKED_MASK,
        }
    }

    pub fn pending_capacity(mut self, capacity: usize) -> Self {
        self.pending_capacity = capacity;
        self
    }

    pub fn initial_mask(mut self, mask: SigSet) -> Self {
        self.initial_mask = mask;
        self
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        ThreadConfig::new("thread")
    }
}

pub struct Thread {
    id: u64,
    pub name: String,
    /// Scheduler-lock nesting depth; preemption is deferred while non-zero
    lock_count: AtomicU32,
    signals: SpinLockIrq<SignalState>,
    pending_capacity: usize,
    /// Last error reported through a POSIX-style entry point
    errno: AtomicI32,
}

impl Thread {
    pub(crate) fn new(id: u64, config: ThreadConfig) -> Self {
        let state = SignalState::new(config.initial_mask, config.pending_capacity);
        let pending_capacity = state.queue().capacity();
        Thread {
            id,
            name: config.name,
            lock_count: AtomicU32::new(0),
            signals: SpinLockIrq::new(state),
            pending_capacity,
            errno: AtomicI32::new(0),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Signal state; every access masks interrupts for the guard's lifetime.
    #[inline]
    pub fn signals(&self) -> &SpinLockIrq<SignalState> {
        &self.signals
    }

    /// Snapshot of the blocked mask.
    pub fn blocked_mask(&self) -> SigSet {
        self.signals.lock().blocked()
    }

    /// Snapshot of the pending set.
    pub fn pending_signals(&self) -> SigSet {
        self.signals.lock().pending()
    }

    /// Slots in this thread's pending-record pool, fixed at creation.
    #[inline]
    pub fn pending_capacity(&self) -> usize {
        self.pending_capacity
    }

    #[inline]
    pub fn sched_lock_depth(&self) -> u32 {
        self.lock_count.load(Ordering::Acquire)
    }

    pub(crate) fn lock_count(&self) -> &AtomicU32 {
        &self.lock_count
    }

    #[inline]
    pub fn errno(&self) -> i32 {
        self.errno.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_errno(&self, errno: i32) {
        self.errno.store(errno, Ordering::Relaxed);
    }
}

impl core::fmt::Debug for Thread {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("lock_count", &self.sched_lock_depth())
            .finish()
    }
}
