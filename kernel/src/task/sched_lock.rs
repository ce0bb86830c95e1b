//! Scheduler lock: deferring preemption of the current thread.
//!
//! Unlike a critical section this leaves interrupts alone. Handlers still
//! run and may ask for a reschedule; the request is parked in
//! `need_resched` and honoured when the outermost guard is dropped.

use core::sync::atomic::Ordering;

use super::scheduler::Scheduler;
use super::thread::Thread;

/// RAII guard holding one level of `thread`'s scheduler lock.
#[must_use = "the scheduler lock is released as soon as the guard is dropped"]
pub struct SchedLockGuard<'a> {
    sched: &'a Scheduler,
    thread: &'a Thread,
}

impl<'a> SchedLockGuard<'a> {
    /// Take one more level of the lock. Re-entrant.
    pub fn acquire(sched: &'a Scheduler, thread: &'a Thread) -> Self {
        let old = thread.lock_count().fetch_add(1, Ordering::AcqRel);
        debug_assert!(old < u32::MAX, "sched_lock: lock count overflow");
        SchedLockGuard { sched, thread }
    }

    /// Nesting depth while this guard is held.
    pub fn depth(&self) -> u32 {
        self.thread.sched_lock_depth()
    }
}

impl Drop for SchedLockGuard<'_> {
    fn drop(&mut self) {
        let old = self.thread.lock_count().fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "sched_lock: lock count underflow");
        if old == 1 {
            // Outermost level released: a reschedule that came due while we
            // held the lock happens now.
            self.sched.preempt_point();
        }
    }
}
