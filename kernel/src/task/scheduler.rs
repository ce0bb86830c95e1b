//! Preemptive scheduler
//!
//! A round-robin run queue, just enough for the signal subsystem: it knows
//! which thread is current, owns the delivery sink, and performs
//! rescheduling only when the current thread's scheduler lock is free.

use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::thread::{allocate_thread_id, Thread, ThreadConfig};
use crate::config::IDLE_THREAD_NAME;
use crate::signal::SignalDelivery;
use crate::spinlock::SpinLockIrq;

struct RunQueue {
    /// All threads in the system
    threads: Vec<Arc<Thread>>,
    /// Ready queue (thread IDs)
    ready_queue: VecDeque<u64>,
    /// Currently running thread ID
    current_thread: u64,
    /// Idle thread ID (runs when no other threads are ready)
    idle_thread: u64,
}

impl RunQueue {
    fn get(&self, id: u64) -> Option<&Arc<Thread>> {
        self.threads.iter().find(|t| t.id() == id)
    }
}

/// The kernel scheduler
pub struct Scheduler {
    run_queue: SpinLockIrq<RunQueue>,
    need_resched: AtomicBool,
    context_switches: AtomicU64,
    delivery: Arc<dyn SignalDelivery>,
}

impl Scheduler {
    /// Create a scheduler whose idle thread is current.
    pub fn new(delivery: Arc<dyn SignalDelivery>) -> Self {
        let idle = Arc::new(Thread::new(0, ThreadConfig::new(IDLE_THREAD_NAME).pending_capacity(1)));
        let scheduler = Scheduler {
            run_queue: SpinLockIrq::new(RunQueue {
                threads: alloc::vec![idle],
                ready_queue: VecDeque::new(),
                current_thread: 0,
                idle_thread: 0,
            }),
            need_resched: AtomicBool::new(false),
            context_switches: AtomicU64::new(0),
            delivery,
        };
        log::info!("Scheduler initialized");
        scheduler
    }

    /// Create a thread and put it on the ready queue.
    pub fn spawn(&self, config: ThreadConfig) -> Arc<Thread> {
        let thread = Arc::new(Thread::new(allocate_thread_id(), config));
        {
            let mut rq = self.run_queue.lock();
            rq.threads.push(Arc::clone(&thread));
            rq.ready_queue.push_back(thread.id());
        }
        log::info!(
            "Added thread {} '{}' to scheduler (pending slots: {})",
            thread.id(),
            thread.name,
            thread.pending_capacity()
        );
        thread
    }

    /// The thread executing on this CPU. Falls back to the idle thread.
    pub fn current_thread(&self) -> Arc<Thread> {
        let rq = self.run_queue.lock();
        match rq.get(rq.current_thread) {
            Some(thread) => Arc::clone(thread),
            None => Arc::clone(&rq.threads[0]),
        }
    }

    pub fn current_thread_id(&self) -> u64 {
        self.run_queue.lock().current_thread
    }

    /// Get a thread by ID
    pub fn get_thread(&self, id: u64) -> Option<Arc<Thread>> {
        self.run_queue.lock().get(id).cloned()
    }

    /// Make `id` the running thread (used by the spawn/switch path).
    ///
    /// Returns false if no such thread exists.
    pub fn set_current_thread(&self, id: u64) -> bool {
        let mut rq = self.run_queue.lock();
        if rq.get(id).is_none() {
            return false;
        }
        let previous = rq.current_thread;
        rq.ready_queue.retain(|&t| t != id);
        if previous != id && previous != rq.idle_thread {
            rq.ready_queue.push_back(previous);
        }
        rq.current_thread = id;
        true
    }

    /// The registered delivery collaborator.
    pub fn delivery(&self) -> &dyn SignalDelivery {
        &*self.delivery
    }

    /// Ask for a reschedule at the next preemption point.
    pub fn set_need_resched(&self) {
        self.need_resched.store(true, Ordering::Release);
    }

    pub fn need_resched(&self) -> bool {
        self.need_resched.load(Ordering::Acquire)
    }

    pub fn context_switches(&self) -> u64 {
        self.context_switches.load(Ordering::Relaxed)
    }

    /// Reschedule if one is due and the current thread allows preemption.
    ///
    /// Called when a scheduler lock is fully released and on return from
    /// interrupts. Returns the switch performed, if any.
    pub fn preempt_point(&self) -> Option<(u64, u64)> {
        if self.current_thread().sched_lock_depth() != 0 {
            return None;
        }
        if !self.need_resched.swap(false, Ordering::AcqRel) {
            return None;
        }
        self.schedule()
    }

    /// Rotate the ready queue. Returns (old_thread, new_thread) if the
    /// running thread changed.
    pub fn schedule(&self) -> Option<(u64, u64)> {
        let switched = {
            let mut rq = self.run_queue.lock();
            let next = rq.ready_queue.pop_front()?;
            let old = rq.current_thread;
            if old != rq.idle_thread {
                rq.ready_queue.push_back(old);
            }
            rq.current_thread = next;
            (old, next)
        };
        self.context_switches.fetch_add(1, Ordering::Relaxed);
        log::debug!("Scheduling: {} -> {}", switched.0, switched.1);
        Some(switched)
    }
}
