//! End-to-end tests of signal masking and delivery through the public API.

use std::sync::Arc;

use rtsig::arch_impl::host::run_as_interrupt;
use rtsig::signal::constants::*;
use rtsig::signal::{procmask, send_signal, SigCode, SignalDelivery};
use rtsig::syscall::errno::{EAGAIN, EINVAL, ESRCH};
use rtsig::syscall::signal::{kill, sigpending, sigprocmask, sigqueue};
use rtsig::syscall::{ERROR, OK};
use rtsig::{SigInfo, SigSet, Scheduler, Thread, ThreadConfig};
use spin::Mutex;

#[derive(Debug, Clone, Copy)]
struct Delivered {
    tid: u64,
    info: SigInfo,
    /// Mask observed by the handler; taking the signal lock here also
    /// proves delivery happens outside it.
    mask: SigSet,
}

#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<Delivered>>,
}

impl Recorder {
    fn signals(&self) -> Vec<u32> {
        self.log.lock().iter().map(|d| d.info.signo).collect()
    }

    fn values(&self) -> Vec<u64> {
        self.log.lock().iter().map(|d| d.info.value).collect()
    }
}

impl SignalDelivery for Recorder {
    fn deliver(&self, thread: &Thread, info: &SigInfo) {
        let mask = thread.blocked_mask();
        self.log.lock().push(Delivered {
            tid: thread.id(),
            info: *info,
            mask,
        });
    }
}

/// A scheduler with one user thread running.
fn setup(capacity: usize) -> (Arc<Recorder>, Scheduler, Arc<Thread>) {
    let recorder = Arc::new(Recorder::default());
    let sched = Scheduler::new(recorder.clone());
    let thread = sched.spawn(ThreadConfig::new("test").pending_capacity(capacity));
    assert!(sched.set_current_thread(thread.id()));
    (recorder, sched, thread)
}

fn set(sigs: &[u32]) -> SigSet {
    SigSet::from_signals(sigs)
}

// =============================================================================
// Mask arithmetic
// =============================================================================

/// Setting the same mask twice changes nothing the second time
#[test]
fn test_setmask_is_idempotent() {
    let (_rec, sched, thread) = setup(8);
    let s = set(&[SIGINT, SIGUSR1, SIGRTMIN + 2]);

    procmask(&sched, &thread, SIG_SETMASK, Some(&s), None).unwrap();
    let mut old = SigSet::empty();
    procmask(&sched, &thread, SIG_SETMASK, Some(&s), Some(&mut old)).unwrap();

    assert_eq!(old, s);
    assert_eq!(thread.blocked_mask(), s);
}

/// Blocking then unblocking a set restores a mask that was disjoint from it
#[test]
fn test_block_then_unblock_restores_mask() {
    let initial = set(&[SIGHUP, SIGPIPE]);
    let recorder = Arc::new(Recorder::default());
    let sched = Scheduler::new(recorder.clone());
    let thread = sched.spawn(ThreadConfig::new("t").initial_mask(initial));

    let s = set(&[SIGUSR1, SIGUSR2]);
    procmask(&sched, &thread, SIG_BLOCK, Some(&s), None).unwrap();
    assert_eq!(thread.blocked_mask(), initial | s);
    procmask(&sched, &thread, SIG_UNBLOCK, Some(&s), None).unwrap();
    assert_eq!(thread.blocked_mask(), initial);
    assert!(recorder.signals().is_empty(), "nothing was pending");
}

/// SIGKILL and SIGSTOP never enter the mask, whatever the mode
#[test]
fn test_unblockable_signals_stripped() {
    let (_rec, sched, thread) = setup(8);

    procmask(&sched, &thread, SIG_SETMASK, Some(&SigSet::full()), None).unwrap();
    let mask = thread.blocked_mask();
    assert!(!mask.contains(SIGKILL), "SIGKILL must not be blockable");
    assert!(!mask.contains(SIGSTOP), "SIGSTOP must not be blockable");
    assert_eq!(mask.count(), NSIG - 2);

    procmask(&sched, &thread, SIG_SETMASK, Some(&SigSet::empty()), None).unwrap();
    procmask(&sched, &thread, SIG_BLOCK, Some(&set(&[SIGKILL, SIGINT])), None).unwrap();
    assert_eq!(thread.blocked_mask(), set(&[SIGINT]));
}

// =============================================================================
// Argument handling
// =============================================================================

/// An invalid `how` fails, leaves the mask alone, and still reports it
#[test]
fn test_invalid_how_rejected() {
    let (rec, sched, thread) = setup(8);
    let before = set(&[SIGTERM]);
    procmask(&sched, &thread, SIG_SETMASK, Some(&before), None).unwrap();
    send_signal(&sched, &thread, SigInfo::new(SIGTERM, SigCode::Kernel)).unwrap();

    let mut old = SigSet::empty();
    let result = procmask(&sched, &thread, 3, Some(&SigSet::empty()), Some(&mut old));

    assert!(result.is_err(), "how=3 must be rejected");
    assert_eq!(result.unwrap_err().errno(), EINVAL);
    assert_eq!(old, before, "old mask written even on error");
    assert_eq!(thread.blocked_mask(), before, "mask unchanged on error");
    assert!(rec.signals().is_empty(), "no sweep after a rejected change");
    assert!(thread.pending_signals().contains(SIGTERM));
}

/// With no new set the call is a pure query, even with a garbage `how`
#[test]
fn test_query_only() {
    let (_rec, sched, thread) = setup(8);
    let mask = set(&[SIGALRM, SIGCHLD]);
    procmask(&sched, &thread, SIG_BLOCK, Some(&mask), None).unwrap();

    let mut old = SigSet::empty();
    procmask(&sched, &thread, -42, None, Some(&mut old)).unwrap();
    assert_eq!(old, mask);
    assert_eq!(thread.blocked_mask(), mask);

    procmask(&sched, &thread, SIG_UNBLOCK, None, None).unwrap();
    assert_eq!(thread.blocked_mask(), mask);
}

// =============================================================================
// Delivery on unmask
// =============================================================================

/// Unblocking one of several pending signals delivers only that one, once
#[test]
fn test_unblock_delivers_exactly_once() {
    let (rec, sched, thread) = setup(8);
    let blocked = set(&[3, 5, 7]);
    procmask(&sched, &thread, SIG_BLOCK, Some(&blocked), None).unwrap();
    for sig in [3, 5, 7] {
        send_signal(&sched, &thread, SigInfo::new(sig, SigCode::Kernel)).unwrap();
    }
    assert_eq!(thread.pending_signals(), blocked);

    procmask(&sched, &thread, SIG_UNBLOCK, Some(&set(&[5])), None).unwrap();

    assert_eq!(rec.signals(), vec![5]);
    assert_eq!(thread.pending_signals(), set(&[3, 7]));
    assert_eq!(thread.blocked_mask(), set(&[3, 7]));

    let delivered = rec.log.lock()[0];
    assert_eq!(delivered.tid, thread.id());
    assert_eq!(delivered.mask, set(&[3, 7]), "handler sees the new mask");

    procmask(&sched, &thread, SIG_UNBLOCK, Some(&set(&[5])), None).unwrap();
    assert_eq!(rec.signals(), vec![5], "no second delivery");
}

/// Pending signals unblocked together are delivered lowest number first
#[test]
fn test_delivery_in_ascending_order() {
    let (rec, sched, thread) = setup(8);
    procmask(&sched, &thread, SIG_SETMASK, Some(&set(&[2, 4, 9, 20])), None).unwrap();
    for sig in [9, 2, 20, 4] {
        send_signal(&sched, &thread, SigInfo::new(sig, SigCode::Kernel)).unwrap();
    }

    procmask(&sched, &thread, SIG_SETMASK, Some(&SigSet::empty()), None).unwrap();

    // SIGKILL (9) was never blockable and went out on posting
    assert_eq!(rec.signals(), vec![9, 2, 4, 20]);
    assert!(thread.pending_signals().is_empty());
}

/// Standard signals posted while blocked collapse into one occurrence
#[test]
fn test_standard_signals_coalesce() {
    let (rec, sched, thread) = setup(8);
    procmask(&sched, &thread, SIG_BLOCK, Some(&set(&[SIGUSR1])), None).unwrap();

    for value in 1..=3 {
        let info = SigInfo::new(SIGUSR1, SigCode::Queue).with_value(value);
        send_signal(&sched, &thread, info).unwrap();
    }

    procmask(&sched, &thread, SIG_UNBLOCK, Some(&set(&[SIGUSR1])), None).unwrap();
    assert_eq!(rec.signals(), vec![SIGUSR1]);
    assert_eq!(rec.values(), vec![1], "first occurrence is the one kept");
}

/// Realtime signals queue every occurrence and deliver them in order
#[test]
fn test_realtime_signals_queue_fifo() {
    let (rec, sched, thread) = setup(8);
    let rt = SIGRTMIN + 1;
    procmask(&sched, &thread, SIG_BLOCK, Some(&set(&[rt])), None).unwrap();

    for value in [10, 20, 30] {
        assert_eq!(sigqueue(&sched, thread.id(), rt, value), OK);
    }

    procmask(&sched, &thread, SIG_UNBLOCK, Some(&set(&[rt])), None).unwrap();
    assert_eq!(rec.signals(), vec![rt, rt, rt]);
    assert_eq!(rec.values(), vec![10, 20, 30]);
    let senders: Vec<_> = rec.log.lock().iter().map(|d| d.info.sender).collect();
    assert_eq!(senders, vec![Some(thread.id()); 3]);
}

/// A signal posted from interrupt context waits for the unmask like any other
#[test]
fn test_post_from_interrupt_context() {
    let (rec, sched, thread) = setup(8);
    procmask(&sched, &thread, SIG_BLOCK, Some(&set(&[SIGALRM])), None).unwrap();

    run_as_interrupt(|| {
        send_signal(&sched, &thread, SigInfo::new(SIGALRM, SigCode::Timer)).unwrap();
    });
    assert!(rec.signals().is_empty());

    procmask(&sched, &thread, SIG_UNBLOCK, Some(&set(&[SIGALRM])), None).unwrap();
    let log = rec.log.lock();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].info.code, SigCode::Timer);
    assert_eq!(log[0].info.sender, None);
}

// =============================================================================
// POSIX wrappers
// =============================================================================

/// Failures return -1 and leave the reason in the caller's errno
#[test]
fn test_errno_translation() {
    let (_rec, sched, thread) = setup(2);
    let mut old = SigSet::empty();

    assert_eq!(sigprocmask(&sched, 99, Some(&set(&[SIGINT])), Some(&mut old)), ERROR);
    assert_eq!(thread.errno(), EINVAL);

    assert_eq!(kill(&sched, 987_654, SIGTERM), ERROR);
    assert_eq!(thread.errno(), ESRCH);

    assert_eq!(kill(&sched, thread.id(), NSIG + 1), ERROR);
    assert_eq!(thread.errno(), EINVAL);

    let rt = SIGRTMAX;
    assert_eq!(sigprocmask(&sched, SIG_BLOCK, Some(&set(&[rt])), None), OK);
    assert_eq!(sigqueue(&sched, thread.id(), rt, 1), OK);
    assert_eq!(sigqueue(&sched, thread.id(), rt, 2), OK);
    assert_eq!(sigqueue(&sched, thread.id(), rt, 3), ERROR, "pool of two is full");
    assert_eq!(thread.errno(), EAGAIN);
}

/// kill with signal 0 probes for the thread without sending anything
#[test]
fn test_kill_signal_zero() {
    let (rec, sched, thread) = setup(4);
    assert_eq!(kill(&sched, thread.id(), 0), OK);
    assert!(rec.signals().is_empty());
    assert_eq!(kill(&sched, 555_555, 0), ERROR);
    assert_eq!(thread.errno(), ESRCH);
}

/// sigpending reports blocked arrivals until they are delivered
#[test]
fn test_sigpending() {
    let (rec, sched, thread) = setup(4);
    let mut pending = SigSet::full();
    assert_eq!(sigpending(&sched, &mut pending), OK);
    assert!(pending.is_empty());

    assert_eq!(sigprocmask(&sched, SIG_BLOCK, Some(&set(&[SIGHUP])), None), OK);
    assert_eq!(kill(&sched, thread.id(), SIGHUP), OK);
    assert_eq!(kill(&sched, thread.id(), SIGINT), OK, "unblocked: delivered now");
    assert_eq!(rec.signals(), vec![SIGINT]);

    assert_eq!(sigpending(&sched, &mut pending), OK);
    assert_eq!(pending, set(&[SIGHUP]));

    assert_eq!(sigprocmask(&sched, SIG_SETMASK, Some(&SigSet::empty()), None), OK);
    assert_eq!(rec.signals(), vec![SIGINT, SIGHUP]);
    assert_eq!(sigpending(&sched, &mut pending), OK);
    assert!(pending.is_empty());
}

// =============================================================================
// Scheduler lock
// =============================================================================

/// A reschedule requested during the call happens once it returns
#[test]
fn test_deferred_reschedule_after_procmask() {
    let (rec, sched, thread) = setup(4);
    let other = sched.spawn(ThreadConfig::new("other"));

    procmask(&sched, &thread, SIG_BLOCK, Some(&set(&[SIGUSR2])), None).unwrap();
    send_signal(&sched, &thread, SigInfo::new(SIGUSR2, SigCode::Kernel)).unwrap();

    sched.set_need_resched();
    procmask(&sched, &thread, SIG_UNBLOCK, Some(&set(&[SIGUSR2])), None).unwrap();

    assert_eq!(rec.signals(), vec![SIGUSR2], "delivered before the switch");
    assert_eq!(thread.sched_lock_depth(), 0);
    assert!(!sched.need_resched());
    assert_eq!(sched.current_thread_id(), other.id());
}
