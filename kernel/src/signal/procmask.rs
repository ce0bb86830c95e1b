//! Examining and changing the calling thread's signal mask.
//!
//! `procmask` holds the scheduler lock for its whole run so other threads
//! observe "mask changed and newly unblocked signals delivered" as one
//! step. The mask itself is written inside a critical section because
//! interrupt handlers read it when deciding whether to queue a signal.

use super::delivery::dispatch;
use super::error::MaskError;
use super::sigset::SigSet;
use super::types::SigHow;
use crate::task::sched_lock::SchedLockGuard;
use crate::task::scheduler::Scheduler;
use crate::task::thread::Thread;

/// Examine and/or change `thread`'s blocked-signal mask.
///
/// `thread` must be the calling thread. If `oset` is given it receives the
/// mask in effect on entry, even when the change itself is rejected. If
/// `set` is `None` the call only queries and always succeeds. Otherwise
/// `how` selects block/unblock/set-exact; any other value fails with
/// [`MaskError::InvalidArgument`] and leaves the mask as it was.
///
/// Pending signals unblocked by the change are delivered, lowest number
/// first, before this returns.
pub fn procmask(
    sched: &Scheduler,
    thread: &Thread,
    how: i32,
    set: Option<&SigSet>,
    oset: Option<&mut SigSet>,
) -> Result<(), MaskError> {
    let _sched_lock = SchedLockGuard::acquire(sched, thread);

    let old_mask = thread.blocked_mask();
    if let Some(oset) = oset {
        *oset = old_mask;
    }

    let Some(&set) = set else {
        return Ok(());
    };

    let how = SigHow::try_from(how).map_err(|err| {
        log::warn!("procmask: invalid 'how' value {} for thread {}", how, thread.id());
        err
    })?;

    let new_mask = {
        let mut signals = thread.signals().lock();
        signals.apply_mask(how, set);
        signals.blocked()
    };
    log::debug!(
        "Thread {} mask {:?} -> {:?} ({:?} {:?})",
        thread.id(),
        old_mask,
        new_mask,
        how,
        set
    );

    unmask_pending_signals(sched, thread);
    Ok(())
}

/// Deliver every pending signal of `thread` that is no longer blocked.
///
/// Signals are visited in ascending order; realtime signals hand out all of
/// their queued records oldest first. Each record is unlinked in its own
/// critical section, so interrupts are never masked for more than one
/// removal. Returns the number of occurrences delivered.
pub fn unmask_pending_signals(sched: &Scheduler, thread: &Thread) -> usize {
    let ready = thread.signals().lock().deliverable();
    if ready.is_empty() {
        return 0;
    }

    // No signal can have more records queued than there are slots.
    let per_signal_limit = thread.pending_capacity();
    let mut delivered = 0;

    for sig in ready {
        for _ in 0..per_signal_limit {
            let next = thread.signals().lock().take_unblocked(sig);
            let Some(info) = next else {
                break;
            };
            #[cfg(feature = "debug_verbose")]
            log::trace!("unmask sweep: thread {} record {:?}", thread.id(), info);
            dispatch(sched, thread, info);
            delivered += 1;
        }
    }

    delivered
}
