//! Posting signals and handing them to the delivery collaborator.
//!
//! Posting may happen from any context, including interrupt handlers. The
//! decision "deliver now or queue" is taken under the target's signal lock,
//! so it is atomic with respect to the target changing its own mask; the
//! hand-off itself happens after the lock is dropped.

use super::constants::{is_valid_signal, signal_name};
use super::error::SignalError;
use super::types::{Enqueued, SigInfo};
use crate::task::scheduler::Scheduler;
use crate::task::thread::Thread;

/// Receiver of unblocked signal occurrences.
///
/// Implementations run handlers or wake waiters. They are called outside
/// any critical section but possibly from interrupt context, and must not
/// block or allocate.
pub trait SignalDelivery: Send + Sync {
    fn deliver(&self, thread: &Thread, info: &SigInfo);
}

/// Delivery sink for kernels without a dispatcher: occurrences are logged
/// and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardDelivery;

impl SignalDelivery for DiscardDelivery {
    fn deliver(&self, thread: &Thread, info: &SigInfo) {
        log::debug!(
            "Signal {} ({}) to thread {} discarded: no dispatcher",
            info.signo,
            signal_name(info.signo),
            thread.id()
        );
    }
}

/// Hand one occurrence to the scheduler's delivery sink.
pub(crate) fn dispatch(sched: &Scheduler, thread: &Thread, info: SigInfo) {
    log::debug!(
        "Delivering signal {} ({}) to thread {}",
        info.signo,
        signal_name(info.signo),
        thread.id()
    );
    sched.delivery().deliver(thread, &info);
}

/// Post `info` to `target`.
///
/// If the signal is blocked the occurrence becomes pending (coalesced for
/// standard signals, queued for realtime ones); otherwise it is delivered
/// before this returns.
pub fn send_signal(sched: &Scheduler, target: &Thread, info: SigInfo) -> Result<(), SignalError> {
    if !is_valid_signal(info.signo) {
        return Err(SignalError::InvalidArgument);
    }

    let queued = {
        let mut signals = target.signals().lock();
        if signals.is_blocked(info.signo) {
            Some(signals.enqueue(info)?)
        } else {
            None
        }
    };

    match queued {
        Some(Enqueued::Queued) => log::trace!(
            "Signal {} blocked by thread {}, queued",
            info.signo,
            target.id()
        ),
        Some(Enqueued::Coalesced) => log::trace!(
            "Signal {} already pending on thread {}, coalesced",
            info.signo,
            target.id()
        ),
        None => dispatch(sched, target, info),
    }
    Ok(())
}
