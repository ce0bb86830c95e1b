//! Signal-related system calls
//!
//! - sigprocmask(how, set, oldset) - Examine and change blocked signals
//! - sigpending(set) - Read the calling thread's pending signals
//! - kill(tid, sig) - Send a signal to a thread
//! - sigqueue(tid, sig, value) - Send a signal carrying a value

use super::{ERROR, OK};
use crate::signal::{procmask, send_signal, SigCode, SigInfo, SigSet, SignalError};
use crate::task::scheduler::Scheduler;
use crate::task::thread::Thread;

/// Store `errno` in `thread` and report failure.
fn fail(thread: &Thread, errno: i32) -> i32 {
    thread.set_errno(errno);
    ERROR
}

/// sigprocmask(how, set, oldset)
///
/// # Arguments
/// * `how` - SIG_BLOCK (0), SIG_UNBLOCK (1), or SIG_SETMASK (2)
/// * `set` - New set to combine with the mask, or `None` to only query
/// * `oset` - Receives the mask in effect before the call
///
/// # Returns
/// * `OK` on success
/// * `ERROR` with errno EINVAL if `how` is invalid; the mask is unchanged
pub fn sigprocmask(
    sched: &Scheduler,
    how: i32,
    set: Option<&SigSet>,
    oset: Option<&mut SigSet>,
) -> i32 {
    let current = sched.current_thread();
    match procmask(sched, &current, how, set, oset) {
        Ok(()) => OK,
        Err(err) => fail(&current, err.errno()),
    }
}

/// sigpending(set) - Signals raised while blocked and not yet delivered
pub fn sigpending(sched: &Scheduler, set: &mut SigSet) -> i32 {
    *set = sched.current_thread().pending_signals();
    OK
}

/// kill(tid, sig) - Send a signal to a thread
///
/// Signal 0 only checks that the thread exists.
///
/// # Returns
/// * `OK` on success
/// * `ERROR` with errno EINVAL for an invalid signal number, ESRCH if no
///   such thread, EAGAIN if the target's pending pool is exhausted
pub fn kill(sched: &Scheduler, tid: u64, sig: u32) -> i32 {
    post(sched, tid, sig, |sender| SigInfo::new(sig, SigCode::User).with_sender(sender))
}

/// sigqueue(tid, sig, value) - Send a signal carrying `value`
pub fn sigqueue(sched: &Scheduler, tid: u64, sig: u32, value: u64) -> i32 {
    post(sched, tid, sig, |sender| {
        SigInfo::new(sig, SigCode::Queue)
            .with_sender(sender)
            .with_value(value)
    })
}

fn post(sched: &Scheduler, tid: u64, sig: u32, build: impl FnOnce(u64) -> SigInfo) -> i32 {
    let current = sched.current_thread();

    let target = match sched.get_thread(tid) {
        Some(target) => target,
        None => {
            log::warn!("kill: no thread {}", tid);
            return fail(&current, SignalError::NoSuchThread.errno());
        }
    };

    if sig == 0 {
        return OK;
    }

    match send_signal(sched, &target, build(current.id())) {
        Ok(()) => OK,
        Err(err) => {
            log::warn!("kill: signal {} to thread {} failed: {}", sig, tid, err);
            fail(&current, err.errno())
        }
    }
}
