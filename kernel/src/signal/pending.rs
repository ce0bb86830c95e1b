//! Fixed-capacity store of queued signal occurrences.
//!
//! Every thread owns one [`PendingQueue`], sized when the thread is created
//! and never grown afterwards: posting from an interrupt handler must not
//! allocate. Records live in a boxed slot arena; each signal number has an
//! intrusive FIFO list through the arena, and free slots are handed out from
//! a pre-filled `ArrayQueue`. Push and pop are O(1).
//!
//! The queue is the authoritative pending set: a signal's bit is set exactly
//! while at least one record for it is linked.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crossbeam_queue::ArrayQueue;

use super::constants::{is_valid_signal, NSIG};
use super::error::SignalError;
use super::sigset::SigSet;
use super::types::SigInfo;
use crate::config::MAX_PENDING_CAPACITY;

/// End-of-list marker; never a valid slot index.
const NIL: u16 = u16::MAX;

#[derive(Clone, Copy)]
struct Slot {
    info: SigInfo,
    next: u16,
}

pub struct PendingQueue {
    slots: Box<[Slot]>,
    heads: [u16; NSIG as usize],
    tails: [u16; NSIG as usize],
    counts: [u16; NSIG as usize],
    free: ArrayQueue<u16>,
    pending: SigSet,
}

impl PendingQueue {
    /// Reserve `capacity` record slots (at least one, at most
    /// [`MAX_PENDING_CAPACITY`]).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_PENDING_CAPACITY);
        let slots: Vec<Slot> = (0..capacity)
            .map(|_| Slot {
                info: SigInfo::EMPTY,
                next: NIL,
            })
            .collect();

        let free = ArrayQueue::new(capacity);
        for index in 0..capacity {
            // Cannot fail: the queue holds exactly `capacity` entries.
            let _ = free.push(index as u16);
        }

        PendingQueue {
            slots: slots.into_boxed_slice(),
            heads: [NIL; NSIG as usize],
            tails: [NIL; NSIG as usize],
            counts: [0; NSIG as usize],
            free,
            pending: SigSet::empty(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of records currently queued.
    pub fn len(&self) -> usize {
        self.capacity() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Signals with at least one queued record.
    #[inline]
    pub fn pending(&self) -> SigSet {
        self.pending
    }

    /// Records queued for `sig`.
    pub fn count(&self, sig: u32) -> usize {
        if !is_valid_signal(sig) {
            return 0;
        }
        self.counts[(sig - 1) as usize] as usize
    }

    /// Oldest record for `sig`, if any.
    pub fn peek(&self, sig: u32) -> Option<&SigInfo> {
        if !is_valid_signal(sig) {
            return None;
        }
        match self.heads[(sig - 1) as usize] {
            NIL => None,
            head => Some(&self.slots[head as usize].info),
        }
    }

    /// Append a record to the tail of its signal's list.
    pub fn push(&mut self, info: SigInfo) -> Result<(), SignalError> {
        if !is_valid_signal(info.signo) {
            return Err(SignalError::InvalidArgument);
        }
        let index = self.free.pop().ok_or(SignalError::Again)?;
        let list = (info.signo - 1) as usize;

        self.slots[index as usize] = Slot { info, next: NIL };
        match self.tails[list] {
            NIL => self.heads[list] = index,
            tail => self.slots[tail as usize].next = index,
        }
        self.tails[list] = index;
        self.counts[list] += 1;
        self.pending |= SigSet::from_signal(info.signo);
        Ok(())
    }

    /// Unlink and return the oldest record for `sig`.
    ///
    /// Removing the last record clears the signal's pending bit.
    pub fn pop(&mut self, sig: u32) -> Option<SigInfo> {
        if !is_valid_signal(sig) {
            return None;
        }
        let list = (sig - 1) as usize;
        let index = self.heads[list];
        if index == NIL {
            return None;
        }

        let slot = self.slots[index as usize];
        self.heads[list] = slot.next;
        if slot.next == NIL {
            self.tails[list] = NIL;
            self.pending -= SigSet::from_signal(sig);
        }
        self.counts[list] -= 1;
        self.slots[index as usize].next = NIL;
        // Cannot fail: the index came out of this queue.
        let _ = self.free.push(index);
        Some(slot.info)
    }
}
