//! Interrupt critical sections and the spinlock built on top of them.
//!
//! A [`CriticalSection`] masks interrupts on the local CPU for as long as it
//! is alive and puts back exactly the state it found when dropped. With the
//! `smp` feature it additionally owns the global interrupt lock, so the same
//! section entered on another core spins until this one is left.
//!
//! [`SpinLockIrq`] pairs a critical section with a `spin::Mutex` for data that
//! interrupt handlers also write (a thread's pending signals, the run queue).
//! Holding the guard means no local interrupt can interleave and no other
//! core can hold the same lock.

use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

use crate::arch_impl::{Cpu, CpuOps, IrqFlags};

/// RAII token for a span executed with local interrupts disabled.
///
/// Must stay on the CPU that created it, hence `!Send`.
#[must_use = "the critical section ends as soon as the token is dropped"]
pub struct CriticalSection {
    flags: IrqFlags,
    _not_send: PhantomData<*const ()>,
}

impl CriticalSection {
    /// Disable local interrupts (and take the cross-core lock on SMP builds).
    #[inline]
    pub fn enter() -> Self {
        let flags = Cpu::local_irq_save();
        #[cfg(feature = "smp")]
        smp::irq_lock_acquire();
        CriticalSection {
            flags,
            _not_send: PhantomData,
        }
    }

    /// Whether interrupts were enabled when this section was entered.
    #[inline]
    pub fn irq_was_enabled(&self) -> bool {
        self.flags.were_enabled()
    }
}

impl Drop for CriticalSection {
    #[inline]
    fn drop(&mut self) {
        #[cfg(feature = "smp")]
        smp::irq_lock_release();
        // SAFETY: the flags were captured by this token's own save, and tokens
        // are !Send so the restore happens on the saving CPU.
        unsafe { Cpu::local_irq_restore(self.flags) };
    }
}

/// Global interrupt lock shared by every core (recursive per CPU).
#[cfg(feature = "smp")]
mod smp {
    use core::hint::spin_loop;
    use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    use crate::arch_impl::{Cpu, CpuOps};

    const NO_OWNER: u64 = u64::MAX;

    static OWNER: AtomicU64 = AtomicU64::new(NO_OWNER);
    /// Only touched by the owning CPU.
    static DEPTH: AtomicU32 = AtomicU32::new(0);

    pub(super) fn irq_lock_acquire() {
        let cpu = Cpu::cpu_id();
        if OWNER.load(Ordering::Acquire) == cpu {
            DEPTH.fetch_add(1, Ordering::Relaxed);
            return;
        }
        while OWNER
            .compare_exchange_weak(NO_OWNER, cpu, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            spin_loop();
        }
        DEPTH.store(1, Ordering::Relaxed);
    }

    pub(super) fn irq_lock_release() {
        if DEPTH.fetch_sub(1, Ordering::Relaxed) == 1 {
            OWNER.store(NO_OWNER, Ordering::Release);
        }
    }
}

/// A spinlock that also disables interrupts.
///
/// Used for state that may be touched from interrupt context.
pub struct SpinLockIrq<T> {
    inner: Mutex<T>,
}

impl<T> SpinLockIrq<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Acquire the lock with interrupts disabled.
    #[inline]
    pub fn lock(&self) -> SpinLockIrqGuard<'_, T> {
        let section = CriticalSection::enter();
        let guard = self.inner.lock();
        SpinLockIrqGuard {
            guard,
            _section: section,
        }
    }

    /// Exclusive access without masking anything; the borrow proves no one
    /// else can reach the data.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }
}

/// RAII guard for [`SpinLockIrq`].
///
/// Field order matters: the mutex is released before interrupts come back.
pub struct SpinLockIrqGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    _section: CriticalSection,
}

impl<T> Deref for SpinLockIrqGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for SpinLockIrqGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch_impl::host::irq_disable_depth;

    #[test]
    fn test_critical_section_masks_interrupts() {
        let section = CriticalSection::enter();
        assert!(irq_disable_depth() >= 1, "interrupts must be masked inside the section");
        assert!(!Cpu::interrupts_enabled());
        drop(section);
    }

    #[test]
    fn test_nested_sections_report_outer_state() {
        let outer = CriticalSection::enter();
        let inner = CriticalSection::enter();
        assert!(
            !inner.irq_was_enabled(),
            "an inner section must see the outer one's masking"
        );
        drop(inner);
        assert!(irq_disable_depth() >= 1, "outer section still holds the mask");
        drop(outer);
    }

    fn bail_early(lock: &SpinLockIrq<u32>, fail: bool) -> Result<u32, ()> {
        let mut value = lock.lock();
        *value += 1;
        if fail {
            return Err(());
        }
        Ok(*value)
    }

    #[test]
    fn test_guard_released_on_early_return() {
        let lock = SpinLockIrq::new(0u32);
        assert_eq!(bail_early(&lock, true), Err(()));
        // The mutex must be free again, otherwise this would spin forever.
        assert_eq!(bail_early(&lock, false), Ok(2));
    }

    #[test]
    fn test_get_mut_bypasses_lock() {
        let mut lock = SpinLockIrq::new(5u32);
        *lock.get_mut() = 7;
        assert_eq!(*lock.lock(), 7);
    }
}
