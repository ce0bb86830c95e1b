use core::sync::atomic::{AtomicUsize, Ordering};

use crate::arch_impl::traits::{CpuOps, IrqFlags};

static IRQ_DISABLE_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Simulated CPU for hosted builds.
pub struct HostCpu;

impl CpuOps for HostCpu {
    unsafe fn enable_interrupts() {
        IRQ_DISABLE_DEPTH.store(0, Ordering::SeqCst);
    }

    unsafe fn disable_interrupts() {
        let _ = IRQ_DISABLE_DEPTH.compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst);
    }

    fn interrupts_enabled() -> bool {
        IRQ_DISABLE_DEPTH.load(Ordering::SeqCst) == 0
    }

    fn cpu_id() -> u64 {
        0
    }

    fn local_irq_save() -> IrqFlags {
        let depth = IRQ_DISABLE_DEPTH.fetch_add(1, Ordering::SeqCst);
        IrqFlags::new(depth == 0)
    }

    unsafe fn local_irq_restore(_flags: IrqFlags) {
        IRQ_DISABLE_DEPTH.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Current nesting depth of simulated interrupt-disable sections.
pub fn irq_disable_depth() -> usize {
    IRQ_DISABLE_DEPTH.load(Ordering::SeqCst)
}

/// Run `f` the way an interrupt handler would run: to completion, with local
/// interrupts masked for its whole span.
pub fn run_as_interrupt<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    HostCpu::without_interrupts(f)
}
