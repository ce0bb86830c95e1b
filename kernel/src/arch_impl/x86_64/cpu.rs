//! x86_64 CPU operations.
//!
//! Interrupt masking goes through RFLAGS.IF via the `x86_64` crate.

use crate::arch_impl::traits::CpuOps;

/// x86_64 CPU operations implementation.
pub struct X86Cpu;

impl CpuOps for X86Cpu {
    #[inline(always)]
    unsafe fn enable_interrupts() {
        ::x86_64::instructions::interrupts::enable();
    }

    #[inline(always)]
    unsafe fn disable_interrupts() {
        ::x86_64::instructions::interrupts::disable();
    }

    #[inline(always)]
    fn interrupts_enabled() -> bool {
        ::x86_64::instructions::interrupts::are_enabled()
    }

    /// Initial APIC ID from CPUID leaf 1 (EBX[31:24]).
    #[inline]
    fn cpu_id() -> u64 {
        let leaf = unsafe { core::arch::x86_64::__cpuid(1) };
        u64::from(leaf.ebx >> 24)
    }

    #[inline(always)]
    fn without_interrupts<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        // Delegate to the x86_64 crate's implementation
        ::x86_64::instructions::interrupts::without_interrupts(f)
    }
}
