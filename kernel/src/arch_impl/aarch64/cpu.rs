//! ARM64 CPU operations.
//!
//! Handles interrupt enable/disable via the DAIF (Debug, SError, IRQ, FIQ) register.
//!
//! - `msr daifset, #imm`: Set specified DAIF bits (disable interrupts)
//! - `msr daifclr, #imm`: Clear specified DAIF bits (enable interrupts)
//! - `mrs reg, daif`: Read DAIF register

use crate::arch_impl::traits::CpuOps;

/// I bit (IRQ mask) in DAIF
const DAIF_IRQ_BIT: u64 = 1 << 7;

pub struct Aarch64Cpu;

impl CpuOps for Aarch64Cpu {
    /// Enable IRQ interrupts by clearing the I bit in DAIF
    #[inline]
    unsafe fn enable_interrupts() {
        core::arch::asm!("msr daifclr, #2", options(nomem, nostack));
    }

    /// Disable IRQ interrupts by setting the I bit in DAIF
    #[inline]
    unsafe fn disable_interrupts() {
        core::arch::asm!("msr daifset, #2", options(nomem, nostack));
    }

    #[inline]
    fn interrupts_enabled() -> bool {
        let daif: u64;
        unsafe {
            core::arch::asm!("mrs {}, daif", out(reg) daif, options(nomem, nostack));
        }
        (daif & DAIF_IRQ_BIT) == 0
    }

    /// Aff0 of MPIDR_EL1.
    #[inline]
    fn cpu_id() -> u64 {
        let mpidr: u64;
        unsafe {
            core::arch::asm!("mrs {}, mpidr_el1", out(reg) mpidr, options(nomem, nostack));
        }
        mpidr & 0xFF
    }
}
