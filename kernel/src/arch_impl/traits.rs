//! Architecture-agnostic traits for hardware abstraction.
//!
//! Each supported target implements these for its own CPU type; the rest of
//! the kernel only sees the trait.

/// Interrupt-enable state captured by [`CpuOps::local_irq_save`].
///
/// The token is opaque to callers: the only thing to do with it is hand it
/// back to [`CpuOps::local_irq_restore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "dropping the saved state leaves interrupts disabled"]
pub struct IrqFlags {
    enabled: bool,
}

impl IrqFlags {
    pub const fn new(enabled: bool) -> Self {
        IrqFlags { enabled }
    }

    /// Whether interrupts were enabled when the state was captured.
    #[inline]
    pub const fn were_enabled(&self) -> bool {
        self.enabled
    }
}

/// Basic CPU control operations.
pub trait CpuOps {
    /// Enable interrupts.
    ///
    /// # Safety
    ///
    /// Must be called in appropriate context where interrupts can be safely enabled.
    unsafe fn enable_interrupts();

    /// Disable interrupts.
    ///
    /// # Safety
    ///
    /// Must be called in appropriate context.
    unsafe fn disable_interrupts();

    /// Check if interrupts are currently enabled.
    fn interrupts_enabled() -> bool;

    /// Index of the executing CPU.
    fn cpu_id() -> u64;

    /// Disable local interrupts and return the state they had before.
    #[inline]
    fn local_irq_save() -> IrqFlags {
        let flags = IrqFlags::new(Self::interrupts_enabled());
        unsafe { Self::disable_interrupts() };
        flags
    }

    /// Put the local interrupt state back to what `flags` captured.
    ///
    /// # Safety
    ///
    /// `flags` must come from the matching [`CpuOps::local_irq_save`] on this
    /// CPU, restored in LIFO order.
    #[inline]
    unsafe fn local_irq_restore(flags: IrqFlags) {
        if flags.were_enabled() {
            Self::enable_interrupts();
        }
    }

    /// Execute a closure with interrupts disabled.
    #[inline]
    fn without_interrupts<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let flags = Self::local_irq_save();
        let result = f();
        unsafe { Self::local_irq_restore(flags) };
        result
    }
}
