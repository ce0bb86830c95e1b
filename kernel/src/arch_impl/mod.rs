//! Architecture abstraction layer.
//!
//! Code outside this module talks to the interrupt controller of the local
//! CPU only through the [`CpuOps`] trait and the [`Cpu`] alias, which names
//! the implementation for the current build target.
//!
//! # Supported targets
//!
//! - `x86_64` bare metal: RFLAGS.IF through the `x86_64` crate
//! - `aarch64` bare metal: the DAIF I bit
//! - hosted builds (unit and integration tests): a simulated interrupt flag

pub mod traits;
pub use traits::*;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86_64;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub use self::x86_64::X86Cpu as Cpu;

#[cfg(all(target_arch = "aarch64", target_os = "none"))]
pub mod aarch64;
#[cfg(all(target_arch = "aarch64", target_os = "none"))]
pub use self::aarch64::Aarch64Cpu as Cpu;

#[cfg(not(target_os = "none"))]
pub mod host;
#[cfg(not(target_os = "none"))]
pub use self::host::HostCpu as Cpu;
