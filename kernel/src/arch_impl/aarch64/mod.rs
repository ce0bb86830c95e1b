//! AArch64 (ARM64) architecture implementation.

pub mod cpu;

pub use cpu::Aarch64Cpu;
