//! x86_64 architecture implementation.

pub mod cpu;

pub use cpu::X86Cpu;
