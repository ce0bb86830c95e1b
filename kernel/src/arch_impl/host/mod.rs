//! Hosted backend used by unit and integration tests.
//!
//! There is no interrupt controller to program, so the local interrupt
//! state is modelled as a nesting depth: zero means enabled. Saves and
//! restores are counted rather than stored, which keeps the model balanced
//! when several test threads enter critical sections at once.

pub mod cpu;

pub use cpu::{irq_disable_depth, run_as_interrupt, HostCpu};
