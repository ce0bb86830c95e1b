//! Threads and the scheduler collaborator of the signal subsystem.

pub mod sched_lock;
pub mod scheduler;
pub mod thread;
