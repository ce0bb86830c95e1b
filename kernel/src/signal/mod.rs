//! Signal masking and pending-signal delivery
//!
//! This module implements the kernel side of POSIX signal blocking:
//! - Signal constants and fixed-width signal sets
//! - Per-thread signal state (blocked mask, fixed-capacity pending queue)
//! - `procmask`, which changes the mask and delivers what it unblocks
//! - Posting from task or interrupt context
//!
//! Running handlers is left to whatever implements [`SignalDelivery`].

pub mod constants;
pub mod delivery;
pub mod error;
pub mod pending;
pub mod procmask;
pub mod sigset;
pub mod types;

pub use delivery::{send_signal, DiscardDelivery, SignalDelivery};
pub use error::{MaskError, SignalError};
pub use pending::PendingQueue;
pub use procmask::{procmask, unmask_pending_signals};
pub use sigset::SigSet;
pub use types::*;
