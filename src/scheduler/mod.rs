//! Recurring feed scan scheduler module.
//!
//! Manages per-session scan tasks and delivers scan results through
//! an outbound report channel.

mod runner;
mod sessions;

pub use runner::{OutboundReport, ScanScheduler, SchedulerCommand};
pub use sessions::{SessionHandle, SessionId, SessionRegistry};
