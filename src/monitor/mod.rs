//! The per-invocation monitoring state machine.
//!
//! One cycle loads the previous cursor, samples the chain through the
//! [`MetricsCollector`], classifies the snapshot, decides what to send, then
//! persists the new cursor and a history row. Every step after configuration
//! degrades instead of failing.

pub mod classify;
pub mod collector;
pub mod cycle;
pub mod policy;


pub use classify::{classify, Classification};
pub use collector::MetricsCollector;
pub use cycle::{CycleOptions, CycleReport, Monitor};
pub use policy::{decide, heartbeat_due, Decision};
