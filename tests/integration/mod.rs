//! Integration tests for the sentinel monitor
//!
//! These run complete cycles against mocked RPC, LCD and Telegram endpoints,
//! and exercise the binary's exit codes and dry-run output.

pub mod binary;
pub mod cycle_flow;
pub mod helpers;
