pub mod config;
pub mod cooldown;
pub mod fs;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod source;

/// Default location of the persisted cycle cursor.
pub const DEFAULT_STATE_FILE: &str = "history/state.json";

/// Default location of the per-cycle CSV history.
pub const DEFAULT_HISTORY_FILE: &str = "history/history.csv";
