//! On-disk artifacts owned by the monitor: the state cursor and the history log.

pub mod history;
pub mod state_file;

pub use history::HistoryLog;
pub use state_file::StateStore;
