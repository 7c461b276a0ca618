//! Append-only CSV of every cycle's snapshot.
//!
//! Every column is numeric, boolean or a normalized upper-case status token,
//! so rows never need quoting.

use anyhow::{Context, Result};
use chrono::SecondsFormat;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::snapshot::MetricsSnapshot;

pub const HISTORY_HEADER: &str = "timestamp,height,validator_status,jailed,tombstoned,\
catching_up,missed_blocks,wallet_balance,delegated_balance,rewards";

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first when the file is absent or empty.
    pub fn append(&self, snapshot: &MetricsSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create history directory {}", parent.display())
            })?;
        }

        let needs_header = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut buf = String::new();
        if needs_header {
            buf.push_str(HISTORY_HEADER);
            buf.push('\n');
        }
        buf.push_str(&format_row(snapshot));
        buf.push('\n');

        file.write_all(buf.as_bytes())
            .with_context(|| format!("Failed to append to {}", self.path.display()))
    }
}

fn format_row(snapshot: &MetricsSnapshot) -> String {
    let catching_up = snapshot
        .catching_up
        .map(|c| c.to_string())
        .unwrap_or_default();
    format!(
        "{},{},{},{},{},{},{},{},{},{}",
        snapshot.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        snapshot.height,
        snapshot.validator_status,
        snapshot.jailed,
        snapshot.tombstoned,
        catching_up,
        snapshot.missed_blocks,
        snapshot.wallet_balance,
        snapshot.delegated_balance,
        snapshot.rewards,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bond_status::BondStatus;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn snapshot() -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot::empty(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        snapshot.height = 174_065;
        snapshot.catching_up = Some(false);
        snapshot.validator_status = BondStatus::Bonded;
        snapshot.missed_blocks = 3;
        snapshot.wallet_balance = 12_080_000_000_000_000_000;
        snapshot.delegated_balance = 1_000;
        snapshot.rewards = 7;
        snapshot
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("nested").join("history.csv"));

        log.append(&snapshot()).unwrap();
        log.append(&snapshot()).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HISTORY_HEADER);
        assert_eq!(
            lines[1],
            "2025-03-01T12:00:00Z,174065,BONDED,false,false,false,3,12080000000000000000,1000,7"
        );
        assert_eq!(lines[1], lines[2]);
    }

    #[test]
    fn test_empty_existing_file_gets_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(&path, "").unwrap();

        HistoryLog::new(&path).append(&snapshot()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(HISTORY_HEADER));
    }

    #[test]
    fn test_unknown_sync_flag_is_empty_cell() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.csv"));
        let mut snapshot = snapshot();
        snapshot.catching_up = None;
        snapshot.validator_status = BondStatus::Unknown;

        log.append(&snapshot).unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        let row = content.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split(',').collect();
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[2], "UNKNOWN");
        assert_eq!(cells[5], "");
    }
}
