//! What to send this cycle, and how the persisted cursor advances.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::severity::Severity;
use crate::models::snapshot::MetricsSnapshot;
use crate::models::state::PersistedState;

use super::classify::Classification;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decision {
    /// Send the per-severity message now.
    pub send_immediate: bool,
    /// Send the full status report.
    pub send_heartbeat: bool,
}

/// Immediate sends are reserved for `Alert` and `Fatal`, and only on a
/// transition unless `forced`. The heartbeat is independent of severity.
pub fn decide(
    severity: Severity,
    state_changed: bool,
    prior: &PersistedState,
    now: DateTime<Utc>,
    forced: bool,
    interval: Duration,
) -> Decision {
    Decision {
        send_immediate: severity.is_critical() && (forced || state_changed),
        send_heartbeat: heartbeat_due(prior.heartbeat_epoch(), now, interval),
    }
}

/// A heartbeat is due when none was ever sent, when `interval` has elapsed,
/// or when the stored timestamp lies in the future (clock moved backwards).
pub fn heartbeat_due(last_heartbeat: Option<i64>, now: DateTime<Utc>, interval: Duration) -> bool {
    let Some(last) = last_heartbeat.filter(|ts| *ts > 0) else {
        return true;
    };
    let elapsed = now.timestamp().saturating_sub(last);
    if elapsed < 0 {
        return true;
    }
    Duration::from_secs(elapsed as u64) >= interval
}

/// Cursor to persist after this cycle.
///
/// An outage cycle keeps the previous severity so the first real reading
/// afterwards is compared against what was last actually observed. A cycle
/// without signing info keeps the missed-block baseline for the same reason.
/// `last_heartbeat` only moves when the report was delivered.
pub fn apply(
    prior: &PersistedState,
    snapshot: &MetricsSnapshot,
    classification: &Classification,
    now: DateTime<Utc>,
    heartbeat_delivered: bool,
) -> PersistedState {
    let mut next = prior.clone();

    if !classification.rpc_outage {
        next.last_severity = Some(classification.severity);
    }
    if snapshot.coverage.signing_info {
        next.last_missed_blocks = snapshot.missed_blocks;
    }
    next.last_height = snapshot.height;
    if heartbeat_delivered {
        next.last_heartbeat = Some(now.timestamp());
    }
    next.last_check = Some(now.timestamp());
    next
}
