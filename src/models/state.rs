//! Cursor persisted between cycles.
//!
//! The file is owned by a single monitor process and rewritten atomically at
//! the end of every cycle (see [`crate::fs::state_file`]). Loading is lenient:
//! wrong-typed values fall back to their defaults and unrecognized keys are
//! carried through untouched so newer writers are never clobbered.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::severity::Severity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredState")]
pub struct PersistedState {
    /// Classification of the previous cycle. Older files call this `last_status`.
    pub last_severity: Option<Severity>,

    /// Missed-block counter seen last cycle; baseline for the missed-blocks alert.
    pub last_missed_blocks: u64,

    /// Epoch seconds of the last delivered periodic report.
    pub last_heartbeat: Option<i64>,

    pub last_height: u64,

    /// Epoch seconds of the last completed cycle.
    pub last_check: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// On-disk layout. Files touched by older writers may carry `last_status`
/// next to `last_severity`; both are read and the newer key wins.
#[derive(Deserialize)]
struct StoredState {
    #[serde(default, deserialize_with = "lenient_severity")]
    last_severity: Option<Severity>,
    #[serde(default, deserialize_with = "lenient_severity")]
    last_status: Option<Severity>,
    #[serde(default, deserialize_with = "lenient_u64")]
    last_missed_blocks: u64,
    #[serde(default, deserialize_with = "lenient_epoch")]
    last_heartbeat: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    last_height: u64,
    #[serde(default, deserialize_with = "lenient_epoch")]
    last_check: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<StoredState> for PersistedState {
    fn from(stored: StoredState) -> Self {
        Self {
            last_severity: stored.last_severity.or(stored.last_status),
            last_missed_blocks: stored.last_missed_blocks,
            last_heartbeat: stored.last_heartbeat,
            last_height: stored.last_height,
            last_check: stored.last_check,
            extra: stored.extra,
        }
    }
}

impl PersistedState {
    /// Heartbeat timestamp, treating the legacy `0` sentinel as "never sent".
    pub fn heartbeat_epoch(&self) -> Option<i64> {
        self.last_heartbeat.filter(|ts| *ts > 0)
    }
}

fn lenient_severity<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Severity>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Epoch seconds; older writers stored fractional seconds.
fn lenient_epoch<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    })
}
