use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Classification of one monitoring cycle.
///
/// Ordered from least to most severe, so `Severity::Alert > Severity::Warning`
/// holds and `max()` picks the worse of two levels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Bonded, signing, and in sync.
    Healthy,

    /// Degraded but not losing stake: unbonding, catching up, or unclear data.
    /// Only surfaced through the periodic report.
    Warning,

    /// Jailed or missing blocks. Sent immediately on transition.
    Alert,

    /// Tombstoned. Irreversible.
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Healthy => "HEALTHY",
            Severity::Warning => "WARNING",
            Severity::Alert => "ALERT",
            Severity::Fatal => "FATAL",
        }
    }

    /// Whether this level warrants an out-of-band message as soon as it appears.
    pub fn is_critical(&self) -> bool {
        matches!(self, Severity::Alert | Severity::Fatal)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HEALTHY" => Ok(Severity::Healthy),
            "WARNING" => Ok(Severity::Warning),
            "ALERT" => Ok(Severity::Alert),
            "FATAL" => Ok(Severity::Fatal),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}
