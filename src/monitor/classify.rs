//! Severity classification of a snapshot against the previous cycle.

use crate::models::bond_status::BondStatus;
use crate::models::severity::Severity;
use crate::models::snapshot::MetricsSnapshot;
use crate::models::state::PersistedState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    /// Severity differs from the previous cycle's (no previous cycle counts as different).
    pub state_changed: bool,
    /// The node's RPC gave neither height nor sync state.
    pub rpc_outage: bool,
}

/// Classify `snapshot`. Pure; the first matching rule wins:
///
/// 1. RPC outage (no height, no sync flag): `Healthy`, flagged as outage,
///    whatever the other fields say
/// 2. tombstoned: `Fatal`
/// 3. jailed: `Alert`
/// 4. missed-block counter above the stored baseline: `Alert`
/// 5. unbonding: `Warning`
/// 6. catching up: `Warning`
/// 7. bonded and synced: `Healthy`
/// 8. anything else: `Warning`
///
/// Rule 4 only applies when signing info was observed this cycle at a
/// non-zero height; a counter that defaulted to 0 never moves the baseline.
pub fn classify(snapshot: &MetricsSnapshot, prior: &PersistedState) -> Classification {
    let rpc_outage = snapshot.is_rpc_outage();
    let severity = severity_of(snapshot, prior, rpc_outage);
    Classification {
        severity,
        state_changed: prior.last_severity != Some(severity),
        rpc_outage,
    }
}

fn severity_of(snapshot: &MetricsSnapshot, prior: &PersistedState, rpc_outage: bool) -> Severity {
    if rpc_outage {
        return Severity::Healthy;
    }
    if snapshot.tombstoned {
        return Severity::Fatal;
    }
    if snapshot.jailed {
        return Severity::Alert;
    }
    if snapshot.coverage.signing_info
        && snapshot.height > 0
        && snapshot.missed_blocks > prior.last_missed_blocks
    {
        return Severity::Alert;
    }
    if snapshot.validator_status == BondStatus::Unbonding {
        return Severity::Warning;
    }
    match snapshot.catching_up {
        Some(true) => Severity::Warning,
        Some(false) if snapshot.validator_status == BondStatus::Bonded => Severity::Healthy,
        _ => Severity::Warning,
    }
}
