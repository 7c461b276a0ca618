use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bond_status::BondStatus;

/// Moniker used when the validator record could not be fetched.
pub const UNKNOWN_MONIKER: &str = "Unknown";

/// Which sub-queries produced data for a snapshot.
///
/// Lets downstream logic tell "the chain reported 0" apart from "nothing answered".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub node_status: bool,
    pub validator: bool,
    pub signing_info: bool,
}

/// Point-in-time view of the validator, produced once per cycle.
///
/// Every field has an explicit default so a snapshot exists even when every
/// data source failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    /// Latest block height; 0 when unknown.
    pub height: u64,
    /// `None` when no sync information was available.
    pub catching_up: Option<bool>,
    pub validator_status: BondStatus,
    pub jailed: bool,
    pub tombstoned: bool,
    pub missed_blocks: u64,
    pub wallet_balance: u128,
    pub delegated_balance: u128,
    pub rewards: u128,
    pub moniker: String,
    pub coverage: Coverage,
}

impl MetricsSnapshot {
    /// Snapshot with every field at its documented default.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            height: 0,
            catching_up: None,
            validator_status: BondStatus::Unknown,
            jailed: false,
            tombstoned: false,
            missed_blocks: 0,
            wallet_balance: 0,
            delegated_balance: 0,
            rewards: 0,
            moniker: UNKNOWN_MONIKER.to_string(),
            coverage: Coverage::default(),
        }
    }

    /// No live connection to the node's RPC: no height and no sync flag.
    pub fn is_rpc_outage(&self) -> bool {
        self.height == 0 && self.catching_up.is_none()
    }

    /// Label used in reports and the history log for the sync flag.
    pub fn sync_label(&self) -> &'static str {
        match self.catching_up {
            Some(false) => "OK",
            Some(true) => "Catching Up",
            None => "Unknown",
        }
    }
}
