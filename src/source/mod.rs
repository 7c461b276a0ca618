//! Chain data sources.
//!
//! Two implementations answer the same [`ChainQuery`] contract:
//! [`HttpSource`] talks to the node's RPC and LCD endpoints, [`CliSource`]
//! shells out to the node binary. The collector tries them in order and never
//! needs to know which one produced an answer.

pub mod cli;
pub mod http;
pub mod responses;
pub mod retry;


pub use cli::CliSource;
pub use http::HttpSource;
pub use retry::RetryPolicy;

use crate::models::amount::{amount_of, Coin};
use crate::models::bond_status::BondStatus;

/// Sync state reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    pub height: u64,
    pub catching_up: Option<bool>,
    pub network: Option<String>,
}

impl NodeStatus {
    pub fn is_complete(&self) -> bool {
        self.height > 0 && self.catching_up.is_some()
    }
}

/// Staking module view of the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorInfo {
    pub operator_address: Option<String>,
    /// Already normalized; raw chain tokens never leave the source boundary.
    pub status: BondStatus,
    pub jailed: bool,
    pub tombstoned: bool,
    pub moniker: Option<String>,
}

impl ValidatorInfo {
    pub fn is_complete(&self) -> bool {
        !self.status.is_unknown()
    }
}

/// Slashing module view of the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInfo {
    pub missed_blocks: u64,
    pub tombstoned: bool,
    pub jailed_until: Option<String>,
}

/// Read-only queries against one chain endpoint set.
///
/// Implementations absorb their own failures: every method returns `None`
/// (or 0 for the amount helpers) once its retries are exhausted and logs why.
pub trait ChainQuery {
    /// Short label used in diagnostics, e.g. `"http"`.
    fn name(&self) -> &str;

    fn node_status(&self) -> Option<NodeStatus>;

    fn validator(&self, operator_address: &str) -> Option<ValidatorInfo>;

    fn signing_info(&self, consensus_address: &str) -> Option<SigningInfo>;

    fn balances(&self, address: &str) -> Option<Vec<Coin>>;

    fn delegations(&self, address: &str) -> Option<Vec<Coin>>;

    fn rewards(&self, address: &str) -> Option<Vec<Coin>>;

    /// Spendable balance of `denom`, 0 when unavailable.
    fn fetch_balance(&self, address: &str, denom: &str) -> u128 {
        self.balances(address)
            .map(|coins| amount_of(&coins, denom))
            .unwrap_or(0)
    }

    /// Total delegated amount of `denom`, 0 when unavailable.
    fn fetch_delegations(&self, address: &str, denom: &str) -> u128 {
        self.delegations(address)
            .map(|coins| amount_of(&coins, denom))
            .unwrap_or(0)
    }

    /// Pending rewards of `denom` truncated to whole units, 0 when unavailable.
    fn fetch_rewards(&self, address: &str, denom: &str) -> u128 {
        self.rewards(address)
            .map(|coins| amount_of(&coins, denom))
            .unwrap_or(0)
    }
}
