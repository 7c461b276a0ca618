//! Builds one [`MetricsSnapshot`] per cycle from an ordered list of sources.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::ValidatorIdentity;
use crate::models::amount::{amount_of, Coin};
use crate::models::snapshot::{Coverage, MetricsSnapshot};
use crate::source::ChainQuery;

/// Queries each source in order for every field of the snapshot.
///
/// For each field the first *complete* answer wins. When no source gives a
/// complete answer the first partial one is kept, and when nothing answers
/// the field keeps its default. Fields are independent: a failed validator
/// query does not stop the balance queries.
pub struct MetricsCollector {
    sources: Vec<Box<dyn ChainQuery>>,
    identity: ValidatorIdentity,
    denom: String,
}

impl MetricsCollector {
    pub fn new(
        primary: Box<dyn ChainQuery>,
        identity: ValidatorIdentity,
        denom: impl Into<String>,
    ) -> Self {
        Self {
            sources: vec![primary],
            identity,
            denom: denom.into(),
        }
    }

    /// Add a lower-priority source consulted when earlier ones fall short.
    pub fn with_fallback(mut self, source: Box<dyn ChainQuery>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn collect(&self) -> MetricsSnapshot {
        self.collect_at(Utc::now())
    }

    /// Sample every field. Never fails; missing data keeps its default.
    pub fn collect_at(&self, timestamp: DateTime<Utc>) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot::empty(timestamp);
        let mut coverage = Coverage::default();

        match self.first_answer("node status", |s| s.node_status(), |n| n.is_complete()) {
            Some(status) => {
                coverage.node_status = true;
                snapshot.height = status.height;
                snapshot.catching_up = status.catching_up;
            }
            None => warn!("Node status unavailable from every source"),
        }

        let operator = self.identity.operator_address.as_str();
        match self.first_answer("validator", |s| s.validator(operator), |v| v.is_complete()) {
            Some(validator) => {
                coverage.validator = true;
                snapshot.validator_status = validator.status;
                snapshot.jailed = validator.jailed;
                snapshot.tombstoned = validator.tombstoned;
                if let Some(moniker) = validator.moniker {
                    snapshot.moniker = moniker;
                }
            }
            None => warn!("Validator {operator} unavailable from every source"),
        }

        match self.identity.consensus_address.as_deref() {
            Some(consensus) => {
                match self.first_answer("signing info", |s| s.signing_info(consensus), |_| true) {
                    Some(info) => {
                        coverage.signing_info = true;
                        snapshot.missed_blocks = info.missed_blocks;
                        snapshot.tombstoned |= info.tombstoned;
                    }
                    None => warn!("Signing info for {consensus} unavailable from every source"),
                }
            }
            None => info!("No consensus address configured, missed blocks are not tracked"),
        }

        let wallet = self.identity.wallet_address.as_str();
        snapshot.wallet_balance = self.amount("balances", |s| s.balances(wallet));
        snapshot.delegated_balance = self.amount("delegations", |s| s.delegations(wallet));
        snapshot.rewards = self.amount("rewards", |s| s.rewards(wallet));

        snapshot.coverage = coverage;
        snapshot
    }

    fn first_answer<T>(
        &self,
        what: &str,
        query: impl Fn(&dyn ChainQuery) -> Option<T>,
        is_complete: impl Fn(&T) -> bool,
    ) -> Option<T> {
        let mut partial = None;
        for source in &self.sources {
            match query(source.as_ref()) {
                Some(answer) if is_complete(&answer) => {
                    debug!("{what}: complete answer from {}", source.name());
                    return Some(answer);
                }
                Some(answer) => {
                    debug!("{what}: partial answer from {}", source.name());
                    partial.get_or_insert(answer);
                }
                None => debug!("{what}: no answer from {}", source.name()),
            }
        }
        partial
    }

    fn amount(&self, what: &str, query: impl Fn(&dyn ChainQuery) -> Option<Vec<Coin>>) -> u128 {
        match self.first_answer(what, query, |_| true) {
            Some(coins) => amount_of(&coins, &self.denom),
            None => {
                warn!("{what} unavailable from every source, reporting 0");
                0
            }
        }
    }
}
